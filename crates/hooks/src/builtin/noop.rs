//! Pre-hook that does nothing.
//!
//! Useful as a configuration placeholder and as the smallest possible
//! example of the hook contract.

use async_trait::async_trait;
use relayci_core::event::EventRecord;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::hook::{PreHook, PreHookResult};
use crate::params::{HookError, HookParams};

#[derive(Debug, Default)]
pub struct NoopHook;

impl NoopHook {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PreHook for NoopHook {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn validate_parameters(&self, _raw: &Value) -> Result<HookParams, HookError> {
        Ok(HookParams::None)
    }

    async fn run(
        &mut self,
        _cancel: &CancellationToken,
        _params: &HookParams,
        event: &EventRecord,
    ) -> Result<PreHookResult, HookError> {
        tracing::debug!(commit = %event.head_commit, "noop pre-hook ran");
        Ok(PreHookResult::Done)
    }
}
