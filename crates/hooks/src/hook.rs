//! Hook traits.

use async_trait::async_trait;
use relayci_core::event::EventRecord;
use relayci_core::run::RunRecord;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::params::{HookError, HookParams};

/// Outcome of a pre-hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreHookResult {
    Done,
    /// The hook produced a message worth surfacing in the logs.
    Message(String),
}

/// Outcome of a post-hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostHookResult {
    Done,
    /// The hook delivered something for `jobs` of the cycle's runs.
    Delivered { jobs: usize },
}

/// Runs before any job of a cycle is submitted. A pre-hook failure
/// aborts the cycle.
#[async_trait]
pub trait PreHook: Send {
    fn name(&self) -> &'static str;

    /// Decode and check raw configuration parameters. Called once when
    /// the hook is resolved from the registry.
    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError>;

    async fn run(
        &mut self,
        cancel: &CancellationToken,
        params: &HookParams,
        event: &EventRecord,
    ) -> Result<PreHookResult, HookError>;
}

/// Runs after the cycle's jobs have been submitted (and, in wait mode,
/// completed). Post-hook failures are reported but do not affect other
/// post-hooks.
#[async_trait]
pub trait PostHook: Send {
    fn name(&self) -> &'static str;

    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError>;

    async fn run(
        &mut self,
        cancel: &CancellationToken,
        params: &HookParams,
        event: &EventRecord,
        records: &[RunRecord],
    ) -> Result<PostHookResult, HookError>;
}

/// Brackets a dispatch cycle. `setup` runs once with validated
/// parameters, `before_job` runs after rendering but before submission,
/// and `after_job` runs once the cycle's runs are accounted for.
/// Integration failures are logged, never fatal.
#[async_trait]
pub trait IntegrationHook: Send {
    fn name(&self) -> &'static str;

    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError>;

    fn setup(&mut self, params: &HookParams) -> Result<(), HookError>;

    async fn before_job(
        &mut self,
        cancel: &CancellationToken,
        event: &EventRecord,
        job_names: &[String],
    ) -> Result<(), HookError>;

    async fn after_job(
        &mut self,
        cancel: &CancellationToken,
        records: &[RunRecord],
    ) -> Result<(), HookError>;
}

// Factories produce a fresh hook instance per resolution, so hook
// state never leaks between cycles.
pub type PreHookFactory = Arc<dyn Fn() -> Box<dyn PreHook> + Send + Sync>;
pub type PostHookFactory = Arc<dyn Fn() -> Box<dyn PostHook> + Send + Sync>;
pub type IntegrationHookFactory = Arc<dyn Fn() -> Box<dyn IntegrationHook> + Send + Sync>;
