//! Post-hook that announces run outcomes in a chat channel.

use async_trait::async_trait;
use relayci_core::event::EventRecord;
use relayci_core::run::RunRecord;
use relayci_integrations::slack::ChatClient;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::hook::{PostHook, PostHookResult};
use crate::params::{ChatParams, HookError, HookParams};

#[derive(Debug, Default)]
pub struct ChatMessageHook;

impl ChatMessageHook {
    pub fn new() -> Self {
        Self
    }
}

/// One line per run. Runs without a terminal status were submitted but
/// not waited on.
fn format_message(record: &RunRecord) -> String {
    match &record.status {
        Some(status) if status.success() => format!(
            "job {} (id {}) completed successfully for commit {}",
            record.job_name, record.job_id, record.commit_sha
        ),
        Some(status) => format!(
            "job {} (id {}) finished in state {} for commit {}",
            record.job_name,
            record.job_id,
            status.state,
            record.commit_sha
        ),
        None => format!(
            "job {} (id {}) submitted for commit {}",
            record.job_name, record.job_id, record.commit_sha
        ),
    }
}

#[async_trait]
impl PostHook for ChatMessageHook {
    fn name(&self) -> &'static str {
        "chat-message"
    }

    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError> {
        let params: ChatParams = serde_json::from_value(raw.clone())?;
        if params.webhook_url.trim().is_empty() {
            return Err(HookError::Parameters(
                "chat parameter \"webhook_url\" must not be empty".to_string(),
            ));
        }
        Ok(HookParams::Chat(params))
    }

    async fn run(
        &mut self,
        cancel: &CancellationToken,
        params: &HookParams,
        _event: &EventRecord,
        records: &[RunRecord],
    ) -> Result<PostHookResult, HookError> {
        let HookParams::Chat(params) = params else {
            return Err(HookError::ParamsMismatch {
                name: self.name().to_string(),
            });
        };

        let client = ChatClient::new(&params.webhook_url);
        let mut delivered = 0usize;
        let mut failed = 0usize;
        for record in records {
            if cancel.is_cancelled() {
                return Err(HookError::Execution(
                    "cancelled before all messages were delivered".to_string(),
                ));
            }
            match client.post_message(&format_message(record)).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        job_name = %record.job_name,
                        job_id = record.job_id,
                        error = %e,
                        "chat message delivery failed"
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(HookError::Execution(format!(
                "{failed} of {} chat messages failed",
                records.len()
            )));
        }
        Ok(PostHookResult::Delivered { jobs: delivered })
    }
}
