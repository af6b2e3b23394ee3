//! Integration hook that mirrors run progress onto GitHub commit
//! statuses.
//!
//! `before_job` marks the commit pending under one status context per
//! job name; `after_job` resolves each context to success, failure, or
//! error from the run's terminal state. The status context is
//! `relayci: {job_name}` so parallel templates stay distinguishable.

use async_trait::async_trait;
use relayci_core::event::EventRecord;
use relayci_core::run::{RunRecord, TerminalStatus};
use relayci_integrations::github::{CommitState, CommitStatusClient};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::hook::IntegrationHook;
use crate::params::{CommitStatusParams, HookError, HookParams};

#[derive(Default)]
pub struct CommitStatusHook {
    client: Option<CommitStatusClient>,
    target_url: String,
}

impl CommitStatusHook {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&CommitStatusClient, HookError> {
        self.client.as_ref().ok_or_else(|| {
            HookError::Execution("commit-status hook used before setup".to_string())
        })
    }
}

/// Status context for one job.
fn status_context(job_name: &str) -> String {
    format!("relayci: {job_name}")
}

/// Map a run's terminal status to a commit state and description.
/// A run that never reached a terminal state is an error, not a failure.
fn resolve(status: Option<&TerminalStatus>) -> (CommitState, String) {
    match status {
        Some(s) if s.success() => (
            CommitState::Success,
            "job completed successfully".to_string(),
        ),
        Some(s) if s.state == relayci_core::run::JobState::Failed => {
            (CommitState::Failure, "job failed".to_string())
        }
        Some(s) => (
            CommitState::Error,
            format!("job ended in state {}", s.state),
        ),
        None => (
            CommitState::Error,
            "job did not reach a terminal state".to_string(),
        ),
    }
}

#[async_trait]
impl IntegrationHook for CommitStatusHook {
    fn name(&self) -> &'static str {
        "commit-status"
    }

    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError> {
        let params: CommitStatusParams = serde_json::from_value(raw.clone())?;
        params.validate()?;
        Ok(HookParams::CommitStatus(params))
    }

    fn setup(&mut self, params: &HookParams) -> Result<(), HookError> {
        let HookParams::CommitStatus(params) = params else {
            return Err(HookError::ParamsMismatch {
                name: self.name().to_string(),
            });
        };
        self.client = Some(CommitStatusClient::new(
            &params.token,
            &params.owner,
            &params.repository,
        ));
        self.target_url = params.target_url.clone();
        Ok(())
    }

    async fn before_job(
        &mut self,
        cancel: &CancellationToken,
        event: &EventRecord,
        job_names: &[String],
    ) -> Result<(), HookError> {
        let client = self.client()?;
        let mut failed = 0usize;
        for job_name in job_names {
            if cancel.is_cancelled() {
                return Err(HookError::Execution(
                    "cancelled before all pending statuses were posted".to_string(),
                ));
            }
            if let Err(e) = client
                .set_status(
                    &event.head_commit,
                    CommitState::Pending,
                    &status_context(job_name),
                    "job submitted",
                    &self.target_url,
                )
                .await
            {
                tracing::warn!(job_name = %job_name, error = %e, "pending status post failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(HookError::Execution(format!(
                "{failed} of {} pending statuses failed",
                job_names.len()
            )));
        }
        Ok(())
    }

    async fn after_job(
        &mut self,
        cancel: &CancellationToken,
        records: &[RunRecord],
    ) -> Result<(), HookError> {
        let client = self.client()?;
        let mut failed = 0usize;
        for record in records {
            if cancel.is_cancelled() {
                return Err(HookError::Execution(
                    "cancelled before all final statuses were posted".to_string(),
                ));
            }
            let (state, description) = resolve(record.status.as_ref());
            if let Err(e) = client
                .set_status(
                    &record.commit_sha,
                    state,
                    &status_context(&record.job_name),
                    &description,
                    &self.target_url,
                )
                .await
            {
                tracing::warn!(
                    job_name = %record.job_name,
                    job_id = record.job_id,
                    error = %e,
                    "final status post failed"
                );
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(HookError::Execution(format!(
                "{failed} of {} final statuses failed",
                records.len()
            )));
        }
        Ok(())
    }
}
