//! Per-cycle bookkeeping.

use relayci_core::run::RunRecord;
use relayci_core::types::JobId;
use relayci_exec::api::ExecError;
use relayci_exec::poller::WaitError;
use relayci_hooks::params::HookError;
use relayci_render::renderer::RenderError;

/// A contained failure within a dispatch cycle. None of these abort
/// the cycle; they are collected and surfaced alongside the records.
#[derive(Debug, thiserror::Error)]
pub enum CycleFailure {
    #[error("failed to read template {template:?}: {source}")]
    TemplateRead {
        template: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template {template:?}: {source}")]
    Render {
        template: String,
        #[source]
        source: RenderError,
    },

    #[error("submission of template {template:?} failed: {source}")]
    Submission {
        template: String,
        #[source]
        source: ExecError,
    },

    /// The server answered with the job-ID 0 sentinel.
    #[error("execution server rejected template {template:?}")]
    SubmissionRejected { template: String },

    #[error("wait for job {job_id} failed: {source}")]
    Wait {
        job_id: JobId,
        #[source]
        source: WaitError,
    },

    #[error("post-hook {name:?} failed: {source}")]
    PostHook {
        name: String,
        #[source]
        source: HookError,
    },

    #[error("integration hook {name:?} failed during {phase}: {source}")]
    Integration {
        name: String,
        phase: &'static str,
        source: HookError,
    },
}

/// Outcome of one dispatch cycle: the runs it produced and every
/// contained failure encountered along the way.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub records: Vec<RunRecord>,
    pub failures: Vec<CycleFailure>,
}

impl CycleReport {
    /// Whether every template made it through submission. Post-hook and
    /// integration failures do not count against this: the jobs are
    /// already dispatched.
    pub fn all_submitted(&self) -> bool {
        !self.failures.iter().any(|f| {
            matches!(
                f,
                CycleFailure::TemplateRead { .. }
                    | CycleFailure::Render { .. }
                    | CycleFailure::Submission { .. }
                    | CycleFailure::SubmissionRejected { .. }
            )
        })
    }
}
