//! Completion poller.
//!
//! Queries a job's status on a fixed interval until a terminal state
//! arrives. Cancellation is checked before every query, and the
//! inter-query sleep races against the cancellation token, so shutdown
//! latency is bounded by one tick. A query error aborts the wait; the
//! server's own retry policy is not duplicated here.

use std::time::Duration;

use relayci_core::run::TerminalStatus;
use relayci_core::types::JobId;
use tokio_util::sync::CancellationToken;

use crate::api::ExecError;
use crate::backend::ExecutionBackend;

#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The caller's cancellation token fired before a terminal state.
    #[error("wait for job completion was cancelled")]
    Cancelled,

    /// A status query failed; the wait is not retried.
    #[error("job status query failed: {0}")]
    Query(#[from] ExecError),
}

/// Poll `job_id` until it reaches a terminal state.
///
/// The sleep between attempts is mandatory even after the first
/// non-terminal response; the poller never busy-loops.
pub async fn wait_for_completion<B: ExecutionBackend + ?Sized>(
    backend: &B,
    requestor: &str,
    job_id: JobId,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> Result<TerminalStatus, WaitError> {
    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }

        let status = backend.job_status(requestor, job_id).await?;
        if status.state.is_terminal() {
            tracing::debug!(job_id, state = %status.state, "job reached terminal state");
            return Ok(TerminalStatus {
                state: status.state,
                report: status.report,
            });
        }
        tracing::trace!(job_id, state = %status.state, "job still running");

        tokio::select! {
            _ = cancel.cancelled() => return Err(WaitError::Cancelled),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
