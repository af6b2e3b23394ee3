//! Execution backend seam.
//!
//! The pipeline and poller only need two operations from the execution
//! server; expressing them as a trait lets tests run the full dispatch
//! cycle against an in-memory fake.

use async_trait::async_trait;
use relayci_core::run::JobState;
use relayci_core::types::JobId;

use crate::api::{ExecClient, ExecError};

/// A point-in-time job state plus the server's report for it.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub state: JobState,
    pub report: serde_json::Value,
}

/// The slice of the execution server the dispatch cycle depends on.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submit a rendered descriptor; returns the server-assigned job ID
    /// (0 is the rejection sentinel).
    async fn start_job(&self, requestor: &str, descriptor: &str) -> Result<JobId, ExecError>;

    /// Query the current state of a job.
    async fn job_status(&self, requestor: &str, job_id: JobId) -> Result<JobStatus, ExecError>;
}

#[async_trait]
impl ExecutionBackend for ExecClient {
    async fn start_job(&self, requestor: &str, descriptor: &str) -> Result<JobId, ExecError> {
        self.start(requestor, descriptor).await
    }

    async fn job_status(&self, requestor: &str, job_id: JobId) -> Result<JobStatus, ExecError> {
        let (state, report) = self.status(requestor, job_id).await?;
        Ok(JobStatus { state, report })
    }
}
