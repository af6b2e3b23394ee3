//! Job states and per-job run bookkeeping.
//!
//! A [`RunRecord`] correlates a submitted job with its originating
//! template and, once the completion poller has observed a terminal
//! state, with its [`TerminalStatus`]. The record set is built fresh
//! for every dispatch cycle and discarded afterwards.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

// ---------------------------------------------------------------------------
// JobState
// ---------------------------------------------------------------------------

/// State of a job as reported by the execution server.
///
/// The server may grow new intermediate states; anything unrecognized
/// parses to [`JobState::Other`] and is treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Started,
    Running,
    Completed,
    Failed,
    Cancelled,
    Paused,
    Other(String),
}

impl JobState {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "JobStateStarted",
            Self::Running => "JobStateRunning",
            Self::Completed => "JobStateCompleted",
            Self::Failed => "JobStateFailed",
            Self::Cancelled => "JobStateCancelled",
            Self::Paused => "JobStatePaused",
            Self::Other(s) => s,
        }
    }

    /// Parse a wire-format state string. Unknown states are preserved
    /// verbatim in [`JobState::Other`].
    pub fn parse(s: &str) -> Self {
        match s {
            "JobStateStarted" => Self::Started,
            "JobStateRunning" => Self::Running,
            "JobStateCompleted" => Self::Completed,
            "JobStateFailed" => Self::Failed,
            "JobStateCancelled" => Self::Cancelled,
            "JobStatePaused" => Self::Paused,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether no further state transitions can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Paused
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TerminalStatus
// ---------------------------------------------------------------------------

/// The final state of a job plus whatever report the server attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStatus {
    pub state: JobState,
    /// Free-form server report (test results, timing, artifacts).
    pub report: serde_json::Value,
}

impl TerminalStatus {
    /// Pass/fail verdict: only a completed job counts as a pass.
    pub fn success(&self) -> bool {
        matches!(self.state, JobState::Completed)
    }
}

// ---------------------------------------------------------------------------
// RunRecord
// ---------------------------------------------------------------------------

/// Bookkeeping entry for one submitted job within a dispatch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Server-assigned job identifier; always non-zero.
    pub job_id: JobId,
    /// `JobName` extracted from the template.
    pub job_name: String,
    /// Template filename this job was rendered from.
    pub template: String,
    /// Head commit the job was triggered for.
    pub commit_sha: String,
    /// Terminal status, filled in by the completion poller when the
    /// cycle runs in wait mode. `None` means "not observed".
    pub status: Option<TerminalStatus>,
}
