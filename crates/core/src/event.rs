//! Normalized source-control event records.
//!
//! An [`EventRecord`] is the distilled form of a webhook delivery:
//! the head commit, the repository clone URL, and the ref that moved.
//! Records are validated at construction so that malformed events are
//! rejected before they ever reach the renderer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Length of a full git commit SHA in hex characters.
pub const COMMIT_SHA_LENGTH: usize = 40;

/// A normalized source-control event, consumed by exactly one dispatch
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Full 40-character hex SHA of the head commit.
    pub head_commit: String,
    /// Clone URL of the repository the event originated from.
    pub repo_url: String,
    /// Name of the ref that moved (branch or tag).
    pub ref_name: String,
}

impl EventRecord {
    /// Build a validated event record.
    ///
    /// Fails if `head_commit` is not a full 40-character hex SHA.
    pub fn new(
        head_commit: impl Into<String>,
        repo_url: impl Into<String>,
        ref_name: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let head_commit = head_commit.into();
        validate_commit_sha(&head_commit)?;
        Ok(Self {
            head_commit,
            repo_url: repo_url.into(),
            ref_name: ref_name.into(),
        })
    }
}

/// Validate that a string is a full lowercase-or-uppercase hex commit SHA.
pub fn validate_commit_sha(sha: &str) -> Result<(), CoreError> {
    if sha.len() != COMMIT_SHA_LENGTH {
        return Err(CoreError::Validation(format!(
            "Commit SHA must be {COMMIT_SHA_LENGTH} hex characters, got {}",
            sha.len()
        )));
    }
    if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Commit SHA contains non-hex characters: \"{sha}\""
        )));
    }
    Ok(())
}
