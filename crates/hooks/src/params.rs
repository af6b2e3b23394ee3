//! Typed hook parameters.
//!
//! Configuration carries hook parameters as raw JSON. Each hook's
//! `validate_parameters` decodes that JSON into one variant of
//! [`HookParams`] exactly once, at bundle-resolution time. A hook that
//! is later handed the wrong variant reports [`HookError::ParamsMismatch`]
//! instead of guessing.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by hook validation and execution.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Parameters decoded but failed a semantic check.
    #[error("invalid hook parameters: {0}")]
    Parameters(String),

    /// Parameters could not be decoded into the hook's expected shape.
    #[error("malformed hook parameters: {0}")]
    Decode(#[from] serde_json::Error),

    /// A hook was run with a parameter variant it did not validate.
    #[error("hook {name:?} received parameters for a different hook")]
    ParamsMismatch { name: String },

    /// The hook ran and failed.
    #[error("hook execution failed: {0}")]
    Execution(String),
}

// ---------------------------------------------------------------------------
// Parameter variants
// ---------------------------------------------------------------------------

/// Validated parameters, one variant per parameter shape.
#[derive(Debug, Clone)]
pub enum HookParams {
    /// The hook takes no parameters.
    None,
    CommitStatus(CommitStatusParams),
    Chat(ChatParams),
    Upload(UploadParams),
}

/// Parameters for the commit-status integration hook.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitStatusParams {
    pub owner: String,
    pub repository: String,
    pub token: String,
    /// URL the posted status links back to. Empty omits the link.
    #[serde(default)]
    pub target_url: String,
}

/// Parameters for the chat-message post-hook.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatParams {
    pub webhook_url: String,
}

/// Parameters for the artifact-upload post-hook.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadParams {
    pub region: String,
    pub bucket: String,
    /// Key prefix under which result artifacts are stored.
    pub path: String,
}

impl UploadParams {
    /// Check that every field is non-empty, naming the first that isn't.
    pub fn validate(&self) -> Result<(), HookError> {
        for (field, value) in [
            ("region", &self.region),
            ("bucket", &self.bucket),
            ("path", &self.path),
        ] {
            if value.trim().is_empty() {
                return Err(HookError::Parameters(format!(
                    "upload parameter {field:?} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

impl CommitStatusParams {
    pub fn validate(&self) -> Result<(), HookError> {
        for (field, value) in [
            ("owner", &self.owner),
            ("repository", &self.repository),
            ("token", &self.token),
        ] {
            if value.trim().is_empty() {
                return Err(HookError::Parameters(format!(
                    "commit-status parameter {field:?} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn upload_params_decode_and_validate() {
        let params: UploadParams = serde_json::from_value(json!({
            "region": "eu-west-1",
            "bucket": "ci-results",
            "path": "relayci/reports"
        }))
        .unwrap();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn upload_params_reject_empty_bucket() {
        let params: UploadParams = serde_json::from_value(json!({
            "region": "eu-west-1",
            "bucket": "  ",
            "path": "reports"
        }))
        .unwrap();
        let err = params.validate().unwrap_err();
        assert_matches!(err, HookError::Parameters(msg) if msg.contains("bucket"));
    }

    #[test]
    fn commit_status_target_url_defaults_empty() {
        let params: CommitStatusParams = serde_json::from_value(json!({
            "owner": "acme",
            "repository": "widgets",
            "token": "t0ken"
        }))
        .unwrap();
        assert!(params.target_url.is_empty());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn commit_status_rejects_empty_token() {
        let params: CommitStatusParams = serde_json::from_value(json!({
            "owner": "acme",
            "repository": "widgets",
            "token": ""
        }))
        .unwrap();
        assert_matches!(
            params.validate().unwrap_err(),
            HookError::Parameters(msg) if msg.contains("token")
        );
    }
}
