//! Post-hook that archives run status reports to S3.

use async_trait::async_trait;
use relayci_core::event::EventRecord;
use relayci_core::run::RunRecord;
use relayci_integrations::s3::ArtifactStore;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::hook::{PostHook, PostHookResult};
use crate::params::{HookError, HookParams, UploadParams};

#[derive(Debug, Default)]
pub struct ArtifactUploadHook;

impl ArtifactUploadHook {
    pub fn new() -> Self {
        Self
    }
}

/// Object key for one run's report, unique per job and commit.
fn object_key(prefix: &str, record: &RunRecord) -> String {
    format!(
        "{}/{}-{}.json",
        prefix.trim_end_matches('/'),
        record.job_name,
        record.commit_sha
    )
}

fn report_body(record: &RunRecord) -> Result<Vec<u8>, HookError> {
    Ok(serde_json::to_vec_pretty(record)?)
}

#[async_trait]
impl PostHook for ArtifactUploadHook {
    fn name(&self) -> &'static str {
        "artifact-upload"
    }

    fn validate_parameters(&self, raw: &Value) -> Result<HookParams, HookError> {
        let params: UploadParams = serde_json::from_value(raw.clone())?;
        params.validate()?;
        Ok(HookParams::Upload(params))
    }

    async fn run(
        &mut self,
        cancel: &CancellationToken,
        params: &HookParams,
        _event: &EventRecord,
        records: &[RunRecord],
    ) -> Result<PostHookResult, HookError> {
        let HookParams::Upload(params) = params else {
            return Err(HookError::ParamsMismatch {
                name: self.name().to_string(),
            });
        };

        let store = ArtifactStore::from_env(&params.region).await;
        let mut uploaded = 0usize;
        let mut failed = 0usize;
        for record in records {
            if cancel.is_cancelled() {
                return Err(HookError::Execution(
                    "cancelled before all reports were uploaded".to_string(),
                ));
            }
            let key = object_key(&params.path, record);
            let body = report_body(record)?;
            match store
                .upload(&params.bucket, &key, body, "application/json")
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        bucket = %params.bucket,
                        key = %key,
                        job_id = record.job_id,
                        "uploaded run report"
                    );
                    uploaded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        bucket = %params.bucket,
                        key = %key,
                        job_id = record.job_id,
                        error = %e,
                        "run report upload failed"
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(HookError::Execution(format!(
                "{failed} of {} report uploads failed",
                records.len()
            )));
        }
        Ok(PostHookResult::Delivered { jobs: uploaded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const SHA: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

    fn record() -> RunRecord {
        RunRecord {
            job_id: 7,
            job_name: "smoke".to_string(),
            template: "smoke.json".to_string(),
            commit_sha: SHA.to_string(),
            status: None,
        }
    }

    #[test]
    fn object_key_is_prefix_job_sha() {
        assert_eq!(
            object_key("ci/reports", &record()),
            format!("ci/reports/smoke-{SHA}.json")
        );
    }

    #[test]
    fn trailing_slash_in_prefix_normalized() {
        assert_eq!(
            object_key("ci/reports/", &record()),
            format!("ci/reports/smoke-{SHA}.json")
        );
    }

    #[test]
    fn report_body_is_json_with_job_fields() {
        let body = report_body(&record()).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["job_id"], 7);
        assert_eq!(value["job_name"], "smoke");
        assert_eq!(value["commit_sha"], SHA);
    }

    #[test]
    fn validate_rejects_empty_path() {
        let hook = ArtifactUploadHook::new();
        let err = hook
            .validate_parameters(&json!({
                "region": "eu-west-1",
                "bucket": "ci-results",
                "path": ""
            }))
            .unwrap_err();
        assert_matches!(err, HookError::Parameters(msg) if msg.contains("path"));
    }
}
