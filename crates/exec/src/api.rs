//! REST API client for the test-execution server.
//!
//! Wraps the execution server's HTTP API (job start, status, stop,
//! retry, list, version) using [`reqwest`]. Every verb is a JSON POST
//! carrying the requestor identity; the server assigns job IDs and
//! owns the job state machine.

use relayci_core::run::JobState;
use relayci_core::types::JobId;
use serde::Deserialize;

/// HTTP client for a single execution server.
pub struct ExecClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    job_id: JobId,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: String,
    #[serde(default)]
    report: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    job_ids: Vec<JobId>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Errors from the execution-server REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("execution server error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ExecClient {
    /// Create a new client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:8080`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Submit a rendered job descriptor for execution.
    ///
    /// Returns the server-assigned job ID. A job ID of 0 is the
    /// server's rejection sentinel and is passed through for the caller
    /// to interpret.
    pub async fn start(&self, requestor: &str, descriptor: &str) -> Result<JobId, ExecError> {
        let body = serde_json::json!({
            "requestor": requestor,
            "job_descriptor": descriptor,
        });

        let response = self
            .client
            .post(format!("{}/start", self.base_url))
            .json(&body)
            .send()
            .await?;

        let parsed: StartResponse = Self::parse_response(response).await?;
        Ok(parsed.job_id)
    }

    /// Query the current state of a job.
    pub async fn status(
        &self,
        requestor: &str,
        job_id: JobId,
    ) -> Result<(JobState, serde_json::Value), ExecError> {
        let body = serde_json::json!({
            "requestor": requestor,
            "job_id": job_id,
        });

        let response = self
            .client
            .post(format!("{}/status", self.base_url))
            .json(&body)
            .send()
            .await?;

        let parsed: StatusResponse = Self::parse_response(response).await?;
        Ok((JobState::parse(&parsed.state), parsed.report))
    }

    /// Ask the server to stop a running job.
    pub async fn stop(&self, requestor: &str, job_id: JobId) -> Result<(), ExecError> {
        let body = serde_json::json!({
            "requestor": requestor,
            "job_id": job_id,
        });

        let response = self
            .client
            .post(format!("{}/stop", self.base_url))
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Re-run a finished job. Returns the new job's ID.
    pub async fn retry(&self, requestor: &str, job_id: JobId) -> Result<JobId, ExecError> {
        let body = serde_json::json!({
            "requestor": requestor,
            "job_id": job_id,
        });

        let response = self
            .client
            .post(format!("{}/retry", self.base_url))
            .json(&body)
            .send()
            .await?;

        let parsed: StartResponse = Self::parse_response(response).await?;
        Ok(parsed.job_id)
    }

    /// List job IDs, optionally filtered by state and tag.
    pub async fn list(
        &self,
        requestor: &str,
        states: &[JobState],
        tags: &[String],
    ) -> Result<Vec<JobId>, ExecError> {
        let body = serde_json::json!({
            "requestor": requestor,
            "states": states.iter().map(JobState::as_str).collect::<Vec<_>>(),
            "tags": tags,
        });

        let response = self
            .client
            .post(format!("{}/list", self.base_url))
            .json(&body)
            .send()
            .await?;

        let parsed: ListResponse = Self::parse_response(response).await?;
        Ok(parsed.job_ids)
    }

    /// Fetch the server's version string.
    pub async fn version(&self) -> Result<String, ExecError> {
        let response = self
            .client
            .get(format!("{}/version", self.base_url))
            .send()
            .await?;

        let parsed: VersionResponse = Self::parse_response(response).await?;
        Ok(parsed.version)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ExecError::Api`] carrying
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ExecError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ExecError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExecError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ExecError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_decodes_without_report() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"state": "JobStateRunning"}"#).unwrap();
        assert_eq!(parsed.state, "JobStateRunning");
        assert!(parsed.report.is_null());
    }

    #[test]
    fn start_response_decodes_rejection_sentinel() {
        let parsed: StartResponse = serde_json::from_str(r#"{"job_id": 0}"#).unwrap();
        assert_eq!(parsed.job_id, 0);
    }

    #[test]
    fn api_error_display() {
        let err = ExecError::Api {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "execution server error (503): maintenance");
    }
}
