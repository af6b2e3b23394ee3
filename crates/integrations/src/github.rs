//! GitHub commit-status client.
//!
//! Wraps the `POST /repos/{owner}/{repo}/statuses/{sha}` endpoint of
//! the GitHub REST API using [`reqwest`].

use serde::Serialize;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub requires a User-Agent on every API request.
const USER_AGENT: &str = "relayci";

/// The four states a commit status can take on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the GitHub commit-status layer.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code.
    #[error("GitHub API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

#[derive(Serialize)]
struct StatusBody<'a> {
    state: CommitState,
    context: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
}

/// Client for posting commit statuses to one repository.
pub struct CommitStatusClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
    owner: String,
    repository: String,
}

impl CommitStatusClient {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token, owner, repository)
    }

    /// Create a client against a non-default API base URL (used by
    /// tests and GitHub Enterprise installs).
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    /// Post a commit status for `sha`.
    ///
    /// An empty `target_url` omits the field entirely; GitHub rejects
    /// statuses whose target URL is present but not a valid URL.
    pub async fn set_status(
        &self,
        sha: &str,
        state: CommitState,
        context: &str,
        description: &str,
        target_url: &str,
    ) -> Result<(), GithubError> {
        let body = StatusBody {
            state,
            context,
            description,
            target_url: if target_url.is_empty() {
                None
            } else {
                Some(target_url)
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/repos/{}/{}/statuses/{}",
                self.api_base, self.owner, self.repository, sha
            ))
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    // ---- private helpers ----

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), GithubError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
