//! Slack incoming-webhook client.
//!
//! Posts plain-text messages to a Slack incoming-webhook URL. Slack
//! answers a successful delivery with a literal `ok` body, so the
//! client checks the body as well as the status code.

/// Errors from the chat-message layer.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook endpoint rejected the message.
    #[error("chat webhook error ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Client for one incoming-webhook URL.
pub struct ChatClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl ChatClient {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    /// Post a plain-text message, verifying Slack's `ok` acknowledgment.
    pub async fn post_message(&self, text: &str) -> Result<(), ChatError> {
        let body = serde_json::json!({ "text": text });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if !status.is_success() || body != "ok" {
            return Err(ChatError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
