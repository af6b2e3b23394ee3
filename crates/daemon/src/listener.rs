//! Inbound webhook listener.
//!
//! Normalizes GitHub push and pull-request deliveries into
//! [`EventRecord`]s and feeds them to the dispatch queue. Signature
//! verification is expected to happen upstream (reverse proxy); this
//! layer only validates shape. A full queue refuses the delivery with
//! 503 so the sender's retry policy can kick in.

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use relayci_core::event::EventRecord;
use serde_json::Value;
use tokio::sync::mpsc;

const EVENT_KIND_HEADER: &str = "x-github-event";

/// Outcome of normalizing one delivery.
#[derive(Debug)]
enum Normalization {
    Event(EventRecord),
    /// Event kinds and actions we deliberately don't dispatch on.
    Ignored,
    /// A kind we handle, but the payload is missing or malforms a
    /// required field.
    Malformed,
}

/// Map a delivery to an event record.
///
/// Push events use `{after, repository.ssh_url, ref}`. Pull-request
/// events use the head commit, head repository, and head branch;
/// `synchronize` and `closed` actions are ignored.
fn normalize_event(kind: &str, payload: &Value) -> Normalization {
    match kind {
        "push" => {
            let (Some(after), Some(ssh_url), Some(ref_name)) = (
                payload["after"].as_str(),
                payload["repository"]["ssh_url"].as_str(),
                payload["ref"].as_str(),
            ) else {
                return Normalization::Malformed;
            };
            match EventRecord::new(after, ssh_url, ref_name) {
                Ok(event) => Normalization::Event(event),
                Err(_) => Normalization::Malformed,
            }
        }
        "pull_request" => {
            match payload["action"].as_str() {
                Some("synchronize") | Some("closed") => return Normalization::Ignored,
                Some(_) => {}
                None => return Normalization::Malformed,
            }
            let head = &payload["pull_request"]["head"];
            let (Some(sha), Some(ssh_url), Some(ref_name)) = (
                head["sha"].as_str(),
                head["repo"]["ssh_url"].as_str(),
                head["ref"].as_str(),
            ) else {
                return Normalization::Malformed;
            };
            match EventRecord::new(sha, ssh_url, ref_name) {
                Ok(event) => Normalization::Event(event),
                Err(_) => Normalization::Malformed,
            }
        }
        _ => Normalization::Ignored,
    }
}

async fn webhook(
    State(queue): State<mpsc::Sender<EventRecord>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> StatusCode {
    let kind = headers
        .get(EVENT_KIND_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match normalize_event(kind, &payload) {
        Normalization::Event(event) => {
            tracing::info!(kind, commit = %event.head_commit, "webhook delivery accepted");
            match queue.try_send(event) {
                Ok(()) => StatusCode::ACCEPTED,
                Err(e) => {
                    tracing::warn!(error = %e, "event queue refused delivery");
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }
        }
        Normalization::Ignored => {
            tracing::debug!(kind, "webhook delivery ignored");
            StatusCode::NO_CONTENT
        }
        Normalization::Malformed => {
            tracing::warn!(kind, "malformed webhook delivery");
            StatusCode::BAD_REQUEST
        }
    }
}

/// Build the listener router around the dispatch queue's sender.
pub fn router(queue: mpsc::Sender<EventRecord>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .with_state(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHA: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

    fn push_payload() -> Value {
        json!({
            "after": SHA,
            "ref": "refs/heads/main",
            "repository": { "ssh_url": "git@example.com:org/repo.git" }
        })
    }

    fn pull_request_payload(action: &str) -> Value {
        json!({
            "action": action,
            "pull_request": {
                "head": {
                    "sha": SHA,
                    "ref": "feature/widget",
                    "repo": { "ssh_url": "git@example.com:org/fork.git" }
                }
            }
        })
    }

    #[test]
    fn push_event_normalized() {
        let Normalization::Event(event) = normalize_event("push", &push_payload()) else {
            panic!("expected event");
        };
        assert_eq!(event.head_commit, SHA);
        assert_eq!(event.repo_url, "git@example.com:org/repo.git");
        assert_eq!(event.ref_name, "refs/heads/main");
    }

    #[test]
    fn opened_pull_request_normalized() {
        let Normalization::Event(event) =
            normalize_event("pull_request", &pull_request_payload("opened"))
        else {
            panic!("expected event");
        };
        assert_eq!(event.head_commit, SHA);
        assert_eq!(event.repo_url, "git@example.com:org/fork.git");
        assert_eq!(event.ref_name, "feature/widget");
    }

    #[test]
    fn synchronize_and_closed_actions_ignored() {
        for action in ["synchronize", "closed"] {
            assert!(matches!(
                normalize_event("pull_request", &pull_request_payload(action)),
                Normalization::Ignored
            ));
        }
    }

    #[test]
    fn unknown_kind_ignored() {
        assert!(matches!(
            normalize_event("issues", &json!({})),
            Normalization::Ignored
        ));
    }

    #[test]
    fn short_sha_is_malformed() {
        let mut payload = push_payload();
        payload["after"] = json!("abc123");
        assert!(matches!(
            normalize_event("push", &payload),
            Normalization::Malformed
        ));
    }

    #[test]
    fn missing_repository_is_malformed() {
        let mut payload = push_payload();
        payload.as_object_mut().unwrap().remove("repository");
        assert!(matches!(
            normalize_event("push", &payload),
            Normalization::Malformed
        ));
    }
}
