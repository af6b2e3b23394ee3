//! Clients for external services the hook layer talks to.
//!
//! Each module wraps one service behind a small typed client:
//! [`github`] posts commit statuses, [`slack`] posts chat messages, and
//! [`s3`] stores result artifacts. Hooks own the decision of *when* to
//! call these; the clients only know *how*.

pub mod github;
pub mod s3;
pub mod slack;

pub use github::{CommitState, CommitStatusClient, GithubError};
pub use s3::{ArtifactStore, UploadError};
pub use slack::{ChatClient, ChatError};
