//! Remote execution-server client and completion poller.
//!
//! [`ExecClient`] wraps the execution server's REST endpoints. The
//! pipeline consumes it through the [`ExecutionBackend`] trait so tests
//! can substitute a fake server, and waits on submitted jobs with
//! [`poller::wait_for_completion`].

pub mod api;
pub mod backend;
pub mod poller;

pub use api::{ExecClient, ExecError};
pub use backend::{ExecutionBackend, JobStatus};
pub use poller::{wait_for_completion, WaitError};
