//! Per-event dispatch pipeline.
//!
//! One [`Dispatcher`] processes one event at a time: pre-hooks, then
//! template rendering and job submission, an optional wait for
//! completion, and finally post-hooks. Events arrive through a bounded
//! queue drained by [`Dispatcher::serve`], which never overlaps two
//! cycles — template reads and commit-status ordering stay serialized
//! per repository.
//!
//! Failure containment is the point of this module: a pre-hook failure
//! aborts the cycle before anything is submitted, a rejected template
//! never blocks its siblings, and a post-hook failure never blocks the
//! remaining post-hooks. Everything non-fatal is collected into the
//! cycle's [`CycleReport`].

pub mod cycle;
pub mod dispatcher;
pub mod error;

pub use cycle::{CycleFailure, CycleReport};
pub use dispatcher::{event_queue, Dispatcher, EVENT_QUEUE_CAPACITY};
pub use error::PipelineError;
