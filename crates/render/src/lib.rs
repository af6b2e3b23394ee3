//! Job-descriptor rendering.
//!
//! A job template becomes a concrete job descriptor in two independent
//! passes:
//!
//! 1. **Placeholder substitution** ([`placeholder`]) -- a text-level
//!    pass that replaces `[[NAME]]` markers with event data before any
//!    structural parsing happens.
//! 2. **Structural rewrite** ([`plan`]) -- the template is parsed into
//!    a typed test-plan tree, the checkout step's `args` are rewritten
//!    with event data at fixed positions, and the tree is re-serialized
//!    to JSON regardless of the input format.
//!
//! [`Renderer`] composes the two passes.

pub mod placeholder;
pub mod plan;
pub mod renderer;

pub use plan::TestPlan;
pub use renderer::{RenderError, Renderer};
