//! Fatal pipeline errors.
//!
//! Only three things abort a dispatch cycle: a pre-hook that refuses to
//! let a job start, a hook reference that cannot be resolved at all,
//! and cancellation. Everything else is contained per template or per
//! hook and reported through the cycle's failure list.

use relayci_hooks::bundle::BundleError;
use relayci_hooks::params::HookError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A pre-hook failed validation or execution; the cycle aborts
    /// before submission.
    #[error("pre-hook {name:?} failed: {source}")]
    PreHook {
        name: String,
        #[source]
        source: HookError,
    },

    /// A configured hook name is unknown to the registry. This is a
    /// configuration error, not a runtime condition.
    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// The cycle was cancelled while waiting for job completion.
    #[error("dispatch cycle cancelled")]
    Cancelled,
}
