//! Hook abstraction and registry.
//!
//! Hooks are small units of behavior attached to the dispatch cycle:
//! pre-hooks run before any job is submitted, post-hooks run after the
//! cycle's jobs have been handled, and integration hooks bracket the
//! cycle with `setup` / `before_job` / `after_job` callbacks.
//!
//! A [`HookRegistry`] maps hook names to factories. Configuration
//! references hooks by name with raw JSON parameters; the registry
//! resolves each reference into a [`bundle`] holding a fresh hook
//! instance together with its validated, typed parameters. Parameter
//! validation happens once at resolution time, never inside `run`.

pub mod bundle;
pub mod builtin;
pub mod hook;
pub mod params;
pub mod registry;

pub use bundle::{BundleError, IntegrationHookBundle, PostHookBundle, PreHookBundle};
pub use hook::{IntegrationHook, PostHook, PostHookResult, PreHook, PreHookResult};
pub use params::{HookError, HookParams};
pub use registry::{HookKind, HookRegistry, RegistryError};
