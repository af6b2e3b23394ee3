//! Shared domain types for the relayci CI-trigger client.
//!
//! This crate carries the types that cross crate boundaries: the
//! normalized source-control event ([`EventRecord`]), the per-job
//! bookkeeping entry ([`RunRecord`]), job states, and the client
//! configuration surface ([`ClientConfig`]). It has no I/O beyond
//! reading the config file.

pub mod config;
pub mod error;
pub mod event;
pub mod run;
pub mod types;

pub use config::{ClientConfig, ConfigError, HookDescriptor, TemplateFormat};
pub use error::CoreError;
pub use event::EventRecord;
pub use run::{JobState, RunRecord, TerminalStatus};
pub use types::JobId;
