//! Builtin hooks.
//!
//! The hooks that ship with the client. [`register_builtin`] installs
//! them all into a registry under their canonical names.

pub mod chat_message;
pub mod commit_status;
pub mod noop;
pub mod upload;

use std::sync::Arc;

use crate::registry::{HookRegistry, RegistryError};

/// Install every builtin hook into `registry`.
pub fn register_builtin(registry: &HookRegistry) -> Result<(), RegistryError> {
    registry.register_pre("noop", Arc::new(|| Box::new(noop::NoopHook::new())))?;
    registry.register_post(
        "chat-message",
        Arc::new(|| Box::new(chat_message::ChatMessageHook::new())),
    )?;
    registry.register_post(
        "artifact-upload",
        Arc::new(|| Box::new(upload::ArtifactUploadHook::new())),
    )?;
    registry.register_integration(
        "commit-status",
        Arc::new(|| Box::new(commit_status::CommitStatusHook::new())),
    )?;
    Ok(())
}
