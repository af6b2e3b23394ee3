//! Hook registry.
//!
//! Maps case-insensitive hook names to factories, one namespace per
//! hook kind. Registration of a duplicate name is an error rather than
//! a silent overwrite. Lookup clones the factory under the read lock
//! and invokes it outside, so a slow hook constructor never holds the
//! registry.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::hook::{
    IntegrationHook, IntegrationHookFactory, PostHook, PostHookFactory, PreHook, PreHookFactory,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("hook name must not be empty")]
    EmptyName,

    #[error("{kind} hook {name:?} is already registered")]
    DuplicateName { kind: HookKind, name: String },

    #[error("no {kind} hook named {name:?} is registered")]
    UnknownHook { kind: HookKind, name: String },
}

/// Which namespace a hook lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Pre,
    Post,
    Integration,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pre => "pre",
            Self::Post => "post",
            Self::Integration => "integration",
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Thread-safe name-to-factory maps for the three hook kinds.
#[derive(Default)]
pub struct HookRegistry {
    pre: RwLock<HashMap<String, PreHookFactory>>,
    post: RwLock<HashMap<String, PostHookFactory>>,
    integration: RwLock<HashMap<String, IntegrationHookFactory>>,
}

fn normalize(name: &str) -> Result<String, RegistryError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    Ok(name)
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pre(
        &self,
        name: &str,
        factory: PreHookFactory,
    ) -> Result<(), RegistryError> {
        let name = normalize(name)?;
        let mut map = self.pre.write().expect("hook registry lock poisoned");
        if map.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: HookKind::Pre,
                name,
            });
        }
        map.insert(name, factory);
        Ok(())
    }

    pub fn register_post(
        &self,
        name: &str,
        factory: PostHookFactory,
    ) -> Result<(), RegistryError> {
        let name = normalize(name)?;
        let mut map = self.post.write().expect("hook registry lock poisoned");
        if map.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: HookKind::Post,
                name,
            });
        }
        map.insert(name, factory);
        Ok(())
    }

    pub fn register_integration(
        &self,
        name: &str,
        factory: IntegrationHookFactory,
    ) -> Result<(), RegistryError> {
        let name = normalize(name)?;
        let mut map = self
            .integration
            .write()
            .expect("hook registry lock poisoned");
        if map.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: HookKind::Integration,
                name,
            });
        }
        map.insert(name, factory);
        Ok(())
    }

    /// Instantiate a fresh pre-hook by name.
    pub fn pre_hook(&self, name: &str) -> Result<Box<dyn PreHook>, RegistryError> {
        let name = normalize(name)?;
        let factory = {
            let map = self.pre.read().expect("hook registry lock poisoned");
            map.get(&name).cloned()
        };
        let factory = factory.ok_or(RegistryError::UnknownHook {
            kind: HookKind::Pre,
            name,
        })?;
        Ok(factory())
    }

    /// Instantiate a fresh post-hook by name.
    pub fn post_hook(&self, name: &str) -> Result<Box<dyn PostHook>, RegistryError> {
        let name = normalize(name)?;
        let factory = {
            let map = self.post.read().expect("hook registry lock poisoned");
            map.get(&name).cloned()
        };
        let factory = factory.ok_or(RegistryError::UnknownHook {
            kind: HookKind::Post,
            name,
        })?;
        Ok(factory())
    }

    /// Instantiate a fresh integration hook by name.
    pub fn integration_hook(
        &self,
        name: &str,
    ) -> Result<Box<dyn IntegrationHook>, RegistryError> {
        let name = normalize(name)?;
        let factory = {
            let map = self
                .integration
                .read()
                .expect("hook registry lock poisoned");
            map.get(&name).cloned()
        };
        let factory = factory.ok_or(RegistryError::UnknownHook {
            kind: HookKind::Integration,
            name,
        })?;
        Ok(factory())
    }
}
