//! Hook bundles.
//!
//! A bundle pairs a fresh hook instance with its validated parameters,
//! resolved from a configuration [`HookDescriptor`]. Bundling front-
//! loads both failure modes (unknown name, bad parameters) so a cycle
//! never discovers a misconfigured hook halfway through.

use relayci_core::config::HookDescriptor;

use crate::hook::{IntegrationHook, PostHook, PreHook};
use crate::params::{HookError, HookParams};
use crate::registry::{HookRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("hook {name:?} rejected its parameters: {source}")]
    Parameters {
        name: String,
        #[source]
        source: HookError,
    },
}

pub struct PreHookBundle {
    pub name: String,
    pub hook: Box<dyn PreHook>,
    pub params: HookParams,
}

pub struct PostHookBundle {
    pub name: String,
    pub hook: Box<dyn PostHook>,
    pub params: HookParams,
}

pub struct IntegrationHookBundle {
    pub name: String,
    pub hook: Box<dyn IntegrationHook>,
    pub params: HookParams,
}

impl HookRegistry {
    /// Resolve a pre-hook descriptor into an instance plus validated
    /// parameters.
    pub fn pre_bundle(&self, descriptor: &HookDescriptor) -> Result<PreHookBundle, BundleError> {
        let hook = self.pre_hook(&descriptor.name)?;
        let params =
            hook.validate_parameters(&descriptor.parameters)
                .map_err(|source| BundleError::Parameters {
                    name: descriptor.name.clone(),
                    source,
                })?;
        Ok(PreHookBundle {
            name: descriptor.name.clone(),
            hook,
            params,
        })
    }

    pub fn post_bundle(&self, descriptor: &HookDescriptor) -> Result<PostHookBundle, BundleError> {
        let hook = self.post_hook(&descriptor.name)?;
        let params =
            hook.validate_parameters(&descriptor.parameters)
                .map_err(|source| BundleError::Parameters {
                    name: descriptor.name.clone(),
                    source,
                })?;
        Ok(PostHookBundle {
            name: descriptor.name.clone(),
            hook,
            params,
        })
    }

    /// Resolve an integration-hook descriptor and run its `setup` with
    /// the validated parameters.
    pub fn integration_bundle(
        &self,
        descriptor: &HookDescriptor,
    ) -> Result<IntegrationHookBundle, BundleError> {
        let mut hook = self.integration_hook(&descriptor.name)?;
        let params =
            hook.validate_parameters(&descriptor.parameters)
                .map_err(|source| BundleError::Parameters {
                    name: descriptor.name.clone(),
                    source,
                })?;
        hook.setup(&params).map_err(|source| BundleError::Parameters {
            name: descriptor.name.clone(),
            source,
        })?;
        Ok(IntegrationHookBundle {
            name: descriptor.name.clone(),
            hook,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::register_builtin;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn descriptor(name: &str, parameters: serde_json::Value) -> HookDescriptor {
        HookDescriptor {
            name: name.to_string(),
            parameters,
        }
    }

    #[test]
    fn pre_bundle_resolves_builtin_noop() {
        let registry = HookRegistry::new();
        register_builtin(&registry).unwrap();
        let bundle = registry
            .pre_bundle(&descriptor("noop", serde_json::Value::Null))
            .unwrap();
        assert_eq!(bundle.name, "noop");
        assert_matches!(bundle.params, HookParams::None);
    }

    #[test]
    fn unknown_name_is_registry_error() {
        let registry = HookRegistry::new();
        let err = match registry.pre_bundle(&descriptor("missing", serde_json::Value::Null)) {
            Ok(_) => panic!("expected an unknown-hook error"),
            Err(err) => err,
        };
        assert_matches!(err, BundleError::Registry(RegistryError::UnknownHook { .. }));
    }

    #[test]
    fn bad_parameters_carry_hook_name() {
        let registry = HookRegistry::new();
        register_builtin(&registry).unwrap();
        let err = match registry.post_bundle(&descriptor("artifact-upload", json!({ "region": "" }))) {
            Ok(_) => panic!("expected a parameters error"),
            Err(err) => err,
        };
        assert_matches!(err, BundleError::Parameters { name, .. } if name == "artifact-upload");
    }

    #[test]
    fn integration_bundle_runs_setup() {
        let registry = HookRegistry::new();
        register_builtin(&registry).unwrap();
        let bundle = registry
            .integration_bundle(&descriptor(
                "commit-status",
                json!({
                    "owner": "acme",
                    "repository": "widgets",
                    "token": "t0ken"
                }),
            ))
            .unwrap();
        assert_eq!(bundle.name, "commit-status");
        assert_matches!(bundle.params, HookParams::CommitStatus(_));
    }
}
