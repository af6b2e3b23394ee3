//! Client configuration surface.
//!
//! The daemon is driven by a single JSON config file (the equivalent of
//! the CLI flag set): where the execution server lives, which job
//! templates to dispatch, whether to wait for completion, and the
//! ordered hook descriptor lists. Configuration errors are fatal at
//! startup -- the process must not begin consuming events with a bad
//! config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default step label targeted by the structural rewrite.
pub const DEFAULT_CHECKOUT_LABEL: &str = "checkout";

/// Default poll interval for wait mode, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// TemplateFormat
// ---------------------------------------------------------------------------

/// Input format of the job templates on disk.
///
/// Regardless of the input format, rendered descriptors are always
/// submitted to the server as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl TemplateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HookDescriptor
// ---------------------------------------------------------------------------

/// Declarative, user-supplied reference to a hook plus its raw
/// parameters. Immutable after config load; the registry turns it into
/// a live, parameter-validated hook instance per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDescriptor {
    pub name: String,
    /// Raw parameters, interpreted by the named hook's
    /// `validate_parameters`.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl HookDescriptor {
    /// Sanity check performed at config load: the name must not be
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hook name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the dispatch pipeline needs to know, loaded once at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Execution server base URL, e.g. `http://localhost:8080`.
    pub server_addr: String,

    /// Identifier of the requestor of every API call.
    pub requestor: String,

    /// Directory containing the job template files.
    pub template_dir: PathBuf,

    /// Template filenames (relative to `template_dir`), dispatched in
    /// order for every event.
    pub job_templates: Vec<String>,

    /// Input format of the templates.
    #[serde(default = "default_format")]
    pub format: TemplateFormat,

    /// Wait for each submitted job to reach a terminal state before
    /// running post-hooks.
    #[serde(default)]
    pub wait: bool,

    /// Poll interval for wait mode, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Step label rewritten with event data by the renderer.
    #[serde(default = "default_checkout_label")]
    pub checkout_label: String,

    /// Pre-hooks, run in order before any submission.
    #[serde(default)]
    pub pre_hooks: Vec<HookDescriptor>,

    /// Post-hooks, run in order over the full run-record set.
    #[serde(default)]
    pub post_hooks: Vec<HookDescriptor>,

    /// Integration hooks, set up per cycle with before/after phases.
    #[serde(default)]
    pub integration_hooks: Vec<HookDescriptor>,
}

fn default_format() -> TemplateFormat {
    TemplateFormat::Json
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_checkout_label() -> String {
    DEFAULT_CHECKOUT_LABEL.to_string()
}

impl ClientConfig {
    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_addr.is_empty() {
            return Err(ConfigError::Validation(
                "server_addr cannot be empty".to_string(),
            ));
        }
        if self.requestor.is_empty() {
            return Err(ConfigError::Validation(
                "requestor cannot be empty".to_string(),
            ));
        }
        if self.job_templates.is_empty() {
            return Err(ConfigError::Validation(
                "at least one job template is required".to_string(),
            ));
        }
        if self.job_templates.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "job template filenames cannot be empty".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be positive".to_string(),
            ));
        }
        if self.checkout_label.is_empty() {
            return Err(ConfigError::Validation(
                "checkout_label cannot be empty".to_string(),
            ));
        }
        for hook in self
            .pre_hooks
            .iter()
            .chain(self.post_hooks.iter())
            .chain(self.integration_hooks.iter())
        {
            hook.validate()?;
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
