//! Engine configuration.
//!
//! [`EngineConfig`] collects the few behavioral switches the engine has. It
//! deserializes from YAML or JSON; every field is optional and unknown
//! fields are rejected so typos surface early.
//!
//! ```yaml
//! conflict_policy: overwrite   # strict | overwrite
//! tag_errors: propagate        # placeholder | propagate
//! error_indicator: "(!)"
//! max_depth: 16
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::ConflictPolicy;

/// Nesting depth beyond which tags are emitted as source text.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Marker written before the placeholder of a failed tag.
pub const DEFAULT_ERROR_INDICATOR: &str = "(!?)";

/// What the engine does when a tag function returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagErrorPolicy {
    /// Write `<indicator> {name:argument}` in place of the tag and continue.
    #[default]
    Placeholder,
    /// Abort the render with [`RenderError::Tag`](crate::RenderError::Tag).
    Propagate,
}

/// Behavioral settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Policy for the engine's tag registry.
    pub conflict_policy: ConflictPolicy,
    /// Handling of failing tag functions.
    pub tag_errors: TagErrorPolicy,
    /// Prefix for failed-tag placeholders.
    pub error_indicator: String,
    /// Deepest nesting level that is still evaluated. Top-level tags are at
    /// depth 1. Values above [`MAX_NESTING`](curlytag_lexer::MAX_NESTING)
    /// act as that limit.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            tag_errors: TagErrorPolicy::default(),
            error_indicator: DEFAULT_ERROR_INDICATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Sets the registry conflict policy.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Sets the tag error policy.
    pub fn tag_errors(mut self, policy: TagErrorPolicy) -> Self {
        self.tag_errors = policy;
        self
    }

    /// Sets the failed-tag indicator.
    pub fn error_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.error_indicator = indicator.into();
        self
    }

    /// Sets the maximum evaluated nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file, choosing the format from its extension
    /// (`.yaml`, `.yml` or `.json`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        parse(&content)
    }
}

/// Failure to load an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or schema error.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or schema error.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not a known config format.
    #[error("unsupported config format {path:?}: expected .yaml, .yml or .json")]
    UnsupportedFormat { path: PathBuf },
}
