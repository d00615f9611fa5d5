use serde::Deserialize;

use crate::error::ConfigError;

/// Nesting depth allowed when no limit is configured explicitly.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Engine configuration.
///
/// Deserializes from any serde format, so it can be embedded in a host
/// application's config. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecodeConfig {
    /// Maximum number of nested fields/elements below the destination root.
    /// `None` (`null`) disables the guard; deep inputs then recurse until the
    /// call stack is exhausted.
    pub max_depth: Option<usize>,
}

impl Default for RecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl RecodeConfig {
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}
