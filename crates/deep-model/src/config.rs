use deep_model_util::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Tunables shared by every model built with the same options.
///
/// Missing fields fall back to their defaults, so a partial document such as
/// `max_merge_depth = 5` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// How many levels of nested mappings the defaults merge descends into
    /// before assigning shallowly.
    pub max_merge_depth: usize,
    /// Prefix of generated client ids (`c1`, `c2`, ...).
    pub cid_prefix: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_merge_depth: DEFAULT_MAX_DEPTH,
            cid_prefix: "c".to_string(),
        }
    }
}

impl ModelConfig {
    /// Parse a config from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read a config from an already-parsed JSON value.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}
