use thiserror::Error;

/// A rejection produced by [`ModelHooks::validate`](crate::ModelHooks::validate).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Human readable reason.
    pub message: String,
    /// Offending attribute path, when the rejection is about one attribute.
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

/// Errors returned by model construction and mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Attributes were given as something other than a mapping or `null`.
    #[error("attributes must be a mapping, got {0}")]
    NotAMapping(&'static str),
    /// The validation hook rejected the update; nothing was changed.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationError),
}

/// Errors raised while loading a [`ModelConfig`](crate::ModelConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML model config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON model config: {0}")]
    Json(#[from] serde_json::Error),
}
