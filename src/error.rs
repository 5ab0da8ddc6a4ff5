// Typed errors with thiserror. Surface meaningful messages to JS.
// Configuration is clamped wherever possible; these cover what cannot be.

use thiserror::Error;

/// Effect error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EffectError {
    pub(crate) fn color(input: &str, reason: impl Into<String>) -> Self {
        EffectError::InvalidColor {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EffectError {
    fn from(err: serde_json::Error) -> Self {
        EffectError::Serialization(err.to_string())
    }
}
