//! Errors raised while parsing vocabulary or loading a ruleset.

use thiserror::Error;

/// Rule book errors. Everything except the vocabulary parse variants is a
/// startup-time failure.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown context tag '{0}'")]
    UnknownContextTag(String),

    #[error("unknown tactic '{0}'")]
    UnknownTactic(String),

    #[error("sophistication level {0} is outside 1..=5")]
    InvalidLevel(u8),

    #[error("failed to read ruleset from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML ruleset")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON ruleset")]
    Json(#[from] serde_json::Error),

    #[error("invalid ruleset: {field} - {message}")]
    Invalid { field: String, message: String },
}

impl RulesError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        RulesError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
