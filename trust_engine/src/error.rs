//! Typed errors surfaced by the engine.

use bleed_rules::RulesError;
use serde::Serialize;
use thiserror::Error;

/// Every way a `handle_action` call can be rejected.
///
/// None of these are retried internally: the pipeline is a pure in-memory
/// computation with no transient failure mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid action '{action}'")]
    InvalidAction { action: String },

    #[error("invalid context tag '{tag}'")]
    InvalidContextTag { tag: String },

    #[error("unknown character '{character}'")]
    UnknownCharacter { character: String },

    #[error("session '{session_id}' not found")]
    SessionNotFound { session_id: String },

    #[error("session '{session_id}' belongs to '{expected}', not '{actual}'")]
    CharacterMismatch {
        session_id: String,
        expected: String,
        actual: String,
    },

    #[error("no tactics configured for '{character}' at level {level}")]
    NoTacticsAvailable { character: String, level: u8 },

    #[error("invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    #[error("session '{session_id}' was poisoned by a failed writer")]
    SessionPoisoned { session_id: String },
}

impl EngineError {
    pub(crate) fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Content/configuration bugs, as opposed to caller mistakes. These
    /// should fail loudly rather than be shown to the player.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownCharacter { .. } | EngineError::NoTacticsAvailable { .. }
        )
    }

    /// Stable machine-readable name of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidAction { .. } => "InvalidAction",
            EngineError::InvalidContextTag { .. } => "InvalidContextTag",
            EngineError::UnknownCharacter { .. } => "UnknownCharacter",
            EngineError::SessionNotFound { .. } => "SessionNotFound",
            EngineError::CharacterMismatch { .. } => "CharacterMismatch",
            EngineError::NoTacticsAvailable { .. } => "NoTacticsAvailable",
            EngineError::InvalidRequest { .. } => "InvalidRequest",
            EngineError::SessionPoisoned { .. } => "SessionPoisoned",
        }
    }

    /// Wire representation for JSON transports.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<RulesError> for EngineError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::UnknownAction(action) => EngineError::InvalidAction { action },
            RulesError::UnknownContextTag(tag) => EngineError::InvalidContextTag { tag },
            other => EngineError::invalid_request("rules", other.to_string()),
        }
    }
}

/// JSON error object.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}
