//! Errors raised inside the simulation core and its collaborators.

use serde::Serialize;
use thiserror::Error;

/// Failure of a core operation or collaborator call.
///
/// `DashboardService` turns these into outcome values; they never reach
/// presentation as errors.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum QCommError {
    /// A session or entity id that is not tracked
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A diagnostic, verifier, analyzer or translator call was rejected
    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    #[error("IO error: {message}")]
    Io { message: String },

    /// Config file could not be parsed or rendered
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Config values the state machines cannot honor
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QCommError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn generation_failure(message: impl Into<String>) -> Self {
        Self::GenerationFailure(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn serialization(format: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::GenerationFailure(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for QCommError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QCommError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err)
    }
}

impl From<toml::de::Error> for QCommError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<toml::ser::Error> for QCommError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

/// Collaborators written against anyhow report as generation failures.
impl From<anyhow::Error> for QCommError {
    fn from(err: anyhow::Error) -> Self {
        Self::GenerationFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QCommError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = QCommError::not_found("Session", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: Session 'abc'");
    }

    #[test]
    fn test_anyhow_becomes_generation_failure() {
        let err: QCommError = anyhow::anyhow!("oracle offline").into();
        assert!(err.is_generation_failure());
        assert!(err.to_string().contains("oracle offline"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: QCommError = parse.unwrap_err().into();
        assert!(matches!(err, QCommError::Serialization { ref format, .. } if format == "TOML"));
    }
}
