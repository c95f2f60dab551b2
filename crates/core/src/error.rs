//! Error types for NSS Search.
//!
//! A single error enum covers every failure category in the workspace:
//! configuration, I/O, model calls, embeddings, store access, prompts and
//! invalid user input.

use thiserror::Error;

/// Unified error type for NSS Search.
///
/// All fallible functions return `Result<T, AppError>`. Recoverable
/// degradations (intent fallback, unresolved latest year, empty retrieval)
/// are handled locally and never reach this type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generative model errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector/metadata store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected user input (e.g. a blank question)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether the error was caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidQuery(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::InvalidQuery("blank".to_string()).is_client_error());
        assert!(!AppError::Store("down".to_string()).is_client_error());
        assert!(!AppError::Llm("timeout".to_string()).is_client_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }
}
