//! Error types for docqa.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! generation, retrieval, prompt, agent, and lookup failures.

use thiserror::Error;

/// Unified error type for docqa.
///
/// Every fallible function in the workspace returns `Result<T, AppError>`.
/// Failures from the search or completion services are propagated as-is;
/// nothing in this layer retries or synthesizes a fallback answer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion generator errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search service errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Agent output that matches neither a final answer nor a tool action
    #[error("Agent error: {0}")]
    Agent(String),

    /// Lookup table loading errors (a missing key is not an error)
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
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
    fn test_error_display() {
        let err = AppError::Retrieval("index not found".to_string());
        assert_eq!(err.to_string(), "Retrieval error: index not found");

        let err = AppError::Agent("unknown tool".to_string());
        assert_eq!(err.to_string(), "Agent error: unknown tool");
    }

    #[test]
    fn test_from_serde_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
