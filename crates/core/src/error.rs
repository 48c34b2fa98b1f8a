//! Error types for the rulebook assistant.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! embedding, vector store, prompt, LLM and evaluation failures.

use thiserror::Error;

/// Unified error type for the rulebook assistant.
///
/// All fallible library functions return `Result<T, AppError>`. The CLI
/// reports every variant the same way; other callers can branch on
/// [`AppError::reason_code`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store errors (open, read, write, search)
    #[error("Store error: {0}")]
    Store(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Answer evaluation errors
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Stable, machine-readable code for the failure category.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Embedding(_) => "embedding",
            AppError::Store(_) => "store",
            AppError::Prompt(_) => "prompt",
            AppError::Llm(_) => "llm",
            AppError::Evaluation(_) => "evaluation",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
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
