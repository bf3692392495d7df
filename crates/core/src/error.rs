//! Error types for the RAG pipe.
//!
//! A single error enum covers configuration, transport, protocol and
//! event-sink failures. Query failures display as the bare failure
//! description so the pipe can prefix them for the host.

use thiserror::Error;

/// Unified error type for ragpipe.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The RAG server could not be reached (connect, DNS, timeout)
    #[error("{0}")]
    Transport(String),

    /// The RAG server answered with a non-200 status
    #[error("Error: {status} - {body}")]
    Status { status: u16, body: String },

    /// The RAG server answered 200 with an unusable body
    #[error("{0}")]
    Protocol(String),

    /// The host event sink rejected a status event
    #[error("Event emitter error: {0}")]
    Emitter(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
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
