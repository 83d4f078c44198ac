//! Domain error types
//!
//! This module defines the error hierarchy for Prontuario.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Prontuario error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ProntuarioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication errors (bad credentials, expired session)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Form validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation needed a signed-in user with a profile
    #[error("Not signed in")]
    NotSignedIn,

    /// An operation needed an active patient
    #[error("No patient selected")]
    NoActivePatient,

    /// Session persistence errors
    #[error("Session error: {0}")]
    Session(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Remote backend errors
///
/// Errors that occur when talking to the hosted auth and data services.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Failed to reach the service
    #[error("Failed to connect to backend: {0}")]
    ConnectionFailed(String),

    /// Missing or rejected credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Row-level policy rejected the request (403)
    #[error("Forbidden by row-level policy: {0}")]
    Forbidden(String),

    /// Row or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting write (409), e.g. duplicate key
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Whether retrying the same idempotent request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::ConnectionFailed(_)
                | BackendError::Timeout(_)
                | BackendError::ServerError { .. }
        )
    }
}

impl ProntuarioError {
    /// Process exit code for this error, used by the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            ProntuarioError::Configuration(_) => 2,
            ProntuarioError::Authentication(_) | ProntuarioError::NotSignedIn => 3,
            ProntuarioError::Backend(BackendError::Unauthorized(_)) => 3,
            ProntuarioError::Backend(_) => 4,
            ProntuarioError::Validation(_) | ProntuarioError::NoActivePatient => 1,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ProntuarioError {
    fn from(err: std::io::Error) -> Self {
        ProntuarioError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ProntuarioError {
    fn from(err: serde_json::Error) -> Self {
        ProntuarioError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ProntuarioError {
    fn from(err: toml::de::Error) -> Self {
        ProntuarioError::Configuration(format!("TOML parse error: {err}"))
    }
}
