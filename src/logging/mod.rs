//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels (`--log-level`, `RUST_LOG`)
//! - Console output on stderr
//! - Local JSON file logging with rotation
//!
//! Remote failures in the views are reported through these macros rather than
//! surfaced as UI messages, so the log is where a clinician's failed action
//! can be traced.
//!
//! # Example
//!
//! ```no_run
//! use prontuario::logging::init_logging;
//! use prontuario::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a failed remote call made on behalf of a view
///
/// # Example
///
/// ```no_run
/// use prontuario::log_remote_failure;
/// use prontuario::domain::{BackendError, ProntuarioError};
///
/// let error = ProntuarioError::Backend(BackendError::Timeout("30s".to_string()));
/// log_remote_failure!("load_patients", &error);
/// ```
#[macro_export]
macro_rules! log_remote_failure {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Remote operation failed"
        );
    };
}

/// Log a response that arrived after a newer load superseded it
///
/// # Example
///
/// ```no_run
/// use prontuario::log_stale_response;
///
/// log_stale_response!("evolutions", 3, 4);
/// ```
#[macro_export]
macro_rules! log_stale_response {
    ($view:expr, $ticket:expr, $current:expr) => {
        tracing::debug!(
            view = $view,
            ticket = $ticket,
            current = $current,
            "Discarding stale response"
        );
    };
}

/// Log a completed list load
///
/// # Example
///
/// ```no_run
/// use prontuario::log_rows_loaded;
///
/// log_rows_loaded!("patients", 12);
/// ```
#[macro_export]
macro_rules! log_rows_loaded {
    ($view:expr, $count:expr) => {
        tracing::debug!(view = $view, count = $count, "Rows loaded");
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use prontuario::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 1000u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after error"
        );
    };
}
