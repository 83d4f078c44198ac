//! Configuration management for Prontuario.
//!
//! # Overview
//!
//! Configuration comes from an optional TOML file plus environment variables:
//! - `${VAR_NAME}` substitution inside the file
//! - `PRONTUARIO_<SECTION>_<KEY>` overrides (and `SUPABASE_URL` /
//!   `SUPABASE_ANON_KEY` for the two connection values)
//! - Defaults for every optional setting
//! - Validation on load; a missing backend URL or key stops the program
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`BackendConfig`] - remote service target, URL, public key, retries
//! - [`SessionConfig`] - where the signed-in session is kept
//! - [`CatalogConfig`] - professions, document categories, template names
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! url = "https://xyzcompany.supabase.co"
//! anon_key = "${SUPABASE_ANON_KEY}"
//!
//! [catalog]
//! document_categories = ["Médico", "Geral"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, resolve_config};
pub use schema::{
    ApplicationConfig, BackendConfig, BackendTarget, CatalogConfig, Environment, LoggingConfig,
    ProfessionEntry, ProntuarioConfig, RetryConfig, SessionConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
