//! CLI command implementations
//!
//! Each command returns the process exit code.

pub mod auth;
pub mod documents;
pub mod evolutions;
pub mod init;
pub mod patients;
pub mod profile;
pub mod runtime;
pub mod status;
pub mod validate;
