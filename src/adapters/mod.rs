//! External system integrations for Prontuario.
//!
//! - [`backend`] - hosted auth and table service (Supabase-compatible), plus
//!   an in-process stand-in
//!
//! # Design Pattern
//!
//! Adapters isolate the HTTP client behind traits so the views can be
//! exercised against [`backend::MemoryBackend`] without a network.
//!
//! ```rust,no_run
//! use prontuario::adapters::backend::create_backend;
//! use prontuario::config::{secret_string, BackendConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackendConfig {
//!     url: "https://xyzcompany.supabase.co".to_string(),
//!     anon_key: Some(secret_string("public-anon-key".to_string())),
//!     ..Default::default()
//! };
//!
//! let backend = create_backend(&config)?;
//! # let _ = backend;
//! # Ok(())
//! # }
//! ```

pub mod backend;
