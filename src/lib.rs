// Prontuario - Multi-professional Clinical Records
// Copyright (c) 2025 Prontuario Contributors
// Licensed under the MIT License

//! # Prontuario - Multi-professional Clinical Records
//!
//! Prontuario keeps patient demographics, dated clinical evolutions and
//! document metadata for a team of health professionals, on top of a hosted
//! Supabase-compatible backend (GoTrue auth + PostgREST tables).
//!
//! ## Overview
//!
//! This library provides:
//! - **Session handling**: sign-in, sign-up, persisted sessions with token
//!   refresh, and the profile-setup gate
//! - **Patient roster** with client-side search by name or CPF
//! - **Evolution log** per patient with a profession filter
//! - **Document browser** grouped by category, plus templates per profession
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Session state machine and the workspace views
//! - [`adapters`] - Backend clients (Supabase REST, in-memory)
//! - [`domain`] - Row models, ids and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prontuario::adapters::backend::create_backend;
//! use prontuario::config::resolve_config;
//! use prontuario::core::catalog::Catalog;
//! use prontuario::core::session::{SessionManager, SessionStore};
//! use prontuario::core::workspace::Workspace;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = resolve_config("prontuario.toml")?;
//! let backend = create_backend(&config.backend)?;
//!
//! let mut manager = SessionManager::new(&backend, SessionStore::new(&config.session.path));
//! manager.establish().await?;
//!
//! let ctx = manager.into_context()?;
//! let mut workspace = Workspace::new(ctx, backend.store.clone(), Catalog::from_config(&config.catalog));
//! workspace.open().await?;
//!
//! for patient in workspace.roster().filter("silva") {
//!     println!("{} ({})", patient.name, patient.cpf);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type
//! [`domain::ProntuarioError`] maps onto CLI exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
