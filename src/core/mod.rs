//! Core application logic for Prontuario.
//!
//! # Modules
//!
//! - [`session`] - sign-in, session restore and the profile lookup
//! - [`shell`] - top-level routing on the session state
//! - [`roster`] - patient list, search and creation
//! - [`evolutions`] - progress notes of the active patient
//! - [`documents`] - per-category document panels and templates
//! - [`profile_setup`] - first-time profile form
//! - [`workspace`] - the views of one signed-in clinician
//! - [`catalog`] - profession, category and template vocabularies
//!
//! # Flow
//!
//! 1. **Establish**: restore the stored session and fetch the profile
//! 2. **Route**: the shell picks sign-in, profile setup or the workspace
//! 3. **Open**: the workspace loads the roster once
//! 4. **Select**: choosing a patient loads its evolutions and documents
//!    concurrently; a late response for a previous patient is discarded
//!
//! # Example
//!
//! ```rust,no_run
//! use prontuario::adapters::backend::create_backend;
//! use prontuario::config::resolve_config;
//! use prontuario::core::catalog::Catalog;
//! use prontuario::core::session::{SessionManager, SessionStore};
//! use prontuario::core::shell::ShellView;
//! use prontuario::core::workspace::Workspace;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = resolve_config("prontuario.toml")?;
//! let backend = create_backend(&config.backend)?;
//!
//! let mut session = SessionManager::new(&backend, SessionStore::new(&config.session.path));
//! session.establish().await?;
//!
//! if ShellView::route(session.state()) == ShellView::Workspace {
//!     let ctx = session.into_context()?;
//!     let mut workspace =
//!         Workspace::new(ctx, backend.store.clone(), Catalog::from_config(&config.catalog));
//!     workspace.open().await?;
//!     println!("{} patients", workspace.roster().patients().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod documents;
pub mod evolutions;
pub mod profile_setup;
pub mod refresh;
pub mod roster;
pub mod session;
pub mod shell;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
