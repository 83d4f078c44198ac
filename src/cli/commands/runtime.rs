//! Shared setup for commands that talk to the backend
//!
//! Loads configuration, builds the backend and restores the session. Each
//! step prints its own failure and yields the exit code to return.

use crate::adapters::backend::{create_backend, Backend};
use crate::config::{resolve_config, ProntuarioConfig};
use crate::core::catalog::Catalog;
use crate::core::session::{SessionManager, SessionState, SessionStore};
use crate::core::shell::ShellView;
use crate::core::workspace::Workspace;
use crate::domain::ProntuarioError;

/// Configuration, backend and catalog of one command run
pub struct Runtime {
    pub config: ProntuarioConfig,
    pub backend: Backend,
    pub catalog: Catalog,
}

impl Runtime {
    /// Loads configuration and builds the backend
    ///
    /// Returns the exit code on failure.
    pub fn load(config_path: &str) -> Result<Self, i32> {
        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Err(2);
            }
        };

        let backend = match create_backend(&config.backend) {
            Ok(b) => b,
            Err(e) => return Err(report("Failed to create backend client", &e)),
        };

        let catalog = Catalog::from_config(&config.catalog);
        Ok(Self {
            config,
            backend,
            catalog,
        })
    }

    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(&self.backend, SessionStore::new(&self.config.session.path))
    }

    /// Restores the session and opens the workspace
    ///
    /// Returns the exit code if the shell does not route to the workspace.
    pub async fn workspace(&self) -> Result<Workspace, i32> {
        let mut manager = self.session_manager();
        if let Err(e) = manager.establish().await {
            return Err(report("Failed to restore session", &e));
        }

        let view = ShellView::route(manager.state());
        if !view.allows_patient_fetch() {
            return Err(explain_route(manager.state()));
        }

        let ctx = manager.into_context().map_err(|e| e.exit_code())?;
        let mut workspace = Workspace::new(ctx, self.backend.store.clone(), self.catalog.clone());
        if let Err(e) = workspace.open().await {
            return Err(report("Failed to load patients", &e));
        }
        Ok(workspace)
    }
}

/// Prints an error and returns its exit code
pub fn report(action: &str, error: &ProntuarioError) -> i32 {
    println!("❌ {action}");
    println!("   Error: {error}");
    error.exit_code()
}

/// Tells the user why the workspace is not available
fn explain_route(state: &SessionState) -> i32 {
    match state {
        SessionState::NeedsProfile { user } => {
            println!("⚠️  Signed in as {} but no profile exists yet", user.email);
            println!("   Run 'prontuario profile setup' first");
            3
        }
        SessionState::ProfileUnavailable { reason, .. } => {
            println!("❌ Profile could not be loaded");
            println!("   Error: {reason}");
            4
        }
        _ => {
            println!("🔒 Not signed in");
            println!("   Run 'prontuario login' first");
            3
        }
    }
}
