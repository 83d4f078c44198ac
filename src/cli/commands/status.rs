//! Status command implementation
//!
//! Shows where the shell would route the stored session.

use super::runtime::{report, Runtime};
use crate::core::session::SessionState;
use crate::core::shell::{ShellHeader, ShellView};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking session status");

        println!("📊 Session Status");
        println!();

        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let mut manager = runtime.session_manager();
        if let Err(e) = manager.establish().await {
            return Ok(report("Failed to restore session", &e));
        }

        let state = manager.state();
        println!("  Backend: {}", runtime.config.backend.target);
        println!("  View: {}", ShellView::route(state));

        match state {
            SessionState::Ready(ctx) => {
                let header = ShellHeader::new(ctx, &runtime.catalog);
                println!(
                    "  User: [{}] {} - {}",
                    header.initial, header.full_name, header.profession_label
                );
                println!("  E-mail: {}", ctx.user.email);
                println!("  Role: {}", ctx.profile.role);
                println!(
                    "  Session expires: {}",
                    ctx.session.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            SessionState::NeedsProfile { user } => {
                println!("  User: {} (profile not set up)", user.email);
            }
            SessionState::ProfileUnavailable { user, reason } => {
                println!("  User: {}", user.email);
                println!("  Profile error: {reason}");
            }
            SessionState::Loading | SessionState::SignedOut => {
                println!("  Not signed in. Run 'prontuario login'.");
            }
        }
        println!();
        Ok(0)
    }
}
