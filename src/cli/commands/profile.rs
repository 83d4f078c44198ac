//! Profile commands

use super::runtime::{report, Runtime};
use crate::core::profile_setup::ProfileSetupForm;
use crate::core::session::SessionState;
use crate::core::shell::ShellHeader;
use crate::domain::Role;
use clap::{Args, Subcommand};

/// Arguments for the profile command
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Create or update the profile of the signed-in user
    Setup {
        /// Full display name
        #[arg(long)]
        full_name: String,

        /// Profession value (e.g. medicina, fisioterapia)
        #[arg(long)]
        profession: String,

        /// Application role
        #[arg(long, default_value = "professional")]
        role: Role,
    },

    /// Show the profile of the signed-in user
    Show,
}

impl ProfileArgs {
    /// Execute the profile command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let mut manager = runtime.session_manager();
        if let Err(e) = manager.establish().await {
            return Ok(report("Failed to restore session", &e));
        }

        match &self.command {
            ProfileCommand::Setup {
                full_name,
                profession,
                role,
            } => {
                let form = ProfileSetupForm::new(full_name.as_str(), profession.as_str())
                    .with_role(*role);
                match manager.setup_profile(&form, &runtime.catalog).await {
                    Ok(SessionState::Ready(ctx)) => {
                        let header = ShellHeader::new(ctx, &runtime.catalog);
                        println!(
                            "✅ Profile saved: {} - {}",
                            header.full_name, header.profession_label
                        );
                        Ok(0)
                    }
                    Ok(SessionState::ProfileUnavailable { reason, .. }) => {
                        println!("⚠️  Profile saved but could not be reloaded: {reason}");
                        Ok(4)
                    }
                    Ok(_) => {
                        println!("⚠️  Profile saved but not visible yet");
                        Ok(4)
                    }
                    Err(e) => {
                        if matches!(e, crate::domain::ProntuarioError::Validation(_)) {
                            print_professions(&runtime);
                        }
                        Ok(report("Failed to save profile", &e))
                    }
                }
            }
            ProfileCommand::Show => match manager.state() {
                SessionState::Ready(ctx) => {
                    let header = ShellHeader::new(ctx, &runtime.catalog);
                    println!("👤 {} [{}]", header.full_name, header.initial);
                    println!("  E-mail: {}", ctx.profile.email);
                    println!("  Profession: {}", header.profession_label);
                    println!("  Role: {}", ctx.profile.role);
                    println!(
                        "  Member since: {}",
                        ctx.profile.created_at.format("%Y-%m-%d")
                    );
                    Ok(0)
                }
                SessionState::NeedsProfile { user } => {
                    println!("⚠️  No profile for {} yet", user.email);
                    println!("   Run 'prontuario profile setup --full-name ... --profession ...'");
                    print_professions(&runtime);
                    Ok(1)
                }
                SessionState::ProfileUnavailable { reason, .. } => {
                    println!("❌ Profile could not be loaded");
                    println!("   Error: {reason}");
                    Ok(4)
                }
                SessionState::Loading | SessionState::SignedOut => {
                    println!("🔒 Not signed in");
                    Ok(3)
                }
            },
        }
    }
}

fn print_professions(runtime: &Runtime) {
    println!("   Professions:");
    for entry in runtime.catalog.professions() {
        println!("     {:<22} {}", entry.value, entry.label);
    }
}
