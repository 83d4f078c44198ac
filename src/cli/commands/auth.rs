//! Login, signup and logout commands

use super::runtime::{report, Runtime};
use crate::config::{secret_string, SecretString};
use crate::core::session::{SessionState, SignUpStatus};
use clap::Args;
use std::io::{self, BufRead, Write};

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account e-mail
    #[arg(short, long)]
    pub email: String,

    /// Password; read from stdin when omitted
    #[arg(long, env = "PRONTUARIO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    /// Execute the login command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(email = %self.email, "Signing in");

        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let password = read_password(self.password.as_deref())?;

        let mut manager = runtime.session_manager();
        match manager.sign_in(&self.email, &password).await {
            Ok(state) => Ok(describe_signed_in(state)),
            Err(e) => Ok(report("Sign-in failed", &e)),
        }
    }
}

/// Arguments for the signup command
#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Account e-mail
    #[arg(short, long)]
    pub email: String,

    /// Password; read from stdin when omitted
    #[arg(long, env = "PRONTUARIO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl SignupArgs {
    /// Execute the signup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(email = %self.email, "Creating account");

        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let password = read_password(self.password.as_deref())?;

        let mut manager = runtime.session_manager();
        match manager.sign_up(&self.email, &password).await {
            Ok(SignUpStatus::Active) => Ok(describe_signed_in(manager.state())),
            Ok(SignUpStatus::AwaitingConfirmation { email }) => {
                println!("📧 Account created for {email}");
                println!("   Confirm the e-mail address, then run 'prontuario login'");
                Ok(0)
            }
            Err(e) => Ok(report("Sign-up failed", &e)),
        }
    }
}

/// Arguments for the logout command
#[derive(Args, Debug)]
pub struct LogoutArgs {}

impl LogoutArgs {
    /// Execute the logout command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runtime = match Runtime::load(config_path) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let mut manager = runtime.session_manager();
        match manager.sign_out().await {
            Ok(()) => {
                println!("👋 Signed out");
                Ok(0)
            }
            Err(e) => Ok(report("Sign-out failed", &e)),
        }
    }
}

fn describe_signed_in(state: &SessionState) -> i32 {
    match state {
        SessionState::Ready(ctx) => {
            println!("✅ Signed in as {} ({})", ctx.profile.full_name, ctx.user.email);
            0
        }
        SessionState::NeedsProfile { user } => {
            println!("✅ Signed in as {}", user.email);
            println!("   Complete your profile: prontuario profile setup --full-name ... --profession ...");
            0
        }
        SessionState::ProfileUnavailable { user, reason } => {
            println!("✅ Signed in as {}", user.email);
            println!("⚠️  Profile could not be loaded: {reason}");
            4
        }
        SessionState::Loading | SessionState::SignedOut => {
            println!("❌ Not signed in");
            3
        }
    }
}

/// Uses the given password or reads one line from stdin
fn read_password(given: Option<&str>) -> anyhow::Result<SecretString> {
    if let Some(password) = given {
        return Ok(secret_string(password.to_string()));
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(secret_string(line.trim_end_matches(['\r', '\n']).to_string()))
}
