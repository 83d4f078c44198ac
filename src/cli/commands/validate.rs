//! Validate config command implementation

use crate::config::{resolve_config, BackendTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        let config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Backend: {}", config.backend.target);
        match config.backend.target {
            BackendTarget::Supabase => {
                println!("  URL: {}", config.backend.url);
                println!("  Anon Key: ********");
                println!("  Timeout: {}s", config.backend.timeout_seconds);
                println!("  Max Retries: {}", config.backend.retry.max_retries);
            }
            BackendTarget::Memory => {
                println!(
                    "  Data File: {}",
                    config.backend.data_path.as_deref().unwrap_or("(in process)")
                );
            }
        }
        println!("  Session File: {}", config.session.path);
        println!("  Professions: {}", config.catalog.professions.len());
        println!(
            "  Document Categories: {}",
            config.catalog.document_categories.join(", ")
        );
        println!();
        Ok(0)
    }
}
