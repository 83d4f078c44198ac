//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "prontuario.toml")]
    pub output: String,

    /// Write a configuration for the local in-memory backend
    #[arg(long)]
    pub memory: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Prontuario configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let content = if self.memory {
            Self::memory_config()
        } else {
            Self::supabase_config()
        };

        match fs::write(&self.output, content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                if self.memory {
                    println!("  1. Create an account: prontuario signup --email you@example.com");
                } else {
                    println!("  1. Set SUPABASE_URL and SUPABASE_ANON_KEY (or use a .env file)");
                    println!("  2. Validate configuration: prontuario validate-config");
                    println!("  3. Sign in: prontuario login --email you@example.com");
                }
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    fn supabase_config() -> String {
        r#"# Prontuario configuration

environment = "development"  # development | staging | production

[application]
log_level = "info"

[backend]
target = "supabase"
url = "${SUPABASE_URL}"
anon_key = "${SUPABASE_ANON_KEY}"
timeout_seconds = 30
tls_verify = true

[backend.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 2.0

[session]
path = ".prontuario/session.json"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"

# Vocabularies default to the built-in lists; uncomment to override.
# [catalog]
# document_categories = ["Médico", "Fisioterapia", "Psicologia", "Enfermagem", "Nutrição", "Terapia Ocupacional", "Geral"]
"#
        .to_string()
    }

    fn memory_config() -> String {
        r#"# Prontuario configuration (local in-memory backend)

[application]
log_level = "info"

[backend]
target = "memory"
data_path = ".prontuario/data.json"

[session]
path = ".prontuario/session.json"
"#
        .to_string()
    }
}
