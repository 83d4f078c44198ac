// Prontuario - Multi-professional Clinical Records
// Copyright (c) 2025 Prontuario Contributors
// Licensed under the MIT License

use prontuario::cli::{Cli, Commands};
use prontuario::config::{resolve_config, LoggingConfig};
use prontuario::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it loads; commands report
    // configuration errors themselves
    let resolved = resolve_config(&cli.config).ok();
    let logging_config = resolved
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| resolved.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "warn".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Prontuario - Multi-professional Clinical Records"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Login(args) => args.execute(&cli.config).await,
        Commands::Signup(args) => args.execute(&cli.config).await,
        Commands::Logout(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Profile(args) => args.execute(&cli.config).await,
        Commands::Patients(args) => args.execute(&cli.config).await,
        Commands::Evolutions(args) => args.execute(&cli.config).await,
        Commands::Documents(args) => args.execute(&cli.config).await,
    }
}
