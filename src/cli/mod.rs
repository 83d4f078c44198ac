//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Prontuario using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Prontuario - multi-professional clinical records
#[derive(Parser, Debug)]
#[command(name = "prontuario")]
#[command(version, about, long_about = None)]
#[command(author = "Prontuario Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "prontuario.toml", env = "PRONTUARIO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PRONTUARIO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Sign in with e-mail and password
    Login(commands::auth::LoginArgs),

    /// Create an account
    Signup(commands::auth::SignupArgs),

    /// Sign out and forget the stored session
    Logout(commands::auth::LogoutArgs),

    /// Show the session and where it routes
    Status(commands::status::StatusArgs),

    /// Manage the profile of the signed-in user
    Profile(commands::profile::ProfileArgs),

    /// Patient roster
    Patients(commands::patients::PatientsArgs),

    /// Clinical evolutions of a patient
    Evolutions(commands::evolutions::EvolutionsArgs),

    /// Documents of a patient and document templates
    Documents(commands::documents::DocumentsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::documents::DocumentsCommand;
    use commands::evolutions::EvolutionsCommand;
    use commands::patients::PatientsCommand;
    use commands::profile::ProfileCommand;

    const PATIENT: &str = "7d44b88c-4199-4bad-97dc-d78268e01398";

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["prontuario", "status"]);
        assert_eq!(cli.config, "prontuario.toml");
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["prontuario", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["prontuario", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::parse_from([
            "prontuario",
            "login",
            "--email",
            "ana@example.com",
            "--password",
            "secret",
        ]);
        match cli.command {
            Commands::Login(args) => {
                assert_eq!(args.email, "ana@example.com");
                assert_eq!(args.password.as_deref(), Some("secret"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_profile_setup_default_role() {
        let cli = Cli::parse_from([
            "prontuario",
            "profile",
            "setup",
            "--full-name",
            "Dra. Ana",
            "--profession",
            "medicina",
        ]);
        match cli.command {
            Commands::Profile(args) => match args.command {
                ProfileCommand::Setup { role, .. } => {
                    assert_eq!(role, crate::domain::Role::Professional)
                }
                other => panic!("unexpected subcommand: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "prontuario",
            "profile",
            "setup",
            "--full-name",
            "Ana",
            "--profession",
            "medicina",
            "--role",
            "owner",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_patients_list_search() {
        let cli = Cli::parse_from(["prontuario", "patients", "list", "--search", "ana"]);
        match cli.command {
            Commands::Patients(args) => {
                assert!(matches!(args.command, PatientsCommand::List { search } if search == "ana"))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_evolution_date() {
        let cli = Cli::parse_from([
            "prontuario",
            "evolutions",
            "add",
            "--patient",
            PATIENT,
            "--profession",
            "fisioterapia",
            "--date",
            "2024-03-01",
            "--content",
            "Gait training",
        ]);
        match cli.command {
            Commands::Evolutions(args) => match args.command {
                EvolutionsCommand::Add { patient, date, .. } => {
                    assert_eq!(patient.to_string(), PATIENT);
                    assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 3, 1));
                }
                other => panic!("unexpected subcommand: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_patient_id() {
        let result =
            Cli::try_parse_from(["prontuario", "documents", "list", "--patient", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_documents_add_type_flag() {
        let cli = Cli::parse_from([
            "prontuario",
            "documents",
            "add",
            "--patient",
            PATIENT,
            "--name",
            "Laudo",
            "--type",
            "pdf",
            "--category",
            "Médico",
            "--file-url",
            "https://files.example.com/laudo.pdf",
        ]);
        match cli.command {
            Commands::Documents(args) => match args.command {
                DocumentsCommand::Add { doc_type, .. } => assert_eq!(doc_type, "pdf"),
                other => panic!("unexpected subcommand: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["prontuario", "init", "--memory"]);
        assert!(matches!(cli.command, Commands::Init(args) if args.memory));
    }
}
