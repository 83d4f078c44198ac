//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackendTarget, ProntuarioConfig};
use super::secret::secret_string;
use crate::domain::errors::ProntuarioError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ProntuarioConfig
/// 4. Applies environment variable overrides (PRONTUARIO_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, the TOML is
/// malformed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use prontuario::config::loader::load_config;
///
/// let config = load_config("prontuario.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ProntuarioConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ProntuarioError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ProntuarioError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ProntuarioConfig = toml::from_str(&contents)
        .map_err(|e| ProntuarioError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

/// Resolves configuration for a command run
///
/// Uses the file at `path` when it exists; otherwise starts from defaults and
/// relies on environment variables alone. Either way the result is validated,
/// so a missing backend URL or key is reported here, before anything else runs.
pub fn resolve_config(path: impl AsRef<Path>) -> Result<ProntuarioConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using environment only"
    );

    let mut config = ProntuarioConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ProntuarioConfig) -> Result<()> {
    config.validate().map_err(|e| {
        ProntuarioError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ProntuarioError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ProntuarioError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// First set variable among `names`
fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// Applies environment variable overrides using the PRONTUARIO_* prefix
///
/// Variables follow the pattern PRONTUARIO_<SECTION>_<KEY>. The backend URL
/// and key also accept the conventional SUPABASE_URL / SUPABASE_ANON_KEY.
fn apply_env_overrides(config: &mut ProntuarioConfig) -> Result<()> {
    if let Ok(val) = std::env::var("PRONTUARIO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("PRONTUARIO_BACKEND_TARGET") {
        config.backend.target = match val.to_lowercase().as_str() {
            "supabase" => BackendTarget::Supabase,
            "memory" => BackendTarget::Memory,
            other => {
                return Err(ProntuarioError::Configuration(format!(
                    "Invalid PRONTUARIO_BACKEND_TARGET '{other}'. Must be one of: supabase, memory"
                )))
            }
        };
    }
    if let Some(val) = first_env(&["PRONTUARIO_BACKEND_URL", "SUPABASE_URL"]) {
        config.backend.url = val;
    }
    if let Some(val) = first_env(&["PRONTUARIO_BACKEND_ANON_KEY", "SUPABASE_ANON_KEY"]) {
        config.backend.anon_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("PRONTUARIO_BACKEND_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.backend.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("PRONTUARIO_BACKEND_TLS_VERIFY") {
        config.backend.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("PRONTUARIO_BACKEND_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.backend.retry.max_retries = retries;
        }
    }

    if let Ok(val) = std::env::var("PRONTUARIO_BACKEND_DATA_PATH") {
        config.backend.data_path = Some(val);
    }

    if let Ok(val) = std::env::var("PRONTUARIO_SESSION_PATH") {
        config.session.path = val;
    }

    if let Ok(val) = std::env::var("PRONTUARIO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PRONTUARIO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
