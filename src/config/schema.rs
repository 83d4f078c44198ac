//! Configuration schema types
//!
//! This module defines the configuration structure for Prontuario. Every
//! section has defaults so the whole file is optional: a bare environment with
//! `PRONTUARIO_BACKEND_URL` and `PRONTUARIO_BACKEND_ANON_KEY` is enough.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Backend target selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendTarget {
    /// Hosted Supabase-compatible service (GoTrue + PostgREST)
    #[default]
    Supabase,
    /// In-process store, nothing leaves the machine
    Memory,
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendTarget::Supabase => write!(f, "supabase"),
            BackendTarget::Memory => write!(f, "memory"),
        }
    }
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Main Prontuario configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProntuarioConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Remote service connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// Profession, category and template vocabularies
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProntuarioConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.backend.validate(&self.environment)?;
        self.session.validate()?;
        self.catalog.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for idempotent reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 disables retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "backend.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err("backend.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "backend.retry.initial_delay_ms cannot exceed backend.retry.max_delay_ms"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Delay before the given retry (1-based), capped at `max_delay_ms`
    pub fn delay_for_attempt(&self, attempt: usize) -> u64 {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let delay = (self.initial_delay_ms as f64 * factor) as u64;
        delay.min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which backend to talk to
    #[serde(default)]
    pub target: BackendTarget,

    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Public (anon) API key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub anon_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Snapshot file for the `memory` target; kept in process only when unset
    #[serde(default)]
    pub data_path: Option<String>,
}

impl BackendConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.timeout_seconds == 0 {
            return Err("backend.timeout_seconds must be > 0".to_string());
        }
        self.retry.validate()?;

        if self.target == BackendTarget::Memory {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err(
                "backend.url is required (set PRONTUARIO_BACKEND_URL or backend.url)".to_string(),
            );
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| format!("backend.url '{}' is not a valid URL: {}", self.url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("backend.url must start with http:// or https://".to_string());
        }

        if self
            .anon_key
            .as_ref()
            .map(|k| k.expose_secret().is_empty())
            .unwrap_or(true)
        {
            return Err(
                "backend.anon_key is required (set PRONTUARIO_BACKEND_ANON_KEY or backend.anon_key)"
                    .to_string(),
            );
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            target: BackendTarget::default(),
            url: String::new(),
            anon_key: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            retry: RetryConfig::default(),
            data_path: None,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the signed-in session between CLI invocations
    #[serde(default = "default_session_path")]
    pub path: String,
}

impl SessionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("session.path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// One entry of the profession vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionEntry {
    /// Stored value (e.g. `fisioterapia`)
    pub value: String,
    /// Display label (e.g. `Fisioterapia`)
    pub label: String,
}

impl ProfessionEntry {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Vocabularies shown by the views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Professions offered in forms and filters, in display order
    #[serde(default = "default_professions")]
    pub professions: Vec<ProfessionEntry>,

    /// Document categories, in panel order
    #[serde(default = "default_document_categories")]
    pub document_categories: Vec<String>,

    /// Document name suggestions per profession value
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<String, Vec<String>>,
}

impl CatalogConfig {
    fn validate(&self) -> Result<(), String> {
        if self.professions.is_empty() {
            return Err("catalog.professions cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for entry in &self.professions {
            if entry.value.trim().is_empty() {
                return Err("catalog.professions contains an empty value".to_string());
            }
            if !seen.insert(entry.value.as_str()) {
                return Err(format!(
                    "catalog.professions contains duplicate value '{}'",
                    entry.value
                ));
            }
        }

        if self.document_categories.is_empty() {
            return Err("catalog.document_categories cannot be empty".to_string());
        }
        let mut categories = HashSet::new();
        for category in &self.document_categories {
            if !categories.insert(category.as_str()) {
                return Err(format!(
                    "catalog.document_categories contains duplicate '{category}'"
                ));
            }
        }

        for profession in self.templates.keys() {
            if !seen.contains(profession.as_str()) {
                return Err(format!(
                    "catalog.templates references unknown profession '{profession}'"
                ));
            }
        }

        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            professions: default_professions(),
            document_categories: default_document_categories(),
            templates: default_templates(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging (JSON lines)
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_session_path() -> String {
    ".prontuario/session.json".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_professions() -> Vec<ProfessionEntry> {
    vec![
        ProfessionEntry::new("medicina", "Medicina"),
        ProfessionEntry::new("fisioterapia", "Fisioterapia"),
        ProfessionEntry::new("psicologia", "Psicologia"),
        ProfessionEntry::new("enfermagem", "Enfermagem"),
        ProfessionEntry::new("nutricao", "Nutrição"),
        ProfessionEntry::new("terapia_ocupacional", "Terapia Ocupacional"),
    ]
}

fn default_document_categories() -> Vec<String> {
    [
        "Médico",
        "Fisioterapia",
        "Psicologia",
        "Enfermagem",
        "Nutrição",
        "Terapia Ocupacional",
        "Geral",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_templates() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, [&str; 5]); 4] = [
        (
            "medicina",
            [
                "Anamnese Médica",
                "Exame Físico",
                "Prescrição Médica",
                "Atestado Médico",
                "Relatório Médico",
            ],
        ),
        (
            "fisioterapia",
            [
                "Avaliação Fisioterapêutica",
                "Plano de Tratamento",
                "Evolução Fisioterapêutica",
                "Relatório de Alta",
                "Termo de Consentimento",
            ],
        ),
        (
            "psicologia",
            [
                "Anamnese Psicológica",
                "Avaliação Psicológica",
                "Relatório Psicológico",
                "Plano Terapêutico",
                "Evolução Psicológica",
            ],
        ),
        (
            "enfermagem",
            [
                "Histórico de Enfermagem",
                "Evolução de Enfermagem",
                "Prescrição de Enfermagem",
                "Relatório de Enfermagem",
                "Controle de Sinais Vitais",
            ],
        ),
    ];

    entries
        .iter()
        .map(|(profession, names)| {
            (
                profession.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect()
}
