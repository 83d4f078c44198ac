//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so the
//! initialization checks live in a single test.

use prontuario::config::LoggingConfig;
use prontuario::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let config = LoggingConfig::default();
    let err = init_logging("verbose", &config).err().unwrap();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_file_logging_writes_json_lines() {
    std::env::remove_var("RUST_LOG");
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    // A second subscriber cannot be installed
    assert!(init_logging("debug", &LoggingConfig::default()).is_err());

    drop(guard);
    let contents = std::fs::read_to_string(log_path.join("prontuario.log")).unwrap();
    let first = contents.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["fields"]["message"], "Logging initialized");
}
