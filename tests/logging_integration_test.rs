//! Integration tests for logging functionality

use cobs::config::LoggingConfig;
use cobs::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_logging_rotation_types() {
    for rotation in ["daily", "hourly", "never"] {
        let config = LoggingConfig {
            local_enabled: true,
            local_path: "/tmp/cobs".to_string(),
            local_rotation: rotation.to_string(),
        };
        assert_eq!(config.local_rotation, rotation);
    }
}

// The global subscriber can only be installed once per process, so every
// init_logging call lives in this one test.
#[test]
fn test_init_logging_creates_log_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let bad_level = LoggingConfig::default();
    assert!(init_logging("chatty", &bad_level).is_err());

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(timeline_index = 3, "Logging initialised");
    assert!(log_path.exists());
    drop(guard);
}
