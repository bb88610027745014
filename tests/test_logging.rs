use std::path::Path;
use std::sync::Mutex;

use llm_score_adapter::logging::{self, LogConfig, LOG_DIR_ENV, LOG_JSON_ENV};

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_log_config_defaults_to_plain_stderr() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::remove_var(LOG_DIR_ENV);
    std::env::remove_var(LOG_JSON_ENV);

    let config = LogConfig::from_env();
    assert!(config.directory.is_none());
    assert!(!config.json);
}

#[test]
fn test_log_config_from_env() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    std::env::set_var(LOG_DIR_ENV, "/var/log/score");
    for (value, json) in [
        ("1", true),
        ("true", true),
        (" true ", true),
        ("0", false),
        ("false", false),
        ("yes", false),
        ("", false),
    ] {
        std::env::set_var(LOG_JSON_ENV, value);
        let config = LogConfig::from_env();
        assert_eq!(config.json, json, "{LOG_JSON_ENV}={value:?}");
        assert_eq!(config.directory.as_deref(), Some(Path::new("/var/log/score")));
    }

    std::env::remove_var(LOG_DIR_ENV);
    std::env::remove_var(LOG_JSON_ENV);
}

#[test]
fn test_init_creates_log_directory() {
    let scratch = tempfile::tempdir().unwrap();
    let directory = scratch.path().join("logs/adapter");

    let config = LogConfig {
        directory: Some(directory.clone()),
        json: true,
    };

    // only this test installs a global subscriber in this binary
    let guard = logging::init(&config).unwrap();
    tracing::info!("written to the rolling file");
    drop(guard);

    assert!(directory.is_dir());

    // the subscriber is global and installs once
    assert!(matches!(
        logging::init(&config),
        Err(llm_score_adapter::Error::Logging(_))
    ));
}
