// Integration tests for layered settings loading
// Every test touches the process environment, so they run serially.

use bootkit::{ConfigError, ConfigLoader, Logger, ReadError, Settings, TracingLogger};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SETTINGS_ENV: [&str; 4] = ["LOG_LEVEL", "LOG_FORMAT", "APP_CONFIG_DEBUG", "APP_CONFIG_ENV"];

fn write_config(dir: &Path, contents: &str) {
    fs::write(dir.join("config.yaml"), contents).unwrap();
}

#[test]
#[serial]
fn test_env_wins_for_any_candidate_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_config(first.path(), "log:\n  level: warn\n");
    write_config(second.path(), "log:\n  level: error\n");

    let orders = [
        vec![first.path(), second.path()],
        vec![second.path(), first.path()],
    ];

    temp_env::with_vars_unset(SETTINGS_ENV, || {
        temp_env::with_var("LOG_LEVEL", Some("debug"), || {
            for order in &orders {
                let settings = ConfigLoader::with_paths(order.clone()).load().unwrap();
                assert_eq!(settings.logging.level, "debug");
            }
        });
    });
}

#[test]
#[serial]
fn test_env_name_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "app_config:\n  env: production\n");

    let settings = temp_env::with_vars_unset(SETTINGS_ENV, || {
        temp_env::with_var("app_config_env", Some("canary"), || {
            ConfigLoader::with_paths([dir.path()]).load().unwrap()
        })
    });
    assert_eq!(settings.application.env, "canary");
}

#[test]
#[serial]
fn test_missing_config_everywhere() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let result = temp_env::with_vars_unset(SETTINGS_ENV, || {
        ConfigLoader::with_paths([first.path(), second.path()]).load()
    });

    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::Read(ReadError::NotFound { .. })));
    let message = err.to_string();
    assert!(message.starts_with("ConfigLoader::load: failed to read config file"));
    assert!(message.contains(&first.path().display().to_string()));
}

#[test]
#[serial]
fn test_shipped_config_loads() {
    let settings = temp_env::with_vars_unset(SETTINGS_ENV, || {
        ConfigLoader::with_paths(["configs"]).load().unwrap()
    });

    assert_eq!(settings.logging.format, "console");
    assert!(settings.application.debug);
    assert_eq!(settings.connection.postgresql.master.port, 5432);
    assert_eq!(settings.connection.postgresql.slave.port, 5433);
}

#[test]
#[serial]
fn test_debug_console_round_trip_through_loader() {
    let mut original = Settings::default();
    original.logging.level = "debug".to_string();
    original.logging.format = "console".to_string();

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &serde_yaml::to_string(&original).unwrap());

    let loaded = temp_env::with_vars_unset(SETTINGS_ENV, || {
        ConfigLoader::with_paths([dir.path()]).load().unwrap()
    });

    assert_eq!(loaded.logging.level, "debug");
    assert_eq!(loaded.logging.format, "console");
    assert_eq!(loaded, original);
}

#[test]
#[serial]
fn test_loaded_settings_drive_logger() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "log:\n  level: info\n  format: console\n");

    let settings = temp_env::with_vars_unset(SETTINGS_ENV, || {
        temp_env::with_var("LOG_FORMAT", Some("yaml"), || {
            ConfigLoader::with_paths([dir.path()]).load().unwrap()
        })
    });

    // The loader accepts any string; the logger rejects unknown encodings
    assert_eq!(settings.logging.format, "yaml");
    assert!(TracingLogger::new(&settings).is_err());

    let mut fixed = settings.clone();
    fixed.logging.format = "json".to_string();
    let logger = TracingLogger::new(&fixed).unwrap();
    logger.debug(&[&"filtered out at info"]);
    assert!(logger.sync().is_ok());
}
