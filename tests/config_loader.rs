use slicestore::{Config, ConfigError, NotifyPolicy, StoreConfig};
use std::fs;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (temp_dir, path)
}

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.store.name, "store");
    assert_eq!(config.store.notify, NotifyPolicy::EveryDispatch);
    assert_eq!(config.store.history_limit, 64);
    assert!(!config.store.trace_dispatch);
    assert_eq!(config.logging.filter, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("slicestore/config.toml"));
}

#[test]
fn test_load_full_file() {
    let (_dir, path) = write_config(
        r#"
[store]
name = "app"
notify = "on_change"
history_limit = 8
trace_dispatch = true

[logging]
filter = "slicestore=debug"
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(
        config.store,
        StoreConfig {
            name: "app".to_string(),
            notify: NotifyPolicy::OnChange,
            history_limit: 8,
            trace_dispatch: true,
        }
    );
    assert_eq!(config.logging.filter, "slicestore=debug");
}

#[test]
fn test_missing_sections_use_defaults() {
    let (_dir, path) = write_config("[store]\nname = \"partial\"\n");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.store.name, "partial");
    assert_eq!(config.store.history_limit, 64);
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = write_config("[store\nname = ");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_unknown_notify_policy_is_parse_error() {
    let (_dir, path) = write_config("[store]\nnotify = \"sometimes\"\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_validation_fails_blank_name() {
    let mut config = Config::default();
    config.store.name = "  ".to_string();

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("Store name"));
        }
        _ => panic!("Expected ValidationError"),
    }
}

#[test]
fn test_validation_fails_huge_history() {
    let mut config = Config::default();
    config.store.history_limit = slicestore::config::MAX_HISTORY_LIMIT + 1;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_validation_fails_bad_log_filter() {
    let (_dir, path) = write_config("[logging]\nfilter = \"slicestore=loud\"\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config::default();
    let encoded = toml::to_string(&config).unwrap();
    let decoded: Config = toml::from_str(&encoded).unwrap();
    assert_eq!(config, decoded);
}
