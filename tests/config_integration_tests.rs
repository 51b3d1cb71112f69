//! Integration tests for ConfigManager and JSON configuration loading
//!
//! These tests verify:
//! - Settings and credentials loading from Config.json / creds.secret
//! - The distinct error kind (and exit code) for each failure
//! - Optional settings falling back to defaults

use camino::Utf8PathBuf;
use imgbb_uploader::{ConfigError, ConfigManager, Timeouts, load_json_file};
use std::fs;
use tempfile::TempDir;

const VALID_SETTINGS: &str = r#"{
    "working_path": "/home/me/Pictures/holiday",
    "allowed_formats": [".jpg", ".png", ".webp"],
    "ignored_files": ["cover.jpg"],
    "link_export_types": "Direct links",
    "headless_mode": true
}"#;

const VALID_CREDENTIALS: &str = r#"{
    "imgbb_username": "alice",
    "imgbb_password": "secret",
    "imgbb_album_id": "album42"
}"#;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_load_valid_settings_and_credentials() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(config_path.join("Config.json"), VALID_SETTINGS).unwrap();
    fs::write(config_path.join("creds.secret"), VALID_CREDENTIALS).unwrap();

    let manager = ConfigManager::new(&config_path);
    let settings = manager.load_settings().unwrap();
    let credentials = manager.load_credentials().unwrap();

    assert_eq!(settings.working_path, Utf8PathBuf::from("/home/me/Pictures/holiday"));
    assert_eq!(settings.allowed_formats, vec![".jpg", ".png", ".webp"]);
    assert_eq!(settings.ignored_files, vec!["cover.jpg"]);
    assert_eq!(settings.link_export_types, "Direct links");
    assert!(settings.headless_mode);
    assert!(!settings.debug_mode);
    assert_eq!(settings.timeouts, Timeouts::default());

    assert_eq!(credentials.imgbb_username, "alice");
    assert_eq!(credentials.imgbb_album_id, "album42");
}

#[test]
fn test_generic_value_load() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let path = config_path.join("Config.json");
    fs::write(&path, VALID_SETTINGS).unwrap();

    let value: serde_json::Value = load_json_file(&path).unwrap();
    assert!(value.as_object().is_some_and(|o| !o.is_empty()));
}

#[test]
fn test_missing_file_is_not_found() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    let err = manager.load_settings().unwrap_err();

    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert_eq!(err.exit_code(), -1);
}

#[test]
fn test_invalid_json_is_parse_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(config_path.join("creds.secret"), "{ imgbb_username: alice }").unwrap();

    let err = ConfigManager::new(&config_path).load_credentials().unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.exit_code(), -3);
}

#[test]
fn test_missing_key_is_reported_by_name() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("Config.json"),
        r#"{
            "working_path": "/tmp",
            "allowed_formats": [".jpg"],
            "ignored_files": [],
            "headless_mode": false
        }"#,
    )
    .unwrap();

    let err = ConfigManager::new(&config_path).load_settings().unwrap_err();

    match &err {
        ConfigError::MissingKey { key, .. } => assert_eq!(key, "link_export_types"),
        other => panic!("Expected MissingKey, got {:?}", other),
    }
    assert_eq!(err.exit_code(), -2);
}

#[test]
fn test_wrong_value_type_is_unknown() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("Config.json"),
        VALID_SETTINGS.replace("\"headless_mode\": true", "\"headless_mode\": \"yes\""),
    )
    .unwrap();

    let err = ConfigManager::new(&config_path).load_settings().unwrap_err();

    assert!(matches!(err, ConfigError::Unknown { .. }));
    assert_eq!(err.exit_code(), -4);
}

#[test]
fn test_custom_timeouts_and_debug_mode() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let json = VALID_SETTINGS.replace(
        "\"headless_mode\": true",
        "\"headless_mode\": true, \"debug_mode\": true, \"timeouts\": {\"upload_secs\": 180}",
    );
    fs::write(config_path.join("Config.json"), json).unwrap();

    let settings = ConfigManager::new(&config_path).load_settings().unwrap();

    assert!(settings.debug_mode);
    assert_eq!(settings.timeouts.upload_secs, 180);
    assert_eq!(settings.timeouts.element_secs, 10);
}

#[test]
fn test_with_paths_uses_given_files() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let settings_path = config_path.join("settings.json");
    let creds_path = config_path.join("account.json");
    fs::write(&settings_path, VALID_SETTINGS).unwrap();
    fs::write(&creds_path, VALID_CREDENTIALS).unwrap();

    let manager = ConfigManager::with_paths(settings_path, creds_path);

    assert!(manager.load_settings().is_ok());
    assert!(manager.load_credentials().is_ok());
}
