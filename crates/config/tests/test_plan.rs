//! Tests for the `parlor-config` loader: default handling, file
//! discovery via `PARLOR_CONFIG`, and environment overrides.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use parlor_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "PARLOR_CONFIG",
    "PARLOR__HTTP__ADDRESS",
    "PARLOR__HTTP__PORT",
    "PARLOR__STORAGE__HISTORY_FILE",
    "PARLOR__STORAGE__UPLOAD_DIR",
    "PARLOR__BOT__API_KEY",
    "PARLOR__BOT__MODEL",
    "PARLOR__BOT__BASE_URL",
    "PARLOR__BOT__REQUEST_TIMEOUT_SECONDS",
    "PARLOR__BOT__REPLY_DELAY_MS",
];

fn reset_environment() {
    for key in ENV_VARS_TO_RESET {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_without_file_or_environment() {
    reset_environment();

    let config = load().expect("defaults should load");
    let expected = AppConfig::default();

    assert_eq!(config.http.address, expected.http.address);
    assert_eq!(config.http.port, expected.http.port);
    assert_eq!(config.storage.history_file, expected.storage.history_file);
    assert_eq!(config.storage.upload_dir, expected.storage.upload_dir);
    assert_eq!(config.bot.model, expected.bot.model);
    assert!(config.bot.api_key.is_none());
}

#[test]
#[serial]
fn config_file_via_env_var_overrides_defaults() {
    reset_environment();

    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("parlor.toml");
    fs::write(
        &path,
        r#"
[http]
address = "0.0.0.0"
port = 9001

[bot]
model = "models/gemini-2.0-flash"
reply_delay_ms = 0
"#,
    )
    .expect("write config file");

    std::env::set_var("PARLOR_CONFIG", &path);
    let config = load().expect("file-backed config should load");
    std::env::remove_var("PARLOR_CONFIG");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 9001);
    assert_eq!(config.bot.model, "models/gemini-2.0-flash");
    assert_eq!(config.bot.reply_delay_ms, 0);
    // Sections absent from the file keep their defaults.
    assert_eq!(
        config.storage.upload_dir,
        AppConfig::default().storage.upload_dir
    );
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    reset_environment();

    std::env::set_var("PARLOR__HTTP__PORT", "6006");
    std::env::set_var("PARLOR__BOT__API_KEY", "test-key");
    let config = load().expect("environment-backed config should load");
    std::env::remove_var("PARLOR__HTTP__PORT");
    std::env::remove_var("PARLOR__BOT__API_KEY");

    assert_eq!(config.http.port, 6006);
    assert_eq!(config.bot.api_key.as_deref(), Some("test-key"));
}
