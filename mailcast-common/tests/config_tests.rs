//! Unit tests for configuration resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate MAILCAST_API_URL or MAILCAST_TOKEN are marked with
//! #[serial] to ensure they run sequentially, not in parallel.

use mailcast_common::config::{Settings, TomlConfig, DEFAULT_API_BASE_URL, ENV_API_URL, ENV_TOKEN};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    env::remove_var(ENV_API_URL);
    env::remove_var(ENV_TOKEN);

    // Point at an explicit nonexistent path so a developer's real config
    // file cannot leak into the test
    let missing = std::path::Path::new("/nonexistent/mailcast/config.toml");
    let settings = Settings::resolve(None, None, Some(missing));

    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    assert!(settings.token.is_none());
    assert_eq!(settings.log_level, "info");
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(ENV_API_URL, "http://env.example:3000");

    let file = temp_config(r#"api_base_url = "http://file.example:3000""#);
    let settings = Settings::resolve(Some("http://cli.example:3000"), None, Some(file.path()));

    assert_eq!(settings.api_base_url, "http://cli.example:3000");

    env::remove_var(ENV_API_URL);
}

#[test]
#[serial]
fn test_env_var_beats_config_file() {
    env::set_var(ENV_API_URL, "http://env.example:3000");

    let file = temp_config(r#"api_base_url = "http://file.example:3000""#);
    let settings = Settings::resolve(None, None, Some(file.path()));

    assert_eq!(settings.api_base_url, "http://env.example:3000");

    env::remove_var(ENV_API_URL);
}

#[test]
#[serial]
fn test_config_file_values_apply() {
    env::remove_var(ENV_API_URL);
    env::remove_var(ENV_TOKEN);

    let file = temp_config(
        r#"
api_base_url = "http://file.example:3000"
token = "file-token"
log_level = "debug"
"#,
    );
    let settings = Settings::resolve(None, None, Some(file.path()));

    assert_eq!(settings.api_base_url, "http://file.example:3000");
    assert_eq!(settings.token.as_deref(), Some("file-token"));
    assert_eq!(settings.log_level, "debug");
}

#[test]
#[serial]
fn test_token_priority_cli_env_file() {
    env::set_var(ENV_TOKEN, "env-token");

    let file = temp_config(r#"token = "file-token""#);

    let settings = Settings::resolve(None, Some("cli-token"), Some(file.path()));
    assert_eq!(settings.token.as_deref(), Some("cli-token"));

    let settings = Settings::resolve(None, None, Some(file.path()));
    assert_eq!(settings.token.as_deref(), Some("env-token"));

    env::remove_var(ENV_TOKEN);

    let settings = Settings::resolve(None, None, Some(file.path()));
    assert_eq!(settings.token.as_deref(), Some("file-token"));
}

#[test]
#[serial]
fn test_malformed_config_file_is_ignored() {
    env::remove_var(ENV_API_URL);
    env::remove_var(ENV_TOKEN);

    let file = temp_config("this is [not valid toml");
    let settings = Settings::resolve(None, None, Some(file.path()));

    // Startup must proceed on defaults
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
#[serial]
fn test_trailing_slash_stripped_from_base_url() {
    env::remove_var(ENV_API_URL);

    let settings = Settings::resolve(Some("http://cli.example:3000/"), None, None);
    assert_eq!(settings.api_base_url, "http://cli.example:3000");
}

#[test]
fn test_toml_config_load_rejects_malformed_file() {
    let file = temp_config("api_base_url = [broken");
    assert!(TomlConfig::load(file.path()).is_err());
}

#[test]
fn test_toml_config_load_rejects_missing_file() {
    assert!(TomlConfig::load(std::path::Path::new("/nonexistent/config.toml")).is_err());
}
