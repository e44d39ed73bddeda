//! Configuration loading and backend endpoint resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MAILCAST_API_URL`, `MAILCAST_TOKEN`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unparseable config file must not prevent startup: it is
//! logged and the remaining sources apply.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default backend endpoint when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Environment variable naming the backend endpoint
pub const ENV_API_URL: &str = "MAILCAST_API_URL";

/// Environment variable carrying the bearer token
pub const ENV_TOKEN: &str = "MAILCAST_TOKEN";

/// Values read from the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub api_base_url: Option<String>,
    pub token: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a config file, failing on unreadable or malformed content.
    ///
    /// Callers that can proceed without a config file should treat the error
    /// as a warning, not a termination.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// Resolved console settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    /// Bearer token; commands that need authentication fail without it
    pub token: Option<String>,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from CLI overrides, environment, config file, and
    /// compiled defaults, in that order.
    pub fn resolve(
        cli_url: Option<&str>,
        cli_token: Option<&str>,
        config_path: Option<&Path>,
    ) -> Self {
        let file = load_config_file(config_path);

        let api_base_url = cli_url
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_API_URL).ok())
            .or_else(|| file.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let token = cli_token
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_TOKEN).ok())
            .or_else(|| file.token.clone());

        let log_level = file.log_level.unwrap_or_else(|| "info".to_string());

        Settings {
            // Trailing slashes would produce `//` when joining endpoint paths
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token,
            log_level,
        }
    }
}

/// Default configuration file path for the platform.
///
/// `~/.config/mailcast/config.toml` (or the platform equivalent); on Linux a
/// system-wide `/etc/mailcast/config.toml` is consulted when the user file
/// does not exist.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mailcast").join("config.toml"));

    if cfg!(target_os = "linux") {
        if let Some(path) = &user_config {
            if path.exists() {
                return user_config;
            }
        }
        let system_config = PathBuf::from("/etc/mailcast/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    user_config
}

fn load_config_file(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let Some(path) = path else {
        return TomlConfig::default();
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return TomlConfig::default();
    }

    match TomlConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    }
}
