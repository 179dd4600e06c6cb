//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the last used username, the login retry bound, and an
//! optional override for the secrets output path.
//!
//! Configuration is stored at `~/.config/guardlink/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::secrets::DEFAULT_SECRETS_FILE;

/// Application name used for the config directory path
const APP_NAME: &str = "guardlink";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default number of failed login attempts before the run is abandoned.
/// Bounded so persistently bad input cannot loop forever.
const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_username: Option<String>,
    pub max_login_attempts: Option<u32>,
    pub secrets_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Login attempt bound, clamped to at least one attempt
    pub fn login_attempt_limit(&self) -> u32 {
        self.max_login_attempts
            .unwrap_or(DEFAULT_MAX_LOGIN_ATTEMPTS)
            .max(1)
    }

    /// Where the secret bundle gets written, relative paths resolve
    /// against the current directory
    pub fn secrets_path(&self) -> PathBuf {
        self.secrets_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attempt_limit() {
        let config = Config::default();
        assert_eq!(config.login_attempt_limit(), DEFAULT_MAX_LOGIN_ATTEMPTS);
    }

    #[test]
    fn test_attempt_limit_clamped_to_one() {
        let config = Config {
            max_login_attempts: Some(0),
            ..Default::default()
        };
        assert_eq!(config.login_attempt_limit(), 1);
    }

    #[test]
    fn test_default_secrets_path() {
        let config = Config::default();
        assert_eq!(config.secrets_path(), PathBuf::from(DEFAULT_SECRETS_FILE));
    }

    #[test]
    fn test_secrets_path_override() {
        let config = Config {
            secrets_file: Some(PathBuf::from("/tmp/out.json")),
            ..Default::default()
        };
        assert_eq!(config.secrets_path(), PathBuf::from("/tmp/out.json"));
    }
}
