//! User configuration and preferences

use crate::error::{FcleanError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_extensions() -> Vec<String> {
    vec![".txt".to_string(), ".log".to_string(), ".tmp".to_string()]
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserConfig {
    /// Whitelist entries added by the user, applied on top of the built-in
    /// protected directory names.
    #[serde(default)]
    pub custom_whitelist: Vec<String>,
    /// Extensions used when an extension scan is run without an explicit
    /// list.
    #[serde(default = "default_extensions")]
    pub default_extensions: Vec<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            custom_whitelist: Vec::new(),
            default_extensions: default_extensions(),
        }
    }
}

impl UserConfig {
    /// Get the config file path (~/.config/fclean/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fclean").join("config.json"))
    }

    /// Load config from file, or create default if doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            FcleanError::ConfigError("Could not determine config directory".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| FcleanError::ConfigError(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| FcleanError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            FcleanError::ConfigError("Could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FcleanError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FcleanError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, contents)
            .map_err(|e| FcleanError::ConfigError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
