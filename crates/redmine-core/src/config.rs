//! Configuration management for redmine-tools.
//!
//! Handles loading and saving configuration from TOML files.
//! Config files are stored in platform-specific locations:
//!
//! - **macOS/Linux**: `~/.config/redmine-tools/config.toml`
//! - **Windows**: `%APPDATA%\redmine-tools\config.toml`
//!
//! The API key is never written to this file; it comes from the
//! `REDMINE_API_KEY` environment variable or the OS keychain.
//!
//! # Example
//!
//! ```ignore
//! use redmine_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("redmine.url", "https://redmine.example.com")?;
//! config.save()?;
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "redmine-tools";

/// Environment variable overriding `redmine.url`.
pub const HOST_ENV: &str = "REDMINE_HOST";

/// Environment variable carrying the API key.
pub const API_KEY_ENV: &str = "REDMINE_API_KEY";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Redmine instance configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redmine: Option<RedmineConfig>,

    /// MCP server identity
    #[serde(default)]
    pub server: ServerConfig,
}

/// Redmine instance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedmineConfig {
    /// Base URL of the Redmine instance
    pub url: String,
}

/// Server identity reported during `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "redmine-mcp".to_string()
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// Only `REDMINE_HOST` affects the stored config; the API key is
    /// resolved separately.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
            debug!(host = %host, "Using Redmine host from environment");
            self.redmine = Some(RedmineConfig { url: host });
        }
    }

    /// Redmine base URL, if configured.
    pub fn redmine_url(&self) -> Option<&str> {
        self.redmine.as_ref().map(|r| r.url.as_str())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `redmine.url`, `server.name`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("redmine", "url" | "host") => {
                self.redmine = Some(RedmineConfig {
                    url: value.trim_end_matches('/').to_string(),
                });
            }
            ("redmine", _) => {
                return Err(Error::Config(format!(
                    "Unknown Redmine config field: {}",
                    field
                )))
            }
            ("server", "name") => self.server.name = value.to_string(),
            ("server", _) => {
                return Err(Error::Config(format!(
                    "Unknown server config field: {}",
                    field
                )))
            }
            _ => return Err(Error::Config(format!("Unknown section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match (section, field) {
            ("redmine", "url" | "host") => Ok(self.redmine.as_ref().map(|r| r.url.clone())),
            ("redmine", _) => Err(Error::Config(format!(
                "Unknown Redmine config field: {}",
                field
            ))),
            ("server", "name") => Ok(Some(self.server.name.clone())),
            ("server", _) => Err(Error::Config(format!(
                "Unknown server config field: {}",
                field
            ))),
            _ => Err(Error::Config(format!("Unknown section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

// =============================================================================
// Tests
// =============================================================================
