//! Client configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which covers the API base URL, the request timeout, and where the
//! session token is kept between runs.
//!
//! Configuration is stored at `~/.config/stockman/config.json`; the
//! `STOCKMAN_BASE_URL` environment variable overrides the saved base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "stockman";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default Stock Manager API base URL (local development server)
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the base URL
const BASE_URL_ENV: &str = "STOCKMAN_BASE_URL";

/// Default request timeout in seconds.
/// Also bounds the session renewal call, so a hung refresh cannot block
/// waiting requests past this.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Directory holding the persisted session token.
    /// `None` keeps the session in memory for the process lifetime.
    #[serde(skip)]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: dirs::data_dir().map(|dir| dir.join(APP_NAME)),
        }
    }
}

impl Config {
    /// Load the saved configuration, falling back to defaults, with the
    /// environment override applied last.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let mut loaded: Config = serde_json::from_str(&contents)?;
            loaded.data_dir = dirs::data_dir().map(|dir| dir.join(APP_NAME));
            loaded
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        Ok(config)
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
}
