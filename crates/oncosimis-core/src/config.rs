use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::monitor::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const DEFAULT_WELCOME: &str = "Hello! I'm the Oncosimis AI Assistant. Ask me about our AcceTT® and BacSec® platforms, our team, or request any Standard Operating Procedures you need.";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub poll_interval_secs: u64,
    pub download_dir: Option<PathBuf>,
    pub welcome_message: Option<String>,
    pub skip_browser_warning: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            download_dir: None,
            welcome_message: Some(DEFAULT_WELCOME.to_string()),
            skip_browser_warning: true,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin on the health endpoint.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Where downloaded documents are saved.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("oncosimis").join("config.json"))
    }
}
