use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::notify::DEFAULT_TOAST_TIMEOUT;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub toast_timeout_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
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

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(config_path)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("xplaindfile").join("config.json"))
    }
}

/// Effective runtime settings after merging CLI/env overrides onto the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub toast_timeout: Duration,
}

impl Settings {
    /// `backend_override` already folds in the env var (clap handles that).
    pub fn resolve(config: &Config, backend_override: Option<&str>) -> Self {
        let backend_url = backend_override
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                config
                    .backend_url
                    .clone()
                    .filter(|url| !url.trim().is_empty())
            })
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let toast_timeout = config
            .toast_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TOAST_TIMEOUT);

        Self {
            backend_url,
            toast_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_config_is_empty() {
        let settings = Settings::resolve(&Config::new(), None);
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.toast_timeout, DEFAULT_TOAST_TIMEOUT);
    }

    #[test]
    fn test_override_beats_config() {
        let config = Config {
            backend_url: Some("http://config:9000".to_string()),
            toast_timeout_ms: Some(1000),
        };
        let settings = Settings::resolve(&config, Some("http://cli:7000"));
        assert_eq!(settings.backend_url, "http://cli:7000");
        assert_eq!(settings.toast_timeout, Duration::from_millis(1000));

        let settings = Settings::resolve(&config, None);
        assert_eq!(settings.backend_url, "http://config:9000");
    }

    #[test]
    fn test_blank_override_falls_back_to_config() {
        let config = Config {
            backend_url: Some("http://config:9000".to_string()),
            toast_timeout_ms: None,
        };
        let settings = Settings::resolve(&config, Some("   "));
        assert_eq!(settings.backend_url, "http://config:9000");

        let settings = Settings::resolve(&Config::new(), Some(""));
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = serde_json::from_str(r#"{"toast_timeout_ms": 2000}"#).unwrap();
        assert_eq!(config.backend_url, None);
        assert_eq!(config.toast_timeout_ms, Some(2000));
    }
}
