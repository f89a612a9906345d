//! Connection settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use beacon_link::{LinkConfig, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

/// Persisted connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Device IP address or host name
    #[serde(default = "default_host")]
    pub host: String,
    /// Device TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Response timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "192.168.10.2".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for beacon
    /// Uses $XDG_CONFIG_HOME/beacon, falls back to ~/.config/beacon
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("beacon"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("beacon"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults when no file exists
    pub fn load() -> anyhow::Result<Self> {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        timeout_ms: Option<u64>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(timeout_ms) = timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    /// `host:port` address of the device
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            response_timeout: Duration::from_millis(self.timeout_ms),
            ..Default::default()
        }
    }
}
