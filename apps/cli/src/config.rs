//! Configuration file management.
//!
//! Optional JSON file at `~/.config/w3deploy/config.json`. Missing fields
//! take their defaults; a file that fails to parse is ignored with a
//! warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use w3deploy_protocol::constants::{
    DEFAULT_CHUNK_SIZE_LIMIT, DEFAULT_CONCURRENCY, DEFAULT_NETWORK, DEFAULT_POLL_INTERVAL,
};
use w3deploy_protocol::{NetworkConfig, find_network};
use w3deploy_upload::{MonitorConfig, UploadConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network used when `--network` is not given.
    #[serde(default = "default_network")]
    pub default_network: String,

    /// Extra networks; an entry with a built-in name or chain id replaces it.
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_chunk_size_limit")]
    pub chunk_size_limit: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub max_poll_attempts: Option<u32>,
}

fn default_network() -> String {
    DEFAULT_NETWORK.into()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_chunk_size_limit() -> u64 {
    DEFAULT_CHUNK_SIZE_LIMIT
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_network: default_network(),
            networks: Vec::new(),
            concurrency: default_concurrency(),
            chunk_size_limit: default_chunk_size_limit(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: None,
        }
    }
}

impl AppConfig {
    /// Loads `~/.config/w3deploy/config.json`, or defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Network named by `selector`, or the configured default.
    pub fn network(&self, selector: Option<&str>) -> anyhow::Result<NetworkConfig> {
        let selector = selector.unwrap_or(&self.default_network);
        find_network(selector, &self.networks)
            .ok_or_else(|| anyhow::anyhow!("unknown network '{selector}'"))
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            max_attempts: self.max_poll_attempts,
        }
    }

    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            concurrency: self.concurrency.max(1),
            chunk_size_limit: self.chunk_size_limit,
            monitor: self.monitor_config(),
            ..UploadConfig::default()
        }
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("w3deploy").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(dir) = std::env::var("XDG_CONFIG_HOME")
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home).join(".config"))
    }
}
