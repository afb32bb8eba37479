//! TOML-based application configuration.
//!
//! Stores:
//! - Remote store endpoint and credentials
//! - Timer cadence (backup interval, tick interval)
//! - Queue capacity
//!
//! Configuration is stored at `~/.config/focusdeck/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Remote task collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote task store, e.g. `https://api.example.com`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the remote store.
    #[serde(default)]
    pub api_token: Option<String>,
}

/// Timer cadence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Periodic remote backup interval while Running. This bounds the
    /// worst-case remote staleness after an unclean close.
    #[serde(default = "default_backup_interval_secs")]
    pub backup_interval_secs: u64,
    /// Display tick cadence for `timer watch`.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of queued items.
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: RemoteConfig,
    #[serde(default = "default_timer")]
    pub timer: TimerConfig,
    #[serde(default = "default_queue")]
    pub queue: QueueConfig,
}

fn default_backup_interval_secs() -> u64 {
    30
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_queue_capacity() -> usize {
    crate::queue::DEFAULT_QUEUE_CAPACITY
}

fn default_remote() -> RemoteConfig {
    RemoteConfig {
        base_url: None,
        api_token: None,
    }
}

fn default_timer() -> TimerConfig {
    TimerConfig {
        backup_interval_secs: default_backup_interval_secs(),
        tick_interval_ms: default_tick_interval_ms(),
    }
}

fn default_queue() -> QueueConfig {
    QueueConfig {
        capacity: default_queue_capacity(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            timer: default_timer(),
            queue: default_queue(),
        }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/focusdeck"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, falling back to defaults when the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}
