//! Configuration file management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Contact trust settings.
    #[serde(default)]
    pub contacts: ContactsConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Intake socket filename under the data directory.
    #[serde(default = "default_socket_name")]
    pub socket_name: String,
}

/// Contact trust configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// Pending offers older than this are expired.
    #[serde(default = "default_offer_ttl")]
    pub offer_ttl_secs: u64,
    /// How often the expiry sweeper runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_socket_name() -> String {
    "intake.sock".to_string()
}

fn default_offer_ttl() -> u64 {
    // Pending contact offers live for a day.
    86_400
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            socket_name: default_socket_name(),
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            offer_ttl_secs: default_offer_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Path of the intake socket.
    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.socket_name)
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Check env var override first
        if let Ok(dir) = std::env::var("SOTTO_DATA_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("SOTTO_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Sotto")
        }
        #[cfg(target_os = "linux")]
        {
            dirs_fallback(".sotto")
        }
        #[cfg(target_os = "windows")]
        {
            dirs_fallback("Sotto")
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            dirs_fallback(".sotto")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/sotto"))
}
