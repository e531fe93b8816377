//! Configuration file support for CareTrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/caretrack/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub medications: MedicationConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Medication tracking parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationConfig {
    /// A refill is flagged when the refill date falls within this many days.
    #[serde(default = "default_refill_warning_days")]
    pub refill_warning_days: i64,
}

impl Default for MedicationConfig {
    fn default() -> Self {
        Self {
            refill_warning_days: default_refill_warning_days(),
        }
    }
}

/// Health metric summary parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Number of most recent readings used for per-kind averages and trends.
    #[serde(default = "default_recent_readings")]
    pub recent_readings: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            recent_readings: default_recent_readings(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("caretrack")
}

fn default_refill_warning_days() -> i64 {
    7
}

fn default_recent_readings() -> usize {
    10
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("caretrack").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.medications.refill_warning_days, 7);
        assert_eq!(config.metrics.recent_readings, 10);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.medications.refill_warning_days,
            parsed.medications.refill_warning_days
        );
        assert_eq!(config.metrics.recent_readings, parsed.metrics.recent_readings);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[medications]
refill_warning_days = 14
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.medications.refill_warning_days, 14);
        assert_eq!(config.metrics.recent_readings, 10); // default
    }
}
