//! Configuration management for fieldtrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fieldtrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "tracking.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIELDTRACK_`)
/// 2. TOML config file at `~/.config/fieldtrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Position sampler configuration.
    pub sampler: SamplerConfig,
    /// Dashboard/map presentation configuration.
    pub dashboard: DashboardConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fieldtrack/tracking.db`
    pub database_path: Option<PathBuf>,
}

/// Position sampler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sampling interval while the device is moving, in milliseconds.
    pub moving_interval_ms: u64,
    /// Sampling interval while the device is stationary, in milliseconds.
    pub stationary_interval_ms: u64,
    /// Displacement below this many meters counts as a stationary check.
    pub stationary_threshold_m: f64,
    /// Consecutive stationary checks before the slower cadence kicks in.
    pub stationary_checks_before_slowdown: u32,
    /// Maximum time to wait for a position fix, in milliseconds.
    pub acquire_timeout_ms: u64,
}

/// Dashboard/map presentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval at which dashboards are expected to poll, in seconds.
    pub poll_interval_secs: u64,
    /// Symmetric padding applied to map bounds, in decimal degrees.
    pub bounds_padding_deg: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            moving_interval_ms: 60_000,
            stationary_interval_ms: 120_000,
            stationary_threshold_m: 20.0,
            stationary_checks_before_slowdown: 3,
            acquire_timeout_ms: 10_000,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            bounds_padding_deg: 0.01,
        }
    }
}

impl SamplerConfig {
    /// Get the moving-cadence interval as a Duration.
    #[must_use]
    pub fn moving_interval(&self) -> Duration {
        Duration::from_millis(self.moving_interval_ms)
    }

    /// Get the stationary-cadence interval as a Duration.
    #[must_use]
    pub fn stationary_interval(&self) -> Duration {
        Duration::from_millis(self.stationary_interval_ms)
    }

    /// Get the position acquisition timeout as a Duration.
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FIELDTRACK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("FIELDTRACK_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.moving_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "moving_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.sampler.stationary_interval_ms < self.sampler.moving_interval_ms {
            return Err(Error::ConfigValidation {
                message: format!(
                    "stationary_interval_ms ({}) cannot be less than moving_interval_ms ({})",
                    self.sampler.stationary_interval_ms, self.sampler.moving_interval_ms
                ),
            });
        }

        if self.sampler.acquire_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "acquire_timeout_ms must be greater than 0".to_string(),
            });
        }

        if !self.sampler.stationary_threshold_m.is_finite()
            || self.sampler.stationary_threshold_m < 0.0
        {
            return Err(Error::ConfigValidation {
                message: "stationary_threshold_m must be a non-negative number".to_string(),
            });
        }

        if self.dashboard.poll_interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_secs must be greater than 0".to_string(),
            });
        }

        if !self.dashboard.bounds_padding_deg.is_finite()
            || self.dashboard.bounds_padding_deg < 0.0
        {
            return Err(Error::ConfigValidation {
                message: "bounds_padding_deg must be a non-negative number".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
