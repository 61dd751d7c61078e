//! Driver configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use votereward_types::RewardParams;

use crate::DriverError;

/// Configuration for the distribution driver.
///
/// Can be loaded from a TOML file via [`DriverConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Directory holding the persisted ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Beneficiaries evaluated per worker task.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of worker tasks evaluating beneficiaries at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Earliest start boundary of the first epoch, usually the boundary at
    /// which rewards were set up. Ignored once a ledger has been persisted.
    #[serde(default)]
    pub initial_boundary: u64,

    /// Reward parameters applied to the next epoch opened.
    #[serde(default)]
    pub params: RewardParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./votereward_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_max_concurrent() -> usize {
    4
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DriverConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DriverError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(s).map_err(|e| DriverError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self).map_err(|e| DriverError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.batch_size == 0 {
            return Err(DriverError::Config("batch_size must be at least 1".into()));
        }
        if self.max_concurrent == 0 {
            return Err(DriverError::Config("max_concurrent must be at least 1".into()));
        }
        self.params.validate()?;
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            batch_size: default_batch_size(),
            max_concurrent: default_max_concurrent(),
            initial_boundary: 0,
            params: RewardParams::default(),
        }
    }
}
