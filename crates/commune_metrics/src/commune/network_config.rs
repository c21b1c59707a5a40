//! Derivation constants for the Commune network.
//!
//! Load from: env `COMMUNE_METRICS_CONFIG_PATH`, or `./config/network.json`, or
//! `./network.json`. Without a file every field takes its default; a file that exists
//! but does not parse is an error, as is an env path that names no file.

use crate::compute::rewards::BLOCKS_PER_DAY;
use crate::compute::{ExcludedFields, RewardEstimator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "COMMUNE_METRICS_CONFIG_PATH";

const DEFAULT_BONDS_MA_UNIT: &str = "COMAI";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("blocks_per_day must be positive")]
    ZeroBlocksPerDay,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Blocks per day; 10 800 at 8 s blocks.
    pub blocks_per_day: u64,
    /// Raw module fields hidden from module views.
    pub excluded_module_fields: ExcludedFields,
    /// Unit label appended to rendered `bonds_ma` values.
    pub bonds_ma_unit: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            blocks_per_day: BLOCKS_PER_DAY,
            excluded_module_fields: ExcludedFields::default(),
            bonds_ma_unit: DEFAULT_BONDS_MA_UNIT.to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load config: env COMMUNE_METRICS_CONFIG_PATH, then ./config/network.json, then
    /// ./network.json. Defaults when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_with(explicit.as_deref())
    }

    /// An explicit path must exist; only the fallback candidates may be absent.
    fn load_with(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        for candidate in [
            Path::new("./config/network.json"),
            Path::new("./network.json"),
        ] {
            if candidate.exists() {
                return Self::load_from_path(candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks_per_day == 0 {
            return Err(ConfigError::ZeroBlocksPerDay);
        }
        Ok(())
    }

    pub fn reward_estimator(&self) -> RewardEstimator {
        RewardEstimator::new(self.blocks_per_day)
    }
}
