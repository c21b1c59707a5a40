//! Commune network records and configuration.

mod network_config;
mod records;

pub use network_config::{ConfigError, NetworkConfig, CONFIG_PATH_ENV};
pub use records::{FeeParams, ModuleRecord, SubnetParams};
