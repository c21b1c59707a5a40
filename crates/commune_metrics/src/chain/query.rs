//! The façade the derivation layer is fed from.

use crate::chain::FetchError;
use crate::commune::{FeeParams, ModuleRecord, SubnetParams};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Read-only queries against the ledger. Every call is independent; implementations
/// hold no per-request state.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Registered modules of `netuid`, keyed by module key.
    async fn module_registry(&self, netuid: u16)
        -> Result<BTreeMap<String, ModuleRecord>, FetchError>;

    async fn immunity_period(&self, netuid: u16) -> Result<u64, FetchError>;

    /// Blocks per epoch of `netuid`.
    async fn tempo(&self, netuid: u16) -> Result<u64, FetchError>;

    async fn current_block(&self) -> Result<u64, FetchError>;

    async fn subnet_params(&self) -> Result<BTreeMap<u16, SubnetParams>, FetchError>;

    /// Total stake (nano) per subnet. Subnets with no stake may be absent.
    async fn total_stake_by_subnet(&self) -> Result<BTreeMap<u16, u64>, FetchError>;

    /// Global emission per block (nano).
    async fn unit_emission(&self) -> Result<u64, FetchError>;

    async fn fee_params(&self) -> Result<FeeParams, FetchError>;
}
