//! In-memory ledger state loaded from a JSON file: offline runs and tests.

use crate::chain::fetch::registry_from_list;
use crate::chain::query::LedgerQuery;
use crate::chain::FetchError;
use crate::commune::{FeeParams, ModuleRecord, SubnetParams};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use time::OffsetDateTime;
use tracing::info;

const SNAPSHOT_VERSION: u32 = 1;

/// Everything the façade serves, captured at one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub captured_at: Option<OffsetDateTime>,
    pub block: u64,
    pub unit_emission: u64,
    pub fees: FeeParams,
    pub subnets: BTreeMap<u16, SubnetParams>,
    #[serde(default)]
    pub total_stake: BTreeMap<u16, u64>,
    #[serde(default)]
    pub immunity_period: BTreeMap<u16, u64>,
    #[serde(default)]
    pub tempo: BTreeMap<u16, u64>,
    /// Module lists per netuid.
    #[serde(default)]
    pub modules: BTreeMap<u16, Vec<ModuleRecord>>,
}

impl LedgerSnapshot {
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        serde_json::from_str(json).map_err(|source| FetchError::Decode {
            context: "snapshot".to_string(),
            source,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let snapshot = Self::from_json(&content)?;
        info!(
            path = %path.as_ref().display(),
            block = snapshot.block,
            subnets = snapshot.subnets.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Pull every subnet's state from `ledger`.
    pub async fn capture(ledger: &dyn LedgerQuery) -> Result<Self, FetchError> {
        let (block, unit_emission, fees, subnets, total_stake) = tokio::try_join!(
            ledger.current_block(),
            ledger.unit_emission(),
            ledger.fee_params(),
            ledger.subnet_params(),
            ledger.total_stake_by_subnet(),
        )?;
        let mut immunity_period = BTreeMap::new();
        let mut tempo = BTreeMap::new();
        let mut modules = BTreeMap::new();
        for &netuid in subnets.keys() {
            let (period, t, registry) = tokio::try_join!(
                ledger.immunity_period(netuid),
                ledger.tempo(netuid),
                ledger.module_registry(netuid),
            )?;
            immunity_period.insert(netuid, period);
            tempo.insert(netuid, t);
            modules.insert(netuid, registry.into_values().collect());
        }
        info!(block, subnets = subnets.len(), "captured snapshot");
        Ok(Self {
            version: SNAPSHOT_VERSION,
            captured_at: Some(OffsetDateTime::now_utc()),
            block,
            unit_emission,
            fees,
            subnets,
            total_stake,
            immunity_period,
            tempo,
            modules,
        })
    }

    fn per_subnet<T: Copy>(
        map: &BTreeMap<u16, T>,
        netuid: u16,
        what: &str,
    ) -> Result<T, FetchError> {
        map.get(&netuid)
            .copied()
            .ok_or_else(|| FetchError::NotFound(format!("{what} for subnet {netuid}")))
    }
}

#[async_trait]
impl LedgerQuery for LedgerSnapshot {
    async fn module_registry(
        &self,
        netuid: u16,
    ) -> Result<BTreeMap<String, ModuleRecord>, FetchError> {
        self.modules
            .get(&netuid)
            .cloned()
            .map(registry_from_list)
            .ok_or_else(|| FetchError::NotFound(format!("module registry for subnet {netuid}")))
    }

    async fn immunity_period(&self, netuid: u16) -> Result<u64, FetchError> {
        Self::per_subnet(&self.immunity_period, netuid, "immunity period")
    }

    async fn tempo(&self, netuid: u16) -> Result<u64, FetchError> {
        Self::per_subnet(&self.tempo, netuid, "tempo")
    }

    async fn current_block(&self) -> Result<u64, FetchError> {
        Ok(self.block)
    }

    async fn subnet_params(&self) -> Result<BTreeMap<u16, SubnetParams>, FetchError> {
        Ok(self.subnets.clone())
    }

    async fn total_stake_by_subnet(&self) -> Result<BTreeMap<u16, u64>, FetchError> {
        Ok(self.total_stake.clone())
    }

    async fn unit_emission(&self) -> Result<u64, FetchError> {
        Ok(self.unit_emission)
    }

    async fn fee_params(&self) -> Result<FeeParams, FetchError> {
        Ok(self.fees)
    }
}
