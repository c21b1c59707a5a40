//! Raw on-chain records as served by the node.
//!
//! Magnitudes are unsigned: a negative stake or score in a node payload fails to
//! decode instead of reaching the derivation layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One registered module on a subnet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub key: String,
    /// Total stake (nano).
    pub stake: u64,
    /// Per-block emission (nano).
    pub emission: u64,
    pub incentive: u64,
    pub dividends: u64,
    /// Registration block height.
    pub regblock: u64,
    /// Everything else the node reports (`uid`, `name`, `address`, `stake_from`,
    /// `metadata`, `last_update`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters of one subnet, keyed by netuid in the surrounding map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubnetParams {
    /// Emission share used for ranking.
    pub emission: u64,
    /// Bonds moving average (nano), absent on subnets that never set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonds_ma: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Global fee parameters, in whole percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    pub delegation_fee_pct: u16,
    pub founder_fee_pct: u16,
}
