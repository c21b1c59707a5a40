//! Subnet ranking: parameters merged with total stake, ordered by emission.

use crate::commune::SubnetParams;
use crate::compute::units::to_display_stake;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys set by the aggregator itself; same-named pass-through fields are dropped.
const VIEW_FIELDS: [&str; 4] = ["netuid", "emission", "stake", "bonds_ma"];

/// `bonds_ma` as rendered in a subnet view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BondsMa {
    /// Zero, left as reported.
    Raw(u64),
    /// Display value with unit suffix, e.g. `"0.9 COMAI"`.
    Display(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubnetView {
    pub netuid: u16,
    pub emission: u64,
    /// Total stake on the subnet, display scale.
    pub stake: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonds_ma: Option<BondsMa>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One view per entry of `params`, ranked by emission (descending). Ties keep the
/// key order of `params`. Subnets missing from `total_stake` get zero stake.
pub fn aggregate_subnets(
    params: &BTreeMap<u16, SubnetParams>,
    total_stake: &BTreeMap<u16, u64>,
    bonds_ma_unit: &str,
) -> Vec<SubnetView> {
    let mut views: Vec<SubnetView> = params
        .iter()
        .map(|(&netuid, p)| {
            let mut fields = p.extra.clone();
            fields.retain(|name, _| !VIEW_FIELDS.contains(&name.as_str()));
            SubnetView {
                netuid,
                emission: p.emission,
                stake: to_display_stake(total_stake.get(&netuid).copied().unwrap_or(0)),
                bonds_ma: p.bonds_ma.map(|raw| render_bonds_ma(raw, bonds_ma_unit)),
                fields,
            }
        })
        .collect();
    // sort_by is stable.
    views.sort_by(|a, b| b.emission.cmp(&a.emission));
    views
}

fn render_bonds_ma(raw: u64, unit: &str) -> BondsMa {
    if raw == 0 {
        BondsMa::Raw(raw)
    } else {
        BondsMa::Display(format!("{} {}", to_display_stake(raw), unit))
    }
}
