//! Module role classification from incentive and dividends.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Validator,
    Miner,
    Inactive,
}

/// Classify a module. Priority: no scores at all -> inactive; incentive strictly
/// above dividends -> miner; everything else (ties included) -> validator.
pub fn classify(incentive: u64, dividends: u64) -> ModuleType {
    if incentive == 0 && dividends == 0 {
        ModuleType::Inactive
    } else if incentive > dividends {
        ModuleType::Miner
    } else {
        ModuleType::Validator
    }
}
