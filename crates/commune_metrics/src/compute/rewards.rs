//! Network-wide staking rewards: daily emission and staker APR.

use crate::commune::FeeParams;
use crate::compute::units::NANO_PER_UNIT;
use crate::compute::DeriveError;
use serde::{Deserialize, Serialize};

/// Target block time of the network.
pub const BLOCK_TIME_SECS: u64 = 8;

/// Blocks produced per day at [`BLOCK_TIME_SECS`].
pub const BLOCKS_PER_DAY: u64 = 24 * 60 * 60 / BLOCK_TIME_SECS;

pub const DAYS_PER_YEAR: u64 = 365;

/// Stakers receive one half of the daily emission.
const STAKER_SHARE_DIVISOR: u128 = 2;

const MAX_FEE_PCT: u16 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEstimator {
    pub blocks_per_day: u64,
}

impl Default for RewardEstimator {
    fn default() -> Self {
        Self {
            blocks_per_day: BLOCKS_PER_DAY,
        }
    }
}

impl RewardEstimator {
    pub fn new(blocks_per_day: u64) -> Self {
        Self { blocks_per_day }
    }

    /// Tokens emitted per day, display scale, rounded up.
    pub fn daily_emission(&self, unit_emission_per_block: u64) -> Result<u64, DeriveError> {
        let per_day = u128::from(unit_emission_per_block) * u128::from(self.blocks_per_day);
        u64::try_from(per_day.div_ceil(u128::from(NANO_PER_UNIT)))
            .map_err(|_| DeriveError::Overflow("daily_emission"))
    }

    /// Annualized staker return in whole percent, rounded up.
    ///
    /// `blocks_per_day * display(unit) / 2 * (1 - fees / 100) * 365 / display(staked) * 100`.
    /// The nano scale cancels between numerator and denominator and the percent
    /// factors cancel against the fee fraction, so the result is computed exactly as
    /// `ceil(blocks_per_day * unit * (100 - fees) * 365 / (2 * staked))`.
    pub fn annualized_return(
        &self,
        unit_emission_per_block: u64,
        total_staked_raw: u64,
        fees: FeeParams,
    ) -> Result<u64, DeriveError> {
        let net_pct = net_of_fees_pct(fees)?;
        if total_staked_raw == 0 {
            return Err(DeriveError::NoStake);
        }
        let numerator = u128::from(self.blocks_per_day)
            .checked_mul(u128::from(unit_emission_per_block))
            .and_then(|v| v.checked_mul(u128::from(net_pct)))
            .and_then(|v| v.checked_mul(u128::from(DAYS_PER_YEAR)))
            .ok_or(DeriveError::Overflow("annualized_return"))?;
        let denominator = STAKER_SHARE_DIVISOR * u128::from(total_staked_raw);
        u64::try_from(numerator.div_ceil(denominator))
            .map_err(|_| DeriveError::Overflow("annualized_return"))
    }
}

/// `100 - delegation - founder`, after range checks on each fee.
fn net_of_fees_pct(fees: FeeParams) -> Result<u16, DeriveError> {
    for (name, value) in [
        ("delegation_fee_pct", fees.delegation_fee_pct),
        ("founder_fee_pct", fees.founder_fee_pct),
    ] {
        if value > MAX_FEE_PCT {
            return Err(DeriveError::InvalidFee { name, value });
        }
    }
    let combined = u32::from(fees.delegation_fee_pct) + u32::from(fees.founder_fee_pct);
    if combined > u32::from(MAX_FEE_PCT) {
        return Err(DeriveError::CombinedFee(combined));
    }
    Ok(MAX_FEE_PCT - fees.delegation_fee_pct - fees.founder_fee_pct)
}
