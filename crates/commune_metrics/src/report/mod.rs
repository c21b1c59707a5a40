//! Response bodies: façade data run through the derivation layer.

use crate::chain::{FetchError, LedgerQuery};
use crate::commune::NetworkConfig;
use crate::compute::{
    aggregate_subnets, build_module_views, DeriveError, ModuleView, SubnetContext, SubnetView,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),
    #[error("derive: {0}")]
    Derive(#[from] DeriveError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModulesResponse {
    pub modules: Vec<ModuleView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubnetsResponse {
    pub subnets: Vec<SubnetView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AprResponse {
    pub apr: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEmissionResponse {
    pub daily_emission: u64,
}

/// Module views of one subnet.
pub async fn subnet_modules(
    ledger: &dyn LedgerQuery,
    config: &NetworkConfig,
    netuid: u16,
) -> Result<ModulesResponse, ReportError> {
    let (registry, immunity_period, tempo, current_block) = tokio::try_join!(
        ledger.module_registry(netuid),
        ledger.immunity_period(netuid),
        ledger.tempo(netuid),
        ledger.current_block(),
    )?;
    let ctx = SubnetContext {
        immunity_period,
        current_block,
        tempo,
    };
    debug!(netuid, ?ctx, modules = registry.len(), "building module views");
    Ok(ModulesResponse {
        modules: build_module_views(&registry, ctx, &config.excluded_module_fields),
    })
}

/// All subnets, emission-descending.
pub async fn subnets(
    ledger: &dyn LedgerQuery,
    config: &NetworkConfig,
) -> Result<SubnetsResponse, ReportError> {
    let (params, total_stake) =
        tokio::try_join!(ledger.subnet_params(), ledger.total_stake_by_subnet())?;
    Ok(SubnetsResponse {
        subnets: aggregate_subnets(&params, &total_stake, &config.bonds_ma_unit),
    })
}

/// Staker APR over the stake of every subnet.
pub async fn apr(
    ledger: &dyn LedgerQuery,
    config: &NetworkConfig,
) -> Result<AprResponse, ReportError> {
    let (unit_emission, total_stake, fees) = tokio::try_join!(
        ledger.unit_emission(),
        ledger.total_stake_by_subnet(),
        ledger.fee_params(),
    )?;
    let total_staked = total_stake
        .values()
        .try_fold(0u64, |acc, &v| acc.checked_add(v))
        .ok_or(DeriveError::Overflow("total stake"))?;
    let apr = config
        .reward_estimator()
        .annualized_return(unit_emission, total_staked, fees)?;
    Ok(AprResponse { apr })
}

pub async fn daily_emission(
    ledger: &dyn LedgerQuery,
    config: &NetworkConfig,
) -> Result<DailyEmissionResponse, ReportError> {
    let unit_emission = ledger.unit_emission().await?;
    Ok(DailyEmissionResponse {
        daily_emission: config.reward_estimator().daily_emission(unit_emission)?,
    })
}
