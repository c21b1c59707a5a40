//! Derivation layer: unit conversion, classification, immunity, module views,
//! subnet ranking, reward estimates. Pure and synchronous.

pub mod classify;
mod error;
pub mod immunity;
pub mod module_view;
pub mod rewards;
pub mod subnets;
pub mod units;

pub use classify::{classify, ModuleType};
pub use error::DeriveError;
pub use immunity::is_immune;
pub use module_view::{
    build_module_view, build_module_views, ExcludedFields, ModuleView, SubnetContext,
};
pub use rewards::{RewardEstimator, BLOCKS_PER_DAY};
pub use subnets::{aggregate_subnets, BondsMa, SubnetView};
