//! commune_metrics: read-through network metrics for Commune subnets.
//!
//! Turns raw node records into classified module views, ranked subnet views, and
//! staking reward estimates. Read-only; no state of its own.

pub mod chain;
pub mod commune;
pub mod compute;
pub mod report;

pub use chain::{FetchError, LedgerQuery, LedgerSnapshot, NodeClient, NodeConfig};
pub use commune::{FeeParams, ModuleRecord, NetworkConfig, SubnetParams};
pub use compute::{DeriveError, ModuleType, ModuleView, SubnetView};
pub use report::{
    AprResponse, DailyEmissionResponse, ModulesResponse, ReportError, SubnetsResponse,
};
