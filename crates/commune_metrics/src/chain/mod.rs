//! Ledger access: the query façade, a JSON-RPC node client and file snapshots.

pub(crate) mod fetch;
mod normalize;
mod query;
mod snapshot;

pub use fetch::{
    methods, FetchError, NodeClient, NodeConfig, DEFAULT_NODE_URL, REQUEST_TIMEOUT_SECS,
};
pub use normalize::{parse_block_number, NormalizeError};
pub use query::LedgerQuery;
pub use snapshot::LedgerSnapshot;
