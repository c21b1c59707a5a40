//! JSON-RPC client for a Commune node, with rate limiting and retries.

use crate::chain::normalize::{parse_block_number, NormalizeError};
use crate::chain::query::LedgerQuery;
use crate::commune::{FeeParams, ModuleRecord, SubnetParams};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub const DEFAULT_NODE_URL: &str = "https://commune-api-node-2.communeai.net";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
const RATE_LIMIT_MS: u64 = 100;
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 500;

/// RPC method names the client calls. Only `chain_getHeader` is a standard
/// Substrate method; the `subspace_*` names expect a node that serves decoded
/// storage maps. Point the client elsewhere, or use a snapshot, when it does not.
pub mod methods {
    pub const CHAIN_GET_HEADER: &str = "chain_getHeader";
    pub const MODULE_REGISTRY: &str = "subspace_getModuleRegistry";
    pub const IMMUNITY_PERIOD: &str = "subspace_getImmunityPeriod";
    pub const TEMPO: &str = "subspace_getTempo";
    pub const SUBNET_PARAMS: &str = "subspace_getSubnetParams";
    pub const TOTAL_STAKE_BY_SUBNET: &str = "subspace_getTotalStakeBySubnet";
    pub const UNIT_EMISSION: &str = "subspace_getUnitEmission";
    pub const FEE_PARAMS: &str = "subspace_getFeeParams";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NODE_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            rate_limit_ms: RATE_LIMIT_MS,
            max_retries: MAX_RETRIES,
            retry_backoff_ms: RETRY_BACKOFF_MS,
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("node url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported node url scheme: {0}")]
    UrlScheme(String),
    #[error("api error: status {0} body {1}")]
    Api(u16, String),
    #[error("rpc {method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("rpc {0}: response carries neither result nor error")]
    EmptyResponse(String),
    /// The node answered with a payload that does not match the record shape,
    /// including negative magnitudes.
    #[error("decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("normalize: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// True when the node sent data that could not be accepted.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Decode { .. } | FetchError::Normalize(_))
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct Header {
    number: String,
}

/// Node client. Owns one HTTP connection pool; share it behind an `Arc`.
pub struct NodeClient {
    config: NodeConfig,
    client: reqwest::Client,
    last_request: tokio::sync::Mutex<Option<OffsetDateTime>>,
    request_count: AtomicU64,
}

impl NodeClient {
    pub fn new(config: NodeConfig) -> Result<Self, FetchError> {
        let url = url::Url::parse(&config.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UrlScheme(url.scheme().to_string()));
        }
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            client,
            last_request: tokio::sync::Mutex::new(None),
            request_count: AtomicU64::new(0),
        })
    }

    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = (OffsetDateTime::now_utc() - prev).whole_milliseconds();
            let need = i128::from(self.config.rate_limit_ms);
            if elapsed < need {
                let ms = u64::try_from(need - elapsed).unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
        *last = Some(OffsetDateTime::now_utc());
    }

    /// Call `method` and decode its `result` into `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, FetchError> {
        let result = self.call_raw(method, params).await?;
        serde_json::from_value(result).map_err(|source| FetchError::Decode {
            context: method.to_string(),
            source,
        })
    }

    async fn call_raw(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        self.rate_limit().await;
        let id = self.request_count.fetch_add(1, Ordering::Relaxed) + 1;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            debug!(method, id, attempt, "rpc call");
            match self.client.post(&self.config.url).json(&request).send().await {
                Ok(r) => {
                    let status = r.status();
                    let body = r.text().await.unwrap_or_default();
                    if !status.is_success() {
                        last_err = Some(FetchError::Api(status.as_u16(), body));
                        if status.is_server_error() && attempt < self.config.max_retries {
                            self.backoff(method, attempt).await;
                            continue;
                        }
                        break;
                    }
                    return decode_envelope(method, &body);
                }
                Err(e) => {
                    last_err = Some(FetchError::Request(e));
                    if attempt < self.config.max_retries {
                        self.backoff(method, attempt).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| FetchError::EmptyResponse(method.to_string())))
    }

    async fn backoff(&self, method: &str, attempt: u32) {
        let ms = self.config.retry_backoff_ms.saturating_mul(1 << attempt.min(16));
        warn!(method, attempt, ms, "retry after error");
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn decode_envelope(method: &str, body: &str) -> Result<Value, FetchError> {
    let envelope: RpcResponse = serde_json::from_str(body).map_err(|source| FetchError::Decode {
        context: method.to_string(),
        source,
    })?;
    if let Some(err) = envelope.error {
        return Err(FetchError::Rpc {
            method: method.to_string(),
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| FetchError::EmptyResponse(method.to_string()))
}

/// Key a module list by module key.
pub(crate) fn registry_from_list(records: Vec<ModuleRecord>) -> BTreeMap<String, ModuleRecord> {
    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

#[async_trait]
impl LedgerQuery for NodeClient {
    async fn module_registry(
        &self,
        netuid: u16,
    ) -> Result<BTreeMap<String, ModuleRecord>, FetchError> {
        let records: Vec<ModuleRecord> = self
            .call(methods::MODULE_REGISTRY, serde_json::json!([netuid]))
            .await?;
        info!(netuid, count = records.len(), "module_registry");
        Ok(registry_from_list(records))
    }

    async fn immunity_period(&self, netuid: u16) -> Result<u64, FetchError> {
        self.call(methods::IMMUNITY_PERIOD, serde_json::json!([netuid]))
            .await
    }

    async fn tempo(&self, netuid: u16) -> Result<u64, FetchError> {
        self.call(methods::TEMPO, serde_json::json!([netuid])).await
    }

    async fn current_block(&self) -> Result<u64, FetchError> {
        let header: Header = self
            .call(methods::CHAIN_GET_HEADER, serde_json::json!([]))
            .await?;
        Ok(parse_block_number(&header.number)?)
    }

    async fn subnet_params(&self) -> Result<BTreeMap<u16, SubnetParams>, FetchError> {
        let params: BTreeMap<u16, SubnetParams> = self
            .call(methods::SUBNET_PARAMS, serde_json::json!([]))
            .await?;
        info!(count = params.len(), "subnet_params");
        Ok(params)
    }

    async fn total_stake_by_subnet(&self) -> Result<BTreeMap<u16, u64>, FetchError> {
        self.call(methods::TOTAL_STAKE_BY_SUBNET, serde_json::json!([]))
            .await
    }

    async fn unit_emission(&self) -> Result<u64, FetchError> {
        self.call(methods::UNIT_EMISSION, serde_json::json!([])).await
    }

    async fn fee_params(&self) -> Result<FeeParams, FetchError> {
        self.call(methods::FEE_PARAMS, serde_json::json!([])).await
    }
}
