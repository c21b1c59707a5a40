//! HTTP surface for commune_metrics: module views, subnet ranking, APR and daily
//! emission as JSON.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use commune_metrics::report::{self, ReportError};
use commune_metrics::{
    AprResponse, DailyEmissionResponse, DeriveError, FetchError, LedgerQuery, ModulesResponse,
    NetworkConfig, SubnetsResponse,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 7860;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared by every handler; the ledger handle is the only way to reach the node.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerQuery>,
    pub config: Arc<NetworkConfig>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerQuery>, config: NetworkConfig) -> Self {
        Self {
            ledger,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/subnets", get(subnets))
        .route("/subnets/:netuid/modules", get(subnet_modules))
        .route("/subnet/:netuid/modules", get(subnet_modules))
        .route("/apr", get(apr))
        .route("/daily-emission", get(daily_emission))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "serving");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "Hello": "World" }))
}

async fn subnet_modules(
    State(state): State<AppState>,
    netuid: Result<Path<u16>, PathRejection>,
) -> Result<Json<ModulesResponse>, ApiError> {
    let Path(netuid) = netuid?;
    let resp = report::subnet_modules(state.ledger.as_ref(), &state.config, netuid).await?;
    Ok(Json(resp))
}

async fn subnets(State(state): State<AppState>) -> Result<Json<SubnetsResponse>, ApiError> {
    Ok(Json(report::subnets(state.ledger.as_ref(), &state.config).await?))
}

async fn apr(State(state): State<AppState>) -> Result<Json<AprResponse>, ApiError> {
    Ok(Json(report::apr(state.ledger.as_ref(), &state.config).await?))
}

async fn daily_emission(
    State(state): State<AppState>,
) -> Result<Json<DailyEmissionResponse>, ApiError> {
    Ok(Json(
        report::daily_emission(state.ledger.as_ref(), &state.config).await?,
    ))
}

/// Error body: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let (status, code) = match &err {
            ReportError::Derive(e) if e.is_undefined() => {
                (StatusCode::UNPROCESSABLE_ENTITY, "undefined")
            }
            ReportError::Derive(DeriveError::Overflow(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "overflow")
            }
            ReportError::Derive(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input"),
            ReportError::Fetch(FetchError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ReportError::Fetch(e) if e.is_malformed() => {
                (StatusCode::BAD_GATEWAY, "malformed_upstream_data")
            }
            ReportError::Fetch(_) => (StatusCode::SERVICE_UNAVAILABLE, "data_unavailable"),
        };
        warn!(status = status.as_u16(), code, error = %err, "request failed");
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection, "bad path parameter");
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
