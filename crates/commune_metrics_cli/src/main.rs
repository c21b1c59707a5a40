//! commune-metrics CLI: serve the HTTP API, query metrics, capture snapshots.

use clap::{Args, Parser, Subcommand};
use commune_metrics::chain::{LedgerQuery, LedgerSnapshot, NodeClient, NodeConfig};
use commune_metrics::report;
use commune_metrics::NetworkConfig;
use commune_metrics_server::{serve, AppState, ServerConfig, DEFAULT_PORT};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli))
}

#[derive(Parser)]
#[command(name = "commune-metrics")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Network metrics for Commune subnets: modules, subnet ranking, staking APR")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    /// Network config JSON (defaults: $COMMUNE_METRICS_CONFIG_PATH, ./config/network.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// Node JSON-RPC endpoint. It must serve the `subspace_*` decoded-storage
    /// methods; a stock Commune node does not, so use --snapshot against one.
    #[arg(long, global = true, default_value = commune_metrics::chain::DEFAULT_NODE_URL)]
    node_url: String,
    /// Request timeout against the node, in seconds.
    #[arg(long, global = true, default_value_t = commune_metrics::chain::REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Serve from a saved snapshot instead of the node.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Module views of one subnet.
    Modules(ModulesArgs),
    /// All subnets, ranked by emission.
    Subnets,
    /// Estimated staker APR (percent).
    Apr,
    /// Tokens emitted per day.
    DailyEmission,
    /// Capture the full ledger state into a snapshot file.
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,
}

#[derive(Args)]
struct ModulesArgs {
    #[arg(long)]
    netuid: u16,
}

#[derive(Args)]
struct SnapshotArgs {
    #[arg(long, default_value = "./data/snapshot.json")]
    out: PathBuf,
}

fn load_config(path: Option<&PathBuf>) -> Result<NetworkConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => NetworkConfig::load_from_path(p)?,
        None => NetworkConfig::load()?,
    };
    Ok(config)
}

fn open_ledger(args: &SourceArgs) -> Result<Arc<dyn LedgerQuery>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.snapshot {
        return Ok(Arc::new(LedgerSnapshot::from_path(path)?));
    }
    let config = NodeConfig {
        url: args.node_url.clone(),
        timeout_secs: args.timeout_secs,
        ..Default::default()
    };
    info!(url = %config.url, "using node");
    Ok(Arc::new(NodeClient::new(config)?))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_ref())?;
    let ledger = open_ledger(&cli.source)?;
    match cli.command {
        Command::Serve(args) => {
            if cli.source.snapshot.is_none() {
                warn!(
                    url = %cli.source.node_url,
                    "serving from a live node; data routes need the subspace_* rpc methods"
                );
            }
            let state = AppState::new(ledger, config);
            serve(ServerConfig { bind: args.bind }, state).await?;
        }
        Command::Modules(args) => {
            print_json(&report::subnet_modules(ledger.as_ref(), &config, args.netuid).await?)?;
        }
        Command::Subnets => print_json(&report::subnets(ledger.as_ref(), &config).await?)?,
        Command::Apr => print_json(&report::apr(ledger.as_ref(), &config).await?)?,
        Command::DailyEmission => {
            print_json(&report::daily_emission(ledger.as_ref(), &config).await?)?;
        }
        Command::Snapshot(args) => run_snapshot(ledger.as_ref(), args).await?,
    }
    Ok(())
}

async fn run_snapshot(
    ledger: &dyn LedgerQuery,
    args: SnapshotArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = LedgerSnapshot::capture(ledger).await?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.out, serde_json::to_string_pretty(&snapshot)?)?;
    info!(path = ?args.out, block = snapshot.block, "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn node_defaults_follow_library() {
        let cli = Cli::parse_from(["commune-metrics", "apr"]);
        assert_eq!(cli.source.node_url, commune_metrics::chain::DEFAULT_NODE_URL);
        assert_eq!(cli.source.timeout_secs, commune_metrics::chain::REQUEST_TIMEOUT_SECS);
        assert!(cli.source.snapshot.is_none());
    }

    #[test]
    fn node_url_help_points_to_snapshot() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("subspace_*"));
        assert!(help.contains("--snapshot"));
    }
}
