use std::{net::Ipv4Addr, path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dispute_ledger::types::{Address, LogBatch, MarketId, UniverseId};
use dispute_ledger_app_rpc_api::RpcClient;
use http::HeaderMap;
use jsonrpsee::{core::client::ClientT, http_client::HttpClientBuilder};
use tracing_subscriber::layer::SubscriberExt as _;
use url::{Host, Url};

#[derive(Clone, Debug, Subcommand)]
#[command(arg_required_else_help(true))]
pub enum Command {
    /// Apply a log batch read from a JSON file, or from stdin if no file
    /// is given
    ApplyLogBatch { file: Option<PathBuf> },
    /// Get the last block whose logs were applied
    GetLastBlock,
    /// Get stored positions of an account in a market
    GetPositions {
        #[arg(long)]
        account: Address,
        #[arg(long)]
        market: MarketId,
    },
    /// Get unclaimed reporting fees and staked collateral of a reporter
    GetReportingFees {
        #[arg(long)]
        reporter: Option<Address>,
        #[arg(long)]
        universe: Option<UniverseId>,
    },
    /// Recompute the positions of an account in a market from the chain
    RefreshPosition {
        #[arg(long)]
        market: MarketId,
        #[arg(long)]
        account: Address,
    },
    /// Stop the node
    Stop,
}

const DEFAULT_RPC_HOST: Host = Host::Ipv4(Ipv4Addr::LOCALHOST);

const DEFAULT_RPC_PORT: u16 = 6050;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Host used for requests to the RPC server
    #[arg(default_value_t = DEFAULT_RPC_HOST, long, value_parser = Host::parse)]
    pub rpc_host: Host,
    /// Port used for requests to the RPC server
    #[arg(default_value_t = DEFAULT_RPC_PORT, long)]
    pub rpc_port: u16,
    /// Timeout for RPC requests in seconds.
    #[arg(default_value_t = DEFAULT_TIMEOUT_SECS, long = "timeout")]
    timeout_secs: u64,
    #[arg(short, long, help = "Enable verbose HTTP output")]
    pub verbose: bool,
}

impl Cli {
    fn rpc_url(&self) -> anyhow::Result<Url> {
        let url =
            Url::parse(&format!("http://{}:{}", self.rpc_host, self.rpc_port))?;
        Ok(url)
    }
}

fn read_log_batch(file: Option<PathBuf>) -> anyhow::Result<LogBatch> {
    let batch = match file {
        Some(path) => {
            let file = std::fs::File::open(&path).with_context(|| {
                format!("failed to open `{}`", path.display())
            })?;
            serde_json::from_reader(std::io::BufReader::new(file))?
        }
        None => serde_json::from_reader(std::io::stdin().lock())?,
    };
    Ok(batch)
}

/// Handle a command, returning CLI output
async fn handle_command<RpcClient>(
    rpc_client: &RpcClient,
    command: Command,
) -> anyhow::Result<String>
where
    RpcClient: ClientT + Sync,
{
    Ok(match command {
        Command::ApplyLogBatch { file } => {
            let batch = read_log_batch(file)?;
            let positions = rpc_client.apply_log_batch(batch).await?;
            serde_json::to_string_pretty(&positions)?
        }
        Command::GetLastBlock => {
            let last_block = rpc_client.get_last_block().await?;
            serde_json::to_string_pretty(&last_block)?
        }
        Command::GetPositions { account, market } => {
            let positions = rpc_client.get_positions(account, market).await?;
            serde_json::to_string_pretty(&positions)?
        }
        Command::GetReportingFees { reporter, universe } => {
            let details =
                rpc_client.get_reporting_fees(reporter, universe).await?;
            serde_json::to_string_pretty(&details)?
        }
        Command::RefreshPosition { market, account } => {
            let positions =
                rpc_client.refresh_position(market, account).await?;
            serde_json::to_string_pretty(&positions)?
        }
        Command::Stop => {
            let () = rpc_client.stop().await?;
            String::default()
        }
    })
}

fn set_tracing_subscriber() -> anyhow::Result<()> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stdout()))
        .with_file(true)
        .with_line_number(true);

    let subscriber = tracing_subscriber::registry().with(stdout_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<String> {
        if self.verbose {
            set_tracing_subscriber()?;
        }
        let request_id = uuid::Uuid::new_v4().as_simple().to_string();
        tracing::info!(%request_id);
        let builder = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(self.timeout_secs))
            .set_max_logging_length(1024)
            .set_headers(HeaderMap::from_iter([(
                http::header::HeaderName::from_static("x-request-id"),
                http::header::HeaderValue::from_str(&request_id)?,
            )]));
        let client = builder.build(self.rpc_url()?)?;
        let result = handle_command(&client, self.command).await?;
        Ok(result)
    }
}
