use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use url::Url;

const DEFAULT_RPC_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 6050);

const DEFAULT_CHAIN_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory for the ledger store. Defaults to
    /// `dispute_ledger` under the platform data dir.
    #[arg(long, short)]
    datadir: Option<PathBuf>,
    /// JSON-RPC endpoint of the blockchain node
    #[arg(default_value = "http://localhost:8545", long)]
    chain_rpc_url: Url,
    /// Timeout for blockchain client requests in seconds
    #[arg(default_value_t = DEFAULT_CHAIN_TIMEOUT_SECS, long)]
    chain_timeout_secs: u64,
    /// Directory to write rolling log files to. Logs only go to stdout if
    /// unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Log as JSON
    #[arg(long)]
    log_json: bool,
    /// Log level, overridden by `RUST_LOG`
    #[arg(default_value_t = tracing::Level::INFO, long)]
    log_level: tracing::Level,
    /// Socket address to serve the RPC API on
    #[arg(default_value_t = DEFAULT_RPC_ADDR, long, short)]
    rpc_addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub chain_rpc_url: Url,
    pub chain_timeout: Duration,
    pub datadir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_json: bool,
    pub log_level: tracing::Level,
    pub rpc_addr: SocketAddr,
}

impl Cli {
    pub fn get_config(self) -> anyhow::Result<Config> {
        let datadir = match self.datadir {
            Some(datadir) => datadir,
            None => dirs::data_dir()
                .context("failed to resolve default data dir")?
                .join("dispute_ledger"),
        };
        Ok(Config {
            chain_rpc_url: self.chain_rpc_url,
            chain_timeout: Duration::from_secs(self.chain_timeout_secs),
            datadir,
            log_dir: self.log_dir,
            log_json: self.log_json,
            log_level: self.log_level,
            rpc_addr: self.rpc_addr,
        })
    }
}
