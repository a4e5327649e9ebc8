use std::sync::Arc;

use dispute_ledger::node::{self, Node};
use jsonrpsee::core::ClientError;
use tokio::sync::Notify;

use crate::{chain_client::HttpChainClient, cli::Config};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build blockchain client")]
    ChainClient(#[from] ClientError),
    #[error("node error")]
    Node(#[from] node::Error),
}

#[derive(Clone)]
pub struct App {
    pub node: Node<HttpChainClient>,
    shutdown: Arc<Notify>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let client =
            HttpChainClient::new(&config.chain_rpc_url, config.chain_timeout)?;
        tracing::info!(
            chain_rpc_url = %config.chain_rpc_url,
            "connecting to blockchain client"
        );
        let node = Node::new(&config.datadir, client).await?;
        Ok(Self {
            node,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Ask the app to shut down
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once shutdown was requested
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await
    }
}
