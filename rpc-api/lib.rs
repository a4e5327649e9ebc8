//! RPC API

use dispute_ledger::{
    reporting_fees::FeeDetails,
    state::{BlockStamp, Position},
    types::{Address, LogBatch, MarketId, UniverseId},
};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

#[rpc(client, server)]
pub trait Rpc {
    /// Apply the logs of one block, then refresh every position touched by
    /// an order fill. Returns the refreshed positions.
    #[method(name = "apply_log_batch")]
    async fn apply_log_batch(
        &self,
        batch: LogBatch,
    ) -> RpcResult<Vec<Position>>;

    /// Last block whose logs were applied
    #[method(name = "get_last_block")]
    async fn get_last_block(&self) -> RpcResult<Option<BlockStamp>>;

    /// Stored positions of an account in a market
    #[method(name = "get_positions")]
    async fn get_positions(
        &self,
        account: Address,
        market: MarketId,
    ) -> RpcResult<Vec<Position>>;

    /// Unclaimed fees and staked collateral of a reporter in a universe.
    /// Both arguments are required.
    #[method(name = "get_reporting_fees")]
    async fn get_reporting_fees(
        &self,
        reporter: Option<Address>,
        universe: Option<UniverseId>,
    ) -> RpcResult<FeeDetails>;

    /// Recompute the positions of an account in a market from the chain
    #[method(name = "refresh_position")]
    async fn refresh_position(
        &self,
        market: MarketId,
        account: Address,
    ) -> RpcResult<Vec<Position>>;

    /// Stop the node
    #[method(name = "stop")]
    async fn stop(&self);
}
