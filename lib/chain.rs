//! Blockchain client consumed by the projector

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
    math::fixed_point::Decimal,
    types::{Address, MarketId, TokenId},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("blockchain client returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("blockchain client request failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Protocol contracts deployed on the connected network
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    /// Token fees are paid in
    pub cash: TokenId,
}

/// Read access to on-chain state that is not derived from logs.
///
/// Implementations must not retry; callers own the retry policy.
pub trait ChainClient: Send + Sync + 'static {
    /// Raw per-outcome position of `account` in `market`, in on-chain
    /// units. Index `i` of the result is outcome `i`.
    fn get_position_in_market(
        &self,
        market: &MarketId,
        account: &Address,
        tick_size: &Decimal,
    ) -> impl Future<Output = Result<Vec<i128>, Error>> + Send;

    fn contract_addresses(
        &self,
    ) -> impl Future<Output = Result<ContractAddresses, Error>> + Send;
}
