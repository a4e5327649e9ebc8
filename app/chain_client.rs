//! Blockchain client over JSON-RPC

use std::{future::Future, time::Duration};

use dispute_ledger::{
    chain::{self, ChainClient, ContractAddresses},
    math::fixed_point::Decimal,
    types::{Address, MarketId},
};
use jsonrpsee::{
    core::{ClientError, client::ClientT},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::Serialize;
use url::Url;

const GET_POSITION_IN_MARKET: &str = "trading_getPositionInMarket";
const GET_CONTRACT_ADDRESSES: &str = "contracts_getAddresses";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionQuery<'a> {
    market: &'a MarketId,
    address: &'a Address,
    tick_size: &'a Decimal,
}

fn transport_err(err: ClientError) -> chain::Error {
    chain::Error::Transport(Box::new(err))
}

/// Raw positions are decimal strings, one per outcome
fn parse_raw_positions(raw: &[String]) -> Result<Vec<i128>, chain::Error> {
    raw.iter()
        .map(|amount| {
            amount.parse().map_err(|_| {
                chain::Error::MalformedResponse(format!(
                    "position `{amount}` is not an integer"
                ))
            })
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct HttpChainClient(HttpClient);

impl HttpChainClient {
    pub fn new(url: &Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .set_max_logging_length(1024)
            .build(url)?;
        Ok(Self(client))
    }
}

impl ChainClient for HttpChainClient {
    fn get_position_in_market(
        &self,
        market: &MarketId,
        account: &Address,
        tick_size: &Decimal,
    ) -> impl Future<Output = Result<Vec<i128>, chain::Error>> + Send {
        let params = rpc_params![PositionQuery {
            market,
            address: account,
            tick_size,
        }];
        async move {
            let raw: Vec<String> = self
                .0
                .request(GET_POSITION_IN_MARKET, params)
                .await
                .map_err(transport_err)?;
            parse_raw_positions(&raw)
        }
    }

    fn contract_addresses(
        &self,
    ) -> impl Future<Output = Result<ContractAddresses, chain::Error>> + Send
    {
        async move {
            self.0
                .request(GET_CONTRACT_ADDRESSES, rpc_params![])
                .await
                .map_err(transport_err)
        }
    }
}
