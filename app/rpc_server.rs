use std::net::SocketAddr;

use dispute_ledger::{
    node::{self, Node},
    reporting_fees::FeeDetails,
    state::{self, BlockStamp, Position},
    types::{Address, LogBatch, MarketId, UniverseId},
};
use dispute_ledger_app_rpc_api::RpcServer;
use jsonrpsee::{
    core::{RpcResult, async_trait},
    server::{RpcServiceBuilder, Server, ServerHandle},
    types::{ErrorObject, error::INVALID_PARAMS_CODE},
};
use tower_http::{
    request_id::{
        MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
    },
    trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
};

use crate::{app::App, chain_client::HttpChainClient};

// Application error codes
const NOT_FOUND_CODE: i32 = -32004;
const CHAIN_UNAVAILABLE_CODE: i32 = -32005;

fn custom_err_msg(
    code: i32,
    err_msg: impl Into<String>,
) -> ErrorObject<'static> {
    ErrorObject::owned(code, err_msg.into(), Option::<()>::None)
}

fn custom_err(error: node::Error) -> ErrorObject<'static> {
    let code = match error.state_error() {
        Some(state::Error::MissingArgument(_)) => INVALID_PARAMS_CODE,
        Some(
            state::Error::UniverseNotFound { .. }
            | state::Error::MarketNotFound { .. },
        ) => NOT_FOUND_CODE,
        Some(state::Error::CollaboratorUnavailable(_)) => {
            CHAIN_UNAVAILABLE_CODE
        }
        _ => -1,
    };
    let error = anyhow::Error::from(error);
    custom_err_msg(code, format!("{error:#}"))
}

pub struct RpcServerImpl {
    app: App,
}

impl RpcServerImpl {
    #[inline(always)]
    fn node(&self) -> &Node<HttpChainClient> {
        &self.app.node
    }
}

#[async_trait]
impl RpcServer for RpcServerImpl {
    async fn apply_log_batch(
        &self,
        batch: LogBatch,
    ) -> RpcResult<Vec<Position>> {
        self.node().apply_log_batch(batch).await.map_err(custom_err)
    }

    async fn get_last_block(&self) -> RpcResult<Option<BlockStamp>> {
        self.node().try_get_last_block().map_err(custom_err)
    }

    async fn get_positions(
        &self,
        account: Address,
        market: MarketId,
    ) -> RpcResult<Vec<Position>> {
        self.node().get_positions(account, market).map_err(custom_err)
    }

    async fn get_reporting_fees(
        &self,
        reporter: Option<Address>,
        universe: Option<UniverseId>,
    ) -> RpcResult<FeeDetails> {
        self.node()
            .get_reporting_fees(reporter, universe)
            .await
            .map_err(custom_err)
    }

    async fn refresh_position(
        &self,
        market: MarketId,
        account: Address,
    ) -> RpcResult<Vec<Position>> {
        self.node()
            .refresh_position(market, account)
            .await
            .map_err(custom_err)
    }

    async fn stop(&self) {
        self.app.request_shutdown();
    }
}

#[derive(Clone, Debug)]
struct RequestIdMaker;

impl MakeRequestId for RequestIdMaker {
    fn make_request_id<B>(
        &mut self,
        _: &http::Request<B>,
    ) -> Option<RequestId> {
        use uuid::Uuid;
        let id = Uuid::new_v4();
        let id = id.as_simple();
        let id = format!("req_{id}");

        let Ok(header_value) = http::HeaderValue::from_str(&id) else {
            return None;
        };

        Some(RequestId::new(header_value))
    }
}

pub async fn run_server(
    app: App,
    rpc_addr: SocketAddr,
) -> anyhow::Result<(SocketAddr, ServerHandle)> {
    const REQUEST_ID_HEADER: &str = "x-request-id";

    let tracer = tower::ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            http::HeaderName::from_static(REQUEST_ID_HEADER),
            RequestIdMaker,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(http::HeaderName::from_static(REQUEST_ID_HEADER))
                        .and_then(|h| h.to_str().ok())
                        .filter(|s| !s.is_empty());

                    tracing::span!(
                        tracing::Level::DEBUG,
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                })
                .on_request(())
                .on_eos(())
                .on_response(
                    DefaultOnResponse::new().level(tracing::Level::INFO),
                )
                .on_failure(
                    DefaultOnFailure::new().level(tracing::Level::ERROR),
                ),
        )
        .layer(PropagateRequestIdLayer::new(http::HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .into_inner();

    let http_middleware = tower::ServiceBuilder::new().layer(tracer);
    let rpc_middleware = RpcServiceBuilder::new().rpc_logger(1024);

    let server = Server::builder()
        .set_http_middleware(http_middleware)
        .set_rpc_middleware(rpc_middleware)
        .build(rpc_addr)
        .await?;

    let addr = server.local_addr()?;
    let handle = server.start(RpcServerImpl { app }.into_rpc());
    Ok((addr, handle))
}
