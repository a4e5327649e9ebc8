//! Protocol event logs consumed by the log processor

use serde::{Deserialize, Serialize};

use crate::{
    math::fixed_point::Decimal,
    state::ReportingState,
    types::{
        Address, Amount, CrowdsourcerId, FeeWindowId, InitialReporterId,
        MarketId, PayoutNumerators, TokenId, UniverseId,
    },
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum Log {
    #[serde(rename_all = "camelCase")]
    UniverseCreated {
        universe: UniverseId,
        parent_universe: Option<UniverseId>,
    },
    /// A market in `universe` escalated past normal dispute resolution
    #[serde(rename_all = "camelCase")]
    UniverseForked {
        universe: UniverseId,
        forking_market: MarketId,
    },
    #[serde(rename_all = "camelCase")]
    MarketCreated {
        market: MarketId,
        universe: UniverseId,
        min_price: Decimal,
        max_price: Decimal,
        num_ticks: u64,
    },
    #[serde(rename_all = "camelCase")]
    MarketMigrated {
        market: MarketId,
        original_universe: UniverseId,
        new_universe: UniverseId,
    },
    #[serde(rename_all = "camelCase")]
    FeeWindowCreated {
        fee_window: FeeWindowId,
        universe: UniverseId,
        fee_token: TokenId,
        start_time: u64,
        end_time: u64,
    },
    #[serde(rename_all = "camelCase")]
    InitialReportSubmitted {
        market: MarketId,
        initial_reporter: InitialReporterId,
        reporter: Address,
        fee_window: FeeWindowId,
        payout_numerators: PayoutNumerators,
        invalid: bool,
        amount_staked: Amount,
    },
    #[serde(rename_all = "camelCase")]
    DisputeCrowdsourcerCreated {
        market: MarketId,
        crowdsourcer: CrowdsourcerId,
        fee_window: FeeWindowId,
        payout_numerators: PayoutNumerators,
        invalid: bool,
        size: Amount,
    },
    #[serde(rename_all = "camelCase")]
    DisputeCrowdsourcerCompleted {
        market: MarketId,
        crowdsourcer: CrowdsourcerId,
    },
    #[serde(rename_all = "camelCase")]
    ReportingStateChanged {
        market: MarketId,
        reporting_state: ReportingState,
    },
    #[serde(rename_all = "camelCase")]
    MarketFinalized {
        market: MarketId,
        winning_payout_numerators: PayoutNumerators,
        invalid: bool,
    },
    /// All dispute participants of `market` withdrawn from settlement
    #[serde(rename_all = "camelCase")]
    MarketParticipantsDisavowed { market: MarketId },
    #[serde(rename_all = "camelCase")]
    InitialReporterRedeemed {
        market: MarketId,
        reporter: Address,
    },
    #[serde(rename_all = "camelCase")]
    TokensTransferred {
        token: TokenId,
        from: Address,
        to: Address,
        value: Amount,
    },
    #[serde(rename_all = "camelCase")]
    TokensMinted {
        token: TokenId,
        target: Address,
        amount: Amount,
    },
    #[serde(rename_all = "camelCase")]
    TokensBurned {
        token: TokenId,
        target: Address,
        amount: Amount,
    },
    #[serde(rename_all = "camelCase")]
    OrderFilled {
        market: MarketId,
        creator: Address,
        filler: Address,
    },
}

/// Logs of one block, applied atomically
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    pub block_number: u64,
    /// Block timestamp, drives fee window states
    pub timestamp: u64,
    pub logs: Vec<Log>,
}
