//! Row builders for aggregation tests

use crate::{
    math::fixed_point::Decimal,
    state::{
        Crowdsourcer, FeeWindowState, InitialReport, Market, PayoutKey,
        ReportingState,
        participants::{CrowdsourcerRow, FeePool, InitialReportRow},
    },
    types::{
        Address, Amount, CrowdsourcerId, FeeWindowId, InitialReporterId,
        MarketId, PayoutNumerators, TokenId, UniverseId,
    },
};

pub const UNIVERSE: UniverseId = UniverseId(Address([0xAA; 20]));
pub const FEE_WINDOW: FeeWindowId = FeeWindowId(Address([0xFE; 20]));
pub const FEE_TOKEN: TokenId = TokenId(Address([0xFD; 20]));
pub const REPORTER: Address = Address([0xEE; 20]);

/// An open market in [`UNIVERSE`]
pub fn market(n: u8) -> Market {
    Market {
        id: MarketId(Address([n; 20])),
        universe: UNIVERSE,
        min_price: Decimal::zero(),
        max_price: Decimal::from_integer(1),
        num_ticks: 1000,
        forking: false,
        needs_migration: false,
        reporting_state: ReportingState::OpenReporting,
    }
}

pub fn settled(mut market: Market) -> Market {
    market.reporting_state = ReportingState::Finalized;
    market
}

pub fn forking(mut market: Market) -> Market {
    market.forking = true;
    market.reporting_state = ReportingState::Forking;
    market
}

fn payout(market: &Market) -> PayoutKey {
    PayoutKey {
        market: market.id,
        numerators: PayoutNumerators(vec![0, 1000]),
        invalid: false,
    }
}

/// Reporter holds `staked` of crowdsourcer `n`, which is filled to `staked`
pub fn crowdsourcer_row(n: u8, market: &Market, staked: u128) -> CrowdsourcerRow {
    CrowdsourcerRow {
        crowdsourcer: Crowdsourcer {
            id: CrowdsourcerId(Address([n; 20])),
            market: market.id,
            fee_window: FEE_WINDOW,
            payout: payout(market),
            size: Amount(staked),
            completed: true,
            disavowed: false,
        },
        market: market.clone(),
        amount_staked: Amount(staked),
        winning: false,
        holdings: Default::default(),
    }
}

pub fn initial_report_row(
    n: u8,
    market: &Market,
    staked: u128,
) -> InitialReportRow {
    InitialReportRow {
        initial_report: InitialReport {
            initial_reporter: InitialReporterId(Address([n; 20])),
            market: market.id,
            reporter: REPORTER,
            fee_window: FEE_WINDOW,
            payout: payout(market),
            amount_staked: Amount(staked),
            redeemed: false,
            disavowed: false,
        },
        market: market.clone(),
        winning: false,
        holdings: Default::default(),
    }
}

/// A past [`FEE_WINDOW`] pool
pub fn fee_pool(
    fee_token_supply: u128,
    participation_token_supply: u128,
    cash: u128,
) -> FeePool {
    FeePool {
        fee_window: FEE_WINDOW,
        state: FeeWindowState::Past,
        fee_token: FEE_TOKEN,
        fee_token_supply: Amount(fee_token_supply),
        participation_token_supply: Amount(participation_token_supply),
        cash: Amount(cash),
    }
}
