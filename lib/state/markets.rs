use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    math::fixed_point::{self, Decimal},
    state::Error,
    types::{MarketId, UniverseId},
};

/// Dispute-resolution lifecycle of a market
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportingState {
    PreReporting,
    DesignatedReporting,
    OpenReporting,
    CrowdsourcingDispute,
    AwaitingNextWindow,
    AwaitingFinalization,
    Finalized,
    Forking,
    AwaitingNoReport,
    AwaitingForkMigration,
}

impl ReportingState {
    /// The tentative outcome can no longer be disputed
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::AwaitingFinalization | Self::Finalized)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Market {
    pub id: MarketId,
    pub universe: UniverseId,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub num_ticks: u64,
    pub forking: bool,
    pub needs_migration: bool,
    pub reporting_state: ReportingState,
}

impl Market {
    pub fn tick_size(&self) -> Result<Decimal, fixed_point::Error> {
        fixed_point::tick_size(self.num_ticks, &self.min_price, &self.max_price)
    }

    pub fn is_finalized(&self) -> bool {
        self.reporting_state == ReportingState::Finalized
    }
}

#[derive(Clone)]
pub struct Dbs {
    markets: DatabaseUnique<SerdeBincode<MarketId>, SerdeBincode<Market>>,
    /// Secondary index: universe -> markets, in creation order
    markets_by_universe:
        DatabaseUnique<SerdeBincode<UniverseId>, SerdeBincode<Vec<MarketId>>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 2;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        let markets = DatabaseUnique::create(env, rwtxn, "markets")?;
        let markets_by_universe =
            DatabaseUnique::create(env, rwtxn, "markets_by_universe")?;
        Ok(Self {
            markets,
            markets_by_universe,
        })
    }

    pub fn try_get_market(
        &self,
        rotxn: &RoTxn,
        market: &MarketId,
    ) -> Result<Option<Market>, Error> {
        Ok(self.markets.try_get(rotxn, market)?)
    }

    pub fn get_market(
        &self,
        rotxn: &RoTxn,
        market: &MarketId,
    ) -> Result<Market, Error> {
        self.try_get_market(rotxn, market)?
            .ok_or(Error::MarketNotFound { market: *market })
    }

    /// Insert or overwrite a market, keeping the universe index in step.
    pub fn put_market(
        &self,
        rwtxn: &mut RwTxn,
        market: &Market,
    ) -> Result<(), Error> {
        let previous_universe = self
            .markets
            .try_get(rwtxn, &market.id)?
            .map(|previous| previous.universe);
        if previous_universe != Some(market.universe) {
            if let Some(previous_universe) = previous_universe {
                self.unindex_market(rwtxn, &previous_universe, &market.id)?;
            }
            let mut market_ids = self
                .markets_by_universe
                .try_get(rwtxn, &market.universe)?
                .unwrap_or_default();
            market_ids.push(market.id);
            self.markets_by_universe
                .put(rwtxn, &market.universe, &market_ids)?;
        }
        self.markets.put(rwtxn, &market.id, market)?;
        tracing::debug!(
            market = %market.id,
            universe = %market.universe,
            reporting_state = %market.reporting_state,
            "put market"
        );
        Ok(())
    }

    fn unindex_market(
        &self,
        rwtxn: &mut RwTxn,
        universe: &UniverseId,
        market: &MarketId,
    ) -> Result<(), Error> {
        let mut market_ids = self
            .markets_by_universe
            .try_get(rwtxn, universe)?
            .unwrap_or_default();
        market_ids.retain(|market_id| market_id != market);
        if market_ids.is_empty() {
            self.markets_by_universe.delete(rwtxn, universe)?;
        } else {
            self.markets_by_universe.put(rwtxn, universe, &market_ids)?;
        }
        Ok(())
    }

    pub fn markets_in_universe(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<Vec<Market>, Error> {
        let market_ids = self
            .markets_by_universe
            .try_get(rotxn, universe)?
            .unwrap_or_default();
        market_ids
            .iter()
            .map(|market_id| self.get_market(rotxn, market_id))
            .collect()
    }
}
