//! Dispute participants: payouts, crowdsourcers and initial reports

use fallible_iterator::FallibleIterator;
use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    state::Error,
    types::{
        Address, Amount, CrowdsourcerId, FeeWindowId, InitialReporterId,
        MarketId, PayoutNumerators,
    },
};

/// Identifies one candidate result of a market
#[derive(
    Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct PayoutKey {
    pub market: MarketId,
    pub numerators: PayoutNumerators,
    pub invalid: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payout {
    pub key: PayoutKey,
    /// Set when the market finalizes on this payout
    pub winning: bool,
}

/// A pooled stake backing one payout during a dispute round
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Crowdsourcer {
    pub id: CrowdsourcerId,
    pub market: MarketId,
    pub fee_window: FeeWindowId,
    pub payout: PayoutKey,
    /// Target size of the pool
    pub size: Amount,
    pub completed: bool,
    pub disavowed: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InitialReport {
    pub initial_reporter: InitialReporterId,
    pub market: MarketId,
    pub reporter: Address,
    pub fee_window: FeeWindowId,
    pub payout: PayoutKey,
    pub amount_staked: Amount,
    pub redeemed: bool,
    pub disavowed: bool,
}

#[derive(Clone)]
pub struct Dbs {
    payouts: DatabaseUnique<SerdeBincode<PayoutKey>, SerdeBincode<Payout>>,
    crowdsourcers:
        DatabaseUnique<SerdeBincode<CrowdsourcerId>, SerdeBincode<Crowdsourcer>>,
    /// Secondary index: market -> crowdsourcers, in creation order
    crowdsourcers_by_market: DatabaseUnique<
        SerdeBincode<MarketId>,
        SerdeBincode<Vec<CrowdsourcerId>>,
    >,
    /// At most one initial report per market
    initial_reports:
        DatabaseUnique<SerdeBincode<MarketId>, SerdeBincode<InitialReport>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 4;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        Ok(Self {
            payouts: DatabaseUnique::create(env, rwtxn, "payouts")?,
            crowdsourcers: DatabaseUnique::create(env, rwtxn, "crowdsourcers")?,
            crowdsourcers_by_market: DatabaseUnique::create(
                env,
                rwtxn,
                "crowdsourcers_by_market",
            )?,
            initial_reports: DatabaseUnique::create(
                env,
                rwtxn,
                "initial_reports",
            )?,
        })
    }

    pub fn try_get_payout(
        &self,
        rotxn: &RoTxn,
        key: &PayoutKey,
    ) -> Result<Option<Payout>, Error> {
        Ok(self.payouts.try_get(rotxn, key)?)
    }

    /// Whether `key` is the payout its market finalized on. Unknown payouts
    /// are not winning.
    pub fn is_winning(
        &self,
        rotxn: &RoTxn,
        key: &PayoutKey,
    ) -> Result<bool, Error> {
        let winning = self
            .try_get_payout(rotxn, key)?
            .is_some_and(|payout| payout.winning);
        Ok(winning)
    }

    pub fn ensure_payout(
        &self,
        rwtxn: &mut RwTxn,
        key: &PayoutKey,
    ) -> Result<(), Error> {
        if self.payouts.try_get(rwtxn, key)?.is_none() {
            let payout = Payout {
                key: key.clone(),
                winning: false,
            };
            self.payouts.put(rwtxn, key, &payout)?;
        }
        Ok(())
    }

    /// Flag `winner` as the winning payout of its market; every other payout
    /// of the market is flagged as losing.
    pub fn set_winning_payout(
        &self,
        rwtxn: &mut RwTxn,
        winner: &PayoutKey,
    ) -> Result<(), Error> {
        self.ensure_payout(rwtxn, winner)?;
        let payouts: Vec<Payout> = self
            .payouts
            .iter(rwtxn)?
            .filter(|(key, _)| Ok(key.market == winner.market))
            .map(|(_, payout)| Ok(payout))
            .collect()?;
        for mut payout in payouts {
            payout.winning = payout.key == *winner;
            self.payouts.put(rwtxn, &payout.key.clone(), &payout)?;
        }
        Ok(())
    }

    pub fn try_get_crowdsourcer(
        &self,
        rotxn: &RoTxn,
        crowdsourcer: &CrowdsourcerId,
    ) -> Result<Option<Crowdsourcer>, Error> {
        Ok(self.crowdsourcers.try_get(rotxn, crowdsourcer)?)
    }

    pub fn get_crowdsourcer(
        &self,
        rotxn: &RoTxn,
        crowdsourcer: &CrowdsourcerId,
    ) -> Result<Crowdsourcer, Error> {
        self.try_get_crowdsourcer(rotxn, crowdsourcer)?.ok_or(
            Error::CrowdsourcerNotFound {
                crowdsourcer: *crowdsourcer,
            },
        )
    }

    pub fn put_crowdsourcer(
        &self,
        rwtxn: &mut RwTxn,
        crowdsourcer: &Crowdsourcer,
    ) -> Result<(), Error> {
        self.ensure_payout(rwtxn, &crowdsourcer.payout)?;
        let mut crowdsourcer_ids = self
            .crowdsourcers_by_market
            .try_get(rwtxn, &crowdsourcer.market)?
            .unwrap_or_default();
        if !crowdsourcer_ids.contains(&crowdsourcer.id) {
            crowdsourcer_ids.push(crowdsourcer.id);
            self.crowdsourcers_by_market.put(
                rwtxn,
                &crowdsourcer.market,
                &crowdsourcer_ids,
            )?;
        }
        self.crowdsourcers.put(rwtxn, &crowdsourcer.id, crowdsourcer)?;
        Ok(())
    }

    pub fn crowdsourcers_of_market(
        &self,
        rotxn: &RoTxn,
        market: &MarketId,
    ) -> Result<Vec<Crowdsourcer>, Error> {
        let crowdsourcer_ids = self
            .crowdsourcers_by_market
            .try_get(rotxn, market)?
            .unwrap_or_default();
        crowdsourcer_ids
            .iter()
            .map(|crowdsourcer| self.get_crowdsourcer(rotxn, crowdsourcer))
            .collect()
    }

    pub fn try_get_initial_report(
        &self,
        rotxn: &RoTxn,
        market: &MarketId,
    ) -> Result<Option<InitialReport>, Error> {
        Ok(self.initial_reports.try_get(rotxn, market)?)
    }

    pub fn get_initial_report(
        &self,
        rotxn: &RoTxn,
        market: &MarketId,
    ) -> Result<InitialReport, Error> {
        self.try_get_initial_report(rotxn, market)?
            .ok_or(Error::InitialReportNotFound { market: *market })
    }

    pub fn put_initial_report(
        &self,
        rwtxn: &mut RwTxn,
        initial_report: &InitialReport,
    ) -> Result<(), Error> {
        self.ensure_payout(rwtxn, &initial_report.payout)?;
        self.initial_reports
            .put(rwtxn, &initial_report.market, initial_report)?;
        Ok(())
    }
}
