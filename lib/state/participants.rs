//! Joined row sets for reporting-fee aggregation.
//!
//! Every row is loaded from one read transaction, so the aggregations that
//! consume a [`ParticipantRows`] all see the same snapshot.

use serde::{Deserialize, Serialize};
use sneed::RoTxn;

use crate::{
    state::{
        Error, State,
        fee_windows::{FeeWindow, FeeWindowState},
        markets::Market,
        reporting::{Crowdsourcer, InitialReport},
    },
    types::{Address, Amount, FeeWindowId, TokenId, UniverseId},
};

/// A crowdsourcer the reporter holds stake in
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CrowdsourcerRow {
    pub crowdsourcer: Crowdsourcer,
    pub market: Market,
    /// Reporter's balance of the crowdsourcer token
    pub amount_staked: Amount,
    /// Whether the backed payout is the one the market finalized on
    pub winning: bool,
    /// Holdings of the crowdsourcer contract
    pub holdings: ParticipantHoldings,
}

/// An unredeemed initial report submitted by the reporter
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InitialReportRow {
    pub initial_report: InitialReport,
    pub market: Market,
    pub winning: bool,
    /// Holdings of the initial reporter contract
    pub holdings: ParticipantHoldings,
}

/// Participant rows are the ones contributing to fee and participant
/// classification: settled markets and disavowed stakes.
fn counts_as_participant(market: &Market, disavowed: bool) -> bool {
    market.reporting_state.is_settled() || disavowed
}

impl CrowdsourcerRow {
    pub fn is_participant(&self) -> bool {
        counts_as_participant(&self.market, self.crowdsourcer.disavowed)
    }
}

impl InitialReportRow {
    pub fn is_participant(&self) -> bool {
        counts_as_participant(&self.market, self.initial_report.disavowed)
    }
}

/// Supplies and cash of one fee window
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FeePool {
    pub fee_window: FeeWindowId,
    pub state: FeeWindowState,
    pub fee_token: TokenId,
    pub fee_token_supply: Amount,
    /// Supply of the window's own token
    pub participation_token_supply: Amount,
    /// Cash held by the window contract
    pub cash: Amount,
}

impl FeePool {
    pub fn total_supply(&self) -> Result<Amount, Error> {
        Ok(self
            .fee_token_supply
            .checked_add(self.participation_token_supply)?)
    }
}

/// Fee tokens of one window held by a participant contract
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FeeTokenHolding {
    pub fee_window: FeeWindowId,
    pub balance: Amount,
}

/// Cash and fee-token holdings of a participant contract
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ParticipantHoldings {
    pub cash: Amount,
    pub fee_tokens: Vec<FeeTokenHolding>,
}

/// The reporter's participation tokens in a window
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ParticipationTokenRow {
    pub fee_window: FeeWindowId,
    pub participation_tokens: Amount,
}

/// Everything the reporting-fee aggregations read for one
/// (reporter, universe) pair
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ParticipantRows {
    pub crowdsourcers: Vec<CrowdsourcerRow>,
    pub initial_reports: Vec<InitialReportRow>,
    pub forking_market: Option<Market>,
    /// Fee pools of every window in the universe
    pub fee_pools: Vec<FeePool>,
    pub participation_tokens: Vec<ParticipationTokenRow>,
}

impl ParticipantRows {
    pub fn fee_pool(&self, fee_window: &FeeWindowId) -> Option<&FeePool> {
        self.fee_pools
            .iter()
            .find(|pool| pool.fee_window == *fee_window)
    }
}

impl State {
    fn fee_pool(
        &self,
        rotxn: &RoTxn,
        fee_window: &FeeWindow,
        cash: &TokenId,
    ) -> Result<FeePool, Error> {
        let balances = self.balances();
        Ok(FeePool {
            fee_window: fee_window.id,
            state: fee_window.state,
            fee_token: fee_window.fee_token,
            fee_token_supply: balances.supply(rotxn, &fee_window.fee_token)?,
            participation_token_supply: balances
                .supply(rotxn, &fee_window.id.into())?,
            cash: balances.balance(rotxn, cash, &fee_window.id.into())?,
        })
    }

    /// Fee pools of every window in `universe`
    pub fn fee_pools(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
        cash: &TokenId,
    ) -> Result<Vec<FeePool>, Error> {
        self.fee_windows()
            .fee_windows_in_universe(rotxn, universe)?
            .iter()
            .map(|fee_window| self.fee_pool(rotxn, fee_window, cash))
            .collect()
    }

    /// Cash and fee tokens held by a participant contract. Only fee tokens
    /// of `fee_pools` are considered.
    pub fn participant_holdings(
        &self,
        rotxn: &RoTxn,
        participant: &Address,
        fee_pools: &[FeePool],
        cash: &TokenId,
    ) -> Result<ParticipantHoldings, Error> {
        let mut fee_tokens = Vec::new();
        for pool in fee_pools {
            let balance =
                self.balances().balance(rotxn, &pool.fee_token, participant)?;
            if balance > pool.fee_token_supply {
                return Err(Error::InconsistentSupply {
                    token: pool.fee_token,
                    balance,
                    supply: pool.fee_token_supply,
                });
            }
            if !balance.is_zero() {
                fee_tokens.push(FeeTokenHolding {
                    fee_window: pool.fee_window,
                    balance,
                });
            }
        }
        Ok(ParticipantHoldings {
            cash: self.balances().balance(rotxn, cash, participant)?,
            fee_tokens,
        })
    }

    /// Crowdsourcers of `markets` in which `reporter` holds a nonzero stake.
    /// A zero balance means the stake was redeemed.
    pub fn crowdsourcer_rows(
        &self,
        rotxn: &RoTxn,
        reporter: &Address,
        markets: &[Market],
        fee_pools: &[FeePool],
        cash: &TokenId,
    ) -> Result<Vec<CrowdsourcerRow>, Error> {
        let mut rows = Vec::new();
        for market in markets {
            for crowdsourcer in self
                .reporting()
                .crowdsourcers_of_market(rotxn, &market.id)?
            {
                let amount_staked = self.balances().balance(
                    rotxn,
                    &crowdsourcer.id.into(),
                    reporter,
                )?;
                if amount_staked.is_zero() {
                    continue;
                }
                if amount_staked > crowdsourcer.size {
                    return Err(Error::InconsistentSupply {
                        token: crowdsourcer.id.into(),
                        balance: amount_staked,
                        supply: crowdsourcer.size,
                    });
                }
                let winning =
                    self.reporting().is_winning(rotxn, &crowdsourcer.payout)?;
                let holdings = self.participant_holdings(
                    rotxn,
                    &crowdsourcer.id.into(),
                    fee_pools,
                    cash,
                )?;
                rows.push(CrowdsourcerRow {
                    crowdsourcer,
                    market: market.clone(),
                    amount_staked,
                    winning,
                    holdings,
                });
            }
        }
        Ok(rows)
    }

    /// Unredeemed initial reports submitted by `reporter` in `markets`
    pub fn initial_report_rows(
        &self,
        rotxn: &RoTxn,
        reporter: &Address,
        markets: &[Market],
        fee_pools: &[FeePool],
        cash: &TokenId,
    ) -> Result<Vec<InitialReportRow>, Error> {
        let mut rows = Vec::new();
        for market in markets {
            let Some(initial_report) =
                self.reporting().try_get_initial_report(rotxn, &market.id)?
            else {
                continue;
            };
            if initial_report.reporter != *reporter || initial_report.redeemed
            {
                continue;
            }
            let winning = self
                .reporting()
                .is_winning(rotxn, &initial_report.payout)?;
            let holdings = self.participant_holdings(
                rotxn,
                &initial_report.initial_reporter.into(),
                fee_pools,
                cash,
            )?;
            rows.push(InitialReportRow {
                initial_report,
                market: market.clone(),
                winning,
                holdings,
            });
        }
        Ok(rows)
    }

    /// The reporter's participation tokens in past windows
    pub fn participation_token_rows(
        &self,
        rotxn: &RoTxn,
        reporter: &Address,
        fee_pools: &[FeePool],
    ) -> Result<Vec<ParticipationTokenRow>, Error> {
        let mut rows = Vec::new();
        for pool in fee_pools {
            if pool.state != FeeWindowState::Past {
                continue;
            }
            let token = TokenId::from(pool.fee_window);
            let balance = self.balances().balance(rotxn, &token, reporter)?;
            if balance.is_zero() {
                continue;
            }
            if balance > pool.participation_token_supply {
                return Err(Error::InconsistentSupply {
                    token,
                    balance,
                    supply: pool.participation_token_supply,
                });
            }
            rows.push(ParticipationTokenRow {
                fee_window: pool.fee_window,
                participation_tokens: balance,
            });
        }
        Ok(rows)
    }

    /// Load every row the reporting-fee aggregations need for
    /// (`reporter`, `universe`). `cash` is the token fees are paid in.
    pub fn participant_rows(
        &self,
        rotxn: &RoTxn,
        reporter: &Address,
        universe: &UniverseId,
        cash: &TokenId,
    ) -> Result<ParticipantRows, Error> {
        let fee_pools = self.fee_pools(rotxn, universe, cash)?;
        let markets = self.markets().markets_in_universe(rotxn, universe)?;
        let crowdsourcers = self
            .crowdsourcer_rows(rotxn, reporter, &markets, &fee_pools, cash)?;
        let initial_reports = self
            .initial_report_rows(rotxn, reporter, &markets, &fee_pools, cash)?;
        let forking_market =
            markets.iter().find(|market| market.forking).cloned();
        let participation_tokens =
            self.participation_token_rows(rotxn, reporter, &fee_pools)?;
        tracing::trace!(
            %reporter,
            %universe,
            crowdsourcers = crowdsourcers.len(),
            initial_reports = initial_reports.len(),
            participation_tokens = participation_tokens.len(),
            "loaded participant rows"
        );
        Ok(ParticipantRows {
            crowdsourcers,
            initial_reports,
            forking_market,
            fee_pools,
            participation_tokens,
        })
    }
}
