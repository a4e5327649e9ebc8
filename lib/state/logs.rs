//! Apply protocol log batches to the derived state

use hashlink::LinkedHashSet;
use sneed::RwTxn;

use crate::{
    state::{
        BlockStamp, Crowdsourcer, Error, FeeWindow, FeeWindowState,
        InitialReport, Market, PayoutKey, ReportingState, State, Universe,
    },
    types::{Address, Log, LogBatch, MarketId},
};

/// (market, account) pairs whose positions changed on chain
pub type PositionRefreshes = Vec<(MarketId, Address)>;

fn apply_log(
    state: &State,
    rwtxn: &mut RwTxn,
    timestamp: u64,
    log: &Log,
    refreshes: &mut LinkedHashSet<(MarketId, Address)>,
) -> Result<(), Error> {
    match log {
        Log::UniverseCreated {
            universe,
            parent_universe,
        } => {
            if state.universes().try_get_universe(rwtxn, universe)?.is_some() {
                tracing::warn!(%universe, "ignoring duplicate universe");
                return Ok(());
            }
            let universe = Universe {
                id: *universe,
                parent: *parent_universe,
                forking_market: None,
            };
            state.universes().put_universe(rwtxn, &universe)?;
        }
        Log::UniverseForked {
            universe,
            forking_market,
        } => {
            let mut universe_row =
                state.universes().get_universe(rwtxn, universe)?;
            if universe_row.is_forking() {
                tracing::warn!(%universe, "ignoring repeated fork");
                return Ok(());
            }
            let mut market = state.markets().get_market(rwtxn, forking_market)?;
            market.forking = true;
            market.reporting_state = ReportingState::Forking;
            state.markets().put_market(rwtxn, &market)?;
            universe_row.forking_market = Some(*forking_market);
            state.universes().put_universe(rwtxn, &universe_row)?;
            for mut other in
                state.markets().markets_in_universe(rwtxn, universe)?
            {
                if other.id == *forking_market
                    || other.is_finalized()
                    || other.needs_migration
                {
                    continue;
                }
                other.needs_migration = true;
                state.markets().put_market(rwtxn, &other)?;
            }
            tracing::info!(%universe, %forking_market, "universe forked");
        }
        Log::MarketCreated {
            market,
            universe,
            min_price,
            max_price,
            num_ticks,
        } => {
            if let Some(existing) =
                state.markets().try_get_market(rwtxn, market)?
            {
                if existing.min_price != *min_price
                    || existing.max_price != *max_price
                    || existing.num_ticks != *num_ticks
                {
                    tracing::warn!(
                        %market,
                        "refusing to change price bounds of existing market"
                    );
                }
                return Ok(());
            }
            state.universes().get_universe(rwtxn, universe)?;
            let market = Market {
                id: *market,
                universe: *universe,
                min_price: min_price.clone(),
                max_price: max_price.clone(),
                num_ticks: *num_ticks,
                forking: false,
                needs_migration: false,
                reporting_state: ReportingState::PreReporting,
            };
            // Reject bounds that have no tick size
            market.tick_size()?;
            state.markets().put_market(rwtxn, &market)?;
        }
        Log::MarketMigrated {
            market,
            original_universe,
            new_universe,
        } => {
            let mut market_row = state.markets().get_market(rwtxn, market)?;
            if market_row.universe != *original_universe {
                return Err(Error::MarketMigrationMismatch {
                    market: *market,
                    expected: market_row.universe,
                    actual: *original_universe,
                });
            }
            state.universes().get_universe(rwtxn, new_universe)?;
            market_row.universe = *new_universe;
            market_row.needs_migration = false;
            state.markets().put_market(rwtxn, &market_row)?;
        }
        Log::FeeWindowCreated {
            fee_window,
            universe,
            fee_token,
            start_time,
            end_time,
        } => {
            state.universes().get_universe(rwtxn, universe)?;
            let fee_window = FeeWindow {
                id: *fee_window,
                universe: *universe,
                fee_token: *fee_token,
                start_time: *start_time,
                end_time: *end_time,
                state: FeeWindowState::at(timestamp, *start_time, *end_time),
            };
            state.fee_windows().put_fee_window(rwtxn, &fee_window)?;
        }
        Log::InitialReportSubmitted {
            market,
            initial_reporter,
            reporter,
            fee_window,
            payout_numerators,
            invalid,
            amount_staked,
        } => {
            state.markets().get_market(rwtxn, market)?;
            if state
                .fee_windows()
                .try_get_fee_window(rwtxn, fee_window)?
                .is_none()
            {
                return Err(Error::FeeWindowNotFound {
                    fee_window: *fee_window,
                });
            }
            let initial_report = InitialReport {
                initial_reporter: *initial_reporter,
                market: *market,
                reporter: *reporter,
                fee_window: *fee_window,
                payout: PayoutKey {
                    market: *market,
                    numerators: payout_numerators.clone(),
                    invalid: *invalid,
                },
                amount_staked: *amount_staked,
                redeemed: false,
                disavowed: false,
            };
            state
                .reporting()
                .put_initial_report(rwtxn, &initial_report)?;
        }
        Log::DisputeCrowdsourcerCreated {
            market,
            crowdsourcer,
            fee_window,
            payout_numerators,
            invalid,
            size,
        } => {
            state.markets().get_market(rwtxn, market)?;
            if state
                .fee_windows()
                .try_get_fee_window(rwtxn, fee_window)?
                .is_none()
            {
                return Err(Error::FeeWindowNotFound {
                    fee_window: *fee_window,
                });
            }
            let crowdsourcer = Crowdsourcer {
                id: *crowdsourcer,
                market: *market,
                fee_window: *fee_window,
                payout: PayoutKey {
                    market: *market,
                    numerators: payout_numerators.clone(),
                    invalid: *invalid,
                },
                size: *size,
                completed: false,
                disavowed: false,
            };
            state.reporting().put_crowdsourcer(rwtxn, &crowdsourcer)?;
        }
        Log::DisputeCrowdsourcerCompleted {
            market,
            crowdsourcer,
        } => {
            let mut crowdsourcer =
                state.reporting().get_crowdsourcer(rwtxn, crowdsourcer)?;
            if crowdsourcer.completed {
                tracing::warn!(
                    crowdsourcer = %crowdsourcer.id,
                    "ignoring repeated completion"
                );
                return Ok(());
            }
            if crowdsourcer.market != *market {
                tracing::warn!(
                    crowdsourcer = %crowdsourcer.id,
                    %market,
                    "crowdsourcer completed under a different market"
                );
            }
            crowdsourcer.completed = true;
            state.reporting().put_crowdsourcer(rwtxn, &crowdsourcer)?;
        }
        Log::ReportingStateChanged {
            market,
            reporting_state,
        } => {
            let mut market = state.markets().get_market(rwtxn, market)?;
            market.reporting_state = *reporting_state;
            state.markets().put_market(rwtxn, &market)?;
        }
        Log::MarketFinalized {
            market,
            winning_payout_numerators,
            invalid,
        } => {
            let mut market_row = state.markets().get_market(rwtxn, market)?;
            market_row.reporting_state = ReportingState::Finalized;
            state.markets().put_market(rwtxn, &market_row)?;
            let winner = PayoutKey {
                market: *market,
                numerators: winning_payout_numerators.clone(),
                invalid: *invalid,
            };
            state.reporting().set_winning_payout(rwtxn, &winner)?;
        }
        Log::MarketParticipantsDisavowed { market } => {
            state.markets().get_market(rwtxn, market)?;
            for mut crowdsourcer in
                state.reporting().crowdsourcers_of_market(rwtxn, market)?
            {
                crowdsourcer.disavowed = true;
                state.reporting().put_crowdsourcer(rwtxn, &crowdsourcer)?;
            }
            if let Some(mut initial_report) =
                state.reporting().try_get_initial_report(rwtxn, market)?
            {
                initial_report.disavowed = true;
                state
                    .reporting()
                    .put_initial_report(rwtxn, &initial_report)?;
            }
        }
        Log::InitialReporterRedeemed { market, reporter } => {
            let mut initial_report =
                state.reporting().get_initial_report(rwtxn, market)?;
            if initial_report.reporter != *reporter {
                tracing::debug!(
                    %market,
                    %reporter,
                    original = %initial_report.reporter,
                    "initial report redeemed by transferee"
                );
            }
            initial_report.redeemed = true;
            state
                .reporting()
                .put_initial_report(rwtxn, &initial_report)?;
        }
        Log::TokensTransferred {
            token,
            from,
            to,
            value,
        } => {
            state.balances().transfer(rwtxn, token, from, to, *value)?;
        }
        Log::TokensMinted {
            token,
            target,
            amount,
        } => {
            state.balances().mint(rwtxn, token, target, *amount)?;
        }
        Log::TokensBurned {
            token,
            target,
            amount,
        } => {
            state.balances().burn(rwtxn, token, target, *amount)?;
        }
        Log::OrderFilled {
            market,
            creator,
            filler,
        } => {
            state.markets().get_market(rwtxn, market)?;
            refreshes.insert((*market, *creator));
            refreshes.insert((*market, *filler));
        }
    }
    Ok(())
}

/// Apply every log of `batch`, then move fee windows to their state at the
/// batch timestamp. Returns the positions that must be refreshed once the
/// transaction commits.
pub fn apply_batch(
    state: &State,
    rwtxn: &mut RwTxn,
    batch: &LogBatch,
) -> Result<PositionRefreshes, Error> {
    if let Some(last) = state.try_get_last_block(rwtxn)?
        && batch.block_number <= last.block_number
    {
        return Err(Error::StaleBatch {
            block_number: batch.block_number,
            last: last.block_number,
        });
    }
    let mut refreshes = LinkedHashSet::new();
    for log in &batch.logs {
        apply_log(state, rwtxn, batch.timestamp, log, &mut refreshes)?;
    }
    let advanced = state
        .fee_windows()
        .advance_states(rwtxn, batch.timestamp)?;
    state.put_last_block(
        rwtxn,
        &BlockStamp {
            block_number: batch.block_number,
            timestamp: batch.timestamp,
        },
    )?;
    tracing::info!(
        block_number = batch.block_number,
        logs = batch.logs.len(),
        fee_windows_advanced = advanced,
        position_refreshes = refreshes.len(),
        "applied log batch"
    );
    Ok(refreshes.into_iter().collect())
}
