//! Unclaimed reporting fees and staked collateral of a reporter

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use sneed::RoTxn;

use crate::{
    math::fixed_point::Decimal,
    state::{Error, State, participants::ParticipantRows},
    types::{Address, Amount, FeeWindowId, TokenId, UniverseId},
};

pub mod classifier;
pub mod eth_fees;
pub mod staked;

#[cfg(test)]
pub(crate) mod test_utils;

pub use classifier::{
    CrowdsourcerState, ForkedMarket, InitialReporterState, MarketParticipants,
    NonforkedMarket, classify_participants,
};
pub use eth_fees::{
    ParticipantEthFee, ParticipationTokenEthFee, participant_eth_fees,
    participation_token_eth_fees,
};
pub use staked::{StakedCollateral, aggregate_staked_collateral};

/// Totals in base units, rounded down
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTotals {
    pub unclaimed_eth: Amount,
    pub unclaimed_rep_staked: Amount,
    pub unclaimed_rep_earned: Amount,
    pub unclaimed_fork_eth: Amount,
    pub unclaimed_fork_rep_staked: Amount,
    pub lost_rep: Amount,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDetails {
    pub total: FeeTotals,
    /// Sorted, distinct windows the reporter holds participation tokens in
    pub fee_windows: Vec<FeeWindowId>,
    pub forked_market: Option<ForkedMarket>,
    pub nonforked_markets: Vec<NonforkedMarket>,
}

/// Fee details of one (reporter, universe) row set.
///
/// The four aggregations are independent and run in parallel. The first
/// failure aborts the whole computation.
pub fn fee_details(rows: &ParticipantRows) -> Result<FeeDetails, Error> {
    let ((participant_fees, participation_fees), (staked, participants)) =
        rayon::join(
            || {
                rayon::join(
                    || participant_eth_fees(rows),
                    || participation_token_eth_fees(rows),
                )
            },
            || {
                rayon::join(
                    || aggregate_staked_collateral(rows),
                    || classify_participants(rows),
                )
            },
        );
    let participant_fees = participant_fees?;
    let participation_fees = participation_fees?;
    let (fork_fees, nonfork_fees): (Vec<_>, Vec<_>) =
        participant_fees.iter().partition(|fee| fee.fork);
    let participation_total: Decimal =
        participation_fees.iter().map(|fee| &fee.eth_fees).sum();
    let nonfork_total: Decimal =
        nonfork_fees.iter().map(|fee| &fee.eth_fees).sum();
    let fork_total: Decimal = fork_fees.iter().map(|fee| &fee.eth_fees).sum();
    // Participation fees are not specific to either side of a fork, so both
    // totals include them
    let total = FeeTotals {
        unclaimed_eth: (nonfork_total + participation_total.clone())
            .floor_to_amount()?,
        unclaimed_rep_staked: staked.unclaimed_rep_staked.floor_to_amount()?,
        unclaimed_rep_earned: staked.unclaimed_rep_earned.floor_to_amount()?,
        unclaimed_fork_eth: (fork_total + participation_total)
            .floor_to_amount()?,
        unclaimed_fork_rep_staked: staked
            .unclaimed_fork_rep_staked
            .floor_to_amount()?,
        lost_rep: staked.lost_rep.floor_to_amount()?,
    };
    let fee_windows = participation_fees
        .iter()
        .map(|fee| fee.fee_window)
        .sorted()
        .dedup()
        .collect();
    Ok(FeeDetails {
        total,
        fee_windows,
        forked_market: participants.forked_market,
        nonforked_markets: participants.nonforked_markets,
    })
}

/// Unclaimed fees and stakes of `reporter` in `universe`, computed from the
/// snapshot `rotxn` reads. Fees are paid in `cash`.
pub fn get_reporting_fees(
    state: &State,
    rotxn: &RoTxn,
    reporter: Option<Address>,
    universe: Option<UniverseId>,
    cash: &TokenId,
) -> Result<FeeDetails, Error> {
    let reporter = reporter.ok_or(Error::MissingArgument("reporter"))?;
    let universe = universe.ok_or(Error::MissingArgument("universe"))?;
    let universe = state.resolve_universe(rotxn, &universe)?;
    let rows = state.participant_rows(rotxn, &reporter, &universe, cash)?;
    let details = fee_details(&rows)?;
    tracing::debug!(
        %reporter,
        %universe,
        unclaimed_eth = %details.total.unclaimed_eth,
        unclaimed_fork_eth = %details.total.unclaimed_fork_eth,
        "computed reporting fees"
    );
    Ok(details)
}
