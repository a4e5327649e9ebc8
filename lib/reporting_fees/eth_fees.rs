//! Pro-rata shares of fee window cash pools

use crate::{
    math::fixed_point::Decimal,
    state::{
        Error,
        participants::{FeePool, ParticipantHoldings, ParticipantRows},
    },
    types::{Address, Amount, FeeWindowId},
};

/// Fees claimable by the reporter through one dispute participant
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParticipantEthFee {
    pub participant: Address,
    pub eth_fees: Decimal,
    /// Participant belongs to the forking market
    pub fork: bool,
}

/// Fees claimable by the reporter through participation tokens
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParticipationTokenEthFee {
    pub fee_window: FeeWindowId,
    pub participation_tokens: Amount,
    pub eth_fees: Decimal,
}

/// `balance`'s share of the pool's cash. Zero if nothing was issued.
pub fn pool_share(balance: Amount, pool: &FeePool) -> Result<Decimal, Error> {
    let share = Decimal::ratio(balance, pool.total_supply()?);
    Ok(share * Decimal::from(pool.cash))
}

fn participant_fees(
    rows: &ParticipantRows,
    holdings: &ParticipantHoldings,
) -> Result<Decimal, Error> {
    let mut fees = Decimal::from(holdings.cash);
    for holding in &holdings.fee_tokens {
        let pool = rows.fee_pool(&holding.fee_window).ok_or(
            Error::FeeWindowNotFound {
                fee_window: holding.fee_window,
            },
        )?;
        fees = fees + pool_share(holding.balance, pool)?;
    }
    Ok(fees)
}

/// Fees owed to the reporter by each crowdsourcer and initial reporter it
/// participates in. A participant's fees are split by the reporter's share
/// of the participant's size.
pub fn participant_eth_fees(
    rows: &ParticipantRows,
) -> Result<Vec<ParticipantEthFee>, Error> {
    let crowdsourcers = rows
        .crowdsourcers
        .iter()
        .filter(|row| row.is_participant())
        .map(|row| -> Result<_, Error> {
            let fees = participant_fees(rows, &row.holdings)?;
            let reporter_share =
                Decimal::ratio(row.amount_staked, row.crowdsourcer.size);
            Ok(ParticipantEthFee {
                participant: row.crowdsourcer.id.into(),
                eth_fees: reporter_share * fees,
                fork: row.market.forking,
            })
        });
    let initial_reports = rows
        .initial_reports
        .iter()
        .filter(|row| row.is_participant())
        .map(|row| -> Result<_, Error> {
            // All fees go to the reporter, none when nothing was staked
            let eth_fees = if row.initial_report.amount_staked.is_zero() {
                Decimal::zero()
            } else {
                participant_fees(rows, &row.holdings)?
            };
            Ok(ParticipantEthFee {
                participant: row.initial_report.initial_reporter.into(),
                eth_fees,
                fork: row.market.forking,
            })
        });
    crowdsourcers.chain(initial_reports).collect()
}

pub fn participation_token_eth_fees(
    rows: &ParticipantRows,
) -> Result<Vec<ParticipationTokenEthFee>, Error> {
    rows.participation_tokens
        .iter()
        .map(|row| -> Result<_, Error> {
            let pool = rows.fee_pool(&row.fee_window).ok_or(
                Error::FeeWindowNotFound {
                    fee_window: row.fee_window,
                },
            )?;
            Ok(ParticipationTokenEthFee {
                fee_window: row.fee_window,
                participation_tokens: row.participation_tokens,
                eth_fees: pool_share(row.participation_tokens, pool)?,
            })
        })
        .collect()
}
