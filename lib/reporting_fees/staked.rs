//! Staked collateral of a reporter, bucketed by settlement outcome

use std::ops::Add;

use crate::{
    math::fixed_point::Decimal,
    state::{Market, participants::ParticipantRows},
    types::Amount,
};

/// Each stake lands in exactly one of `unclaimed_rep_staked`, `lost_rep`
/// and `unclaimed_fork_rep_staked`. `unclaimed_rep_earned` is the reward on
/// `unclaimed_rep_staked`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakedCollateral {
    pub unclaimed_rep_staked: Decimal,
    pub unclaimed_rep_earned: Decimal,
    pub lost_rep: Decimal,
    pub unclaimed_fork_rep_staked: Decimal,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Bucket {
    Fork,
    Winning,
    Lost,
}

impl Bucket {
    /// `None` while the market is neither forking nor finalized
    fn of(market: &Market, winning: bool) -> Option<Self> {
        if market.forking {
            Some(Self::Fork)
        } else if !market.is_finalized() {
            None
        } else if winning {
            Some(Self::Winning)
        } else {
            Some(Self::Lost)
        }
    }
}

impl StakedCollateral {
    fn with_stake(mut self, (bucket, amount): (Bucket, Amount)) -> Self {
        let amount = Decimal::from(amount);
        match bucket {
            Bucket::Fork => {
                self.unclaimed_fork_rep_staked =
                    self.unclaimed_fork_rep_staked + amount
            }
            Bucket::Winning => {
                // Winners earn half their stake from the losing pool
                self.unclaimed_rep_earned =
                    self.unclaimed_rep_earned + amount.half();
                self.unclaimed_rep_staked = self.unclaimed_rep_staked + amount;
            }
            Bucket::Lost => self.lost_rep = self.lost_rep + amount,
        }
        self
    }
}

impl Add for StakedCollateral {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            unclaimed_rep_staked: self.unclaimed_rep_staked
                + rhs.unclaimed_rep_staked,
            unclaimed_rep_earned: self.unclaimed_rep_earned
                + rhs.unclaimed_rep_earned,
            lost_rep: self.lost_rep + rhs.lost_rep,
            unclaimed_fork_rep_staked: self.unclaimed_fork_rep_staked
                + rhs.unclaimed_fork_rep_staked,
        }
    }
}

pub fn aggregate_staked_collateral(rows: &ParticipantRows) -> StakedCollateral {
    let crowdsourcers = rows
        .crowdsourcers
        .iter()
        .filter_map(|row| {
            Bucket::of(&row.market, row.winning)
                .map(|bucket| (bucket, row.amount_staked))
        })
        .fold(StakedCollateral::default(), StakedCollateral::with_stake);
    let initial_reports = rows
        .initial_reports
        .iter()
        .filter_map(|row| {
            Bucket::of(&row.market, row.winning)
                .map(|bucket| (bucket, row.initial_report.amount_staked))
        })
        .fold(StakedCollateral::default(), StakedCollateral::with_stake);
    crowdsourcers + initial_reports
}
