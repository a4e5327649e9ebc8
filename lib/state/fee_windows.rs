use fallible_iterator::FallibleIterator;
use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    state::Error,
    types::{FeeWindowId, TokenId, UniverseId},
};

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
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeWindowState {
    Past,
    Current,
    Future,
}

impl FeeWindowState {
    /// Windows cover `[start_time, end_time)`
    pub fn at(timestamp: u64, start_time: u64, end_time: u64) -> Self {
        if timestamp < start_time {
            Self::Future
        } else if timestamp < end_time {
            Self::Current
        } else {
            Self::Past
        }
    }
}

/// A dispute round. The window contract doubles as its participation token.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FeeWindow {
    pub id: FeeWindowId,
    pub universe: UniverseId,
    pub fee_token: TokenId,
    pub start_time: u64,
    pub end_time: u64,
    pub state: FeeWindowState,
}

#[derive(Clone)]
pub struct Dbs {
    fee_windows:
        DatabaseUnique<SerdeBincode<FeeWindowId>, SerdeBincode<FeeWindow>>,
    /// Secondary index: universe -> fee windows, in creation order
    fee_windows_by_universe:
        DatabaseUnique<SerdeBincode<UniverseId>, SerdeBincode<Vec<FeeWindowId>>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 2;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        let fee_windows = DatabaseUnique::create(env, rwtxn, "fee_windows")?;
        let fee_windows_by_universe =
            DatabaseUnique::create(env, rwtxn, "fee_windows_by_universe")?;
        Ok(Self {
            fee_windows,
            fee_windows_by_universe,
        })
    }

    pub fn try_get_fee_window(
        &self,
        rotxn: &RoTxn,
        fee_window: &FeeWindowId,
    ) -> Result<Option<FeeWindow>, Error> {
        Ok(self.fee_windows.try_get(rotxn, fee_window)?)
    }

    pub fn put_fee_window(
        &self,
        rwtxn: &mut RwTxn,
        fee_window: &FeeWindow,
    ) -> Result<(), Error> {
        let mut fee_window_ids = self
            .fee_windows_by_universe
            .try_get(rwtxn, &fee_window.universe)?
            .unwrap_or_default();
        if !fee_window_ids.contains(&fee_window.id) {
            fee_window_ids.push(fee_window.id);
            self.fee_windows_by_universe.put(
                rwtxn,
                &fee_window.universe,
                &fee_window_ids,
            )?;
        }
        self.fee_windows.put(rwtxn, &fee_window.id, fee_window)?;
        Ok(())
    }

    pub fn has_fee_window(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<bool, Error> {
        Ok(!self.fee_windows_in_universe(rotxn, universe)?.is_empty())
    }

    pub fn fee_windows_in_universe(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<Vec<FeeWindow>, Error> {
        let fee_window_ids = self
            .fee_windows_by_universe
            .try_get(rotxn, universe)?
            .unwrap_or_default();
        let mut fee_windows = Vec::with_capacity(fee_window_ids.len());
        for fee_window_id in fee_window_ids {
            // A re-created window may have moved to another universe
            if let Some(fee_window) =
                self.fee_windows.try_get(rotxn, &fee_window_id)?
                && fee_window.universe == *universe
            {
                fee_windows.push(fee_window);
            }
        }
        Ok(fee_windows)
    }

    /// Recompute every window's state at `timestamp`. Returns the number of
    /// windows that changed state.
    pub fn advance_states(
        &self,
        rwtxn: &mut RwTxn,
        timestamp: u64,
    ) -> Result<usize, Error> {
        let stale: Vec<FeeWindow> = self
            .fee_windows
            .iter(rwtxn)?
            .filter(|(_, fee_window)| {
                let state = FeeWindowState::at(
                    timestamp,
                    fee_window.start_time,
                    fee_window.end_time,
                );
                Ok(state != fee_window.state)
            })
            .map(|(_, fee_window)| Ok(fee_window))
            .collect()?;
        for mut fee_window in stale.iter().cloned() {
            fee_window.state = FeeWindowState::at(
                timestamp,
                fee_window.start_time,
                fee_window.end_time,
            );
            tracing::debug!(
                fee_window = %fee_window.id,
                state = %fee_window.state,
                "fee window state changed"
            );
            self.fee_windows.put(rwtxn, &fee_window.id, &fee_window)?;
        }
        Ok(stale.len())
    }
}
