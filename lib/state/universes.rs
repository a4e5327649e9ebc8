use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    state::{Error, State},
    types::{MarketId, UniverseId},
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Universe {
    pub id: UniverseId,
    pub parent: Option<UniverseId>,
    /// Set once a market in this universe forks
    pub forking_market: Option<MarketId>,
}

impl Universe {
    pub fn is_forking(&self) -> bool {
        self.forking_market.is_some()
    }
}

#[derive(Clone)]
pub struct Dbs {
    universes: DatabaseUnique<SerdeBincode<UniverseId>, SerdeBincode<Universe>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 1;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        let universes = DatabaseUnique::create(env, rwtxn, "universes")?;
        Ok(Self { universes })
    }

    pub fn try_get_universe(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<Option<Universe>, Error> {
        Ok(self.universes.try_get(rotxn, universe)?)
    }

    pub fn get_universe(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<Universe, Error> {
        self.try_get_universe(rotxn, universe)?
            .ok_or(Error::UniverseNotFound {
                universe: *universe,
            })
    }

    pub fn put_universe(
        &self,
        rwtxn: &mut RwTxn,
        universe: &Universe,
    ) -> Result<(), Error> {
        self.universes.put(rwtxn, &universe.id, universe)?;
        Ok(())
    }
}

impl State {
    /// Canonical universe row for `universe`.
    ///
    /// A universe is only known to the ledger once at least one fee window
    /// references it.
    pub fn resolve_universe(
        &self,
        rotxn: &RoTxn,
        universe: &UniverseId,
    ) -> Result<UniverseId, Error> {
        let not_found = || Error::UniverseNotFound {
            universe: *universe,
        };
        if !self.fee_windows().has_fee_window(rotxn, universe)? {
            return Err(not_found());
        }
        let row = self
            .universes()
            .try_get_universe(rotxn, universe)?
            .ok_or_else(not_found)?;
        Ok(row.id)
    }
}
