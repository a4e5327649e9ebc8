use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, RoTxn, RwTxn, UnitKey};

use crate::types::{VERSION, Version};

pub mod balances;
pub mod error;
pub mod fee_windows;
pub mod logs;
pub mod markets;
pub mod participants;
pub mod positions;
pub mod reporting;
pub mod universes;

pub use error::Error;
pub use fee_windows::{FeeWindow, FeeWindowState};
pub use markets::{Market, ReportingState};
pub use participants::ParticipantRows;
pub use positions::Position;
pub use reporting::{Crowdsourcer, InitialReport, PayoutKey};
pub use universes::Universe;

/// Last block whose logs were applied
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStamp {
    pub block_number: u64,
    pub timestamp: u64,
}

#[derive(Clone)]
pub struct State {
    markets: markets::Dbs,
    universes: universes::Dbs,
    fee_windows: fee_windows::Dbs,
    reporting: reporting::Dbs,
    balances: balances::Dbs,
    positions: positions::Dbs,
    last_block: DatabaseUnique<UnitKey, SerdeBincode<BlockStamp>>,
    _version: DatabaseUnique<UnitKey, SerdeBincode<Version>>,
}

impl State {
    pub const NUM_DBS: u32 = markets::Dbs::NUM_DBS
        + universes::Dbs::NUM_DBS
        + fee_windows::Dbs::NUM_DBS
        + reporting::Dbs::NUM_DBS
        + balances::Dbs::NUM_DBS
        + positions::Dbs::NUM_DBS
        + 2;

    pub fn new(env: &sneed::Env) -> Result<Self, Error> {
        let mut rwtxn = env.write_txn()?;
        let markets = markets::Dbs::new(env, &mut rwtxn)?;
        let universes = universes::Dbs::new(env, &mut rwtxn)?;
        let fee_windows = fee_windows::Dbs::new(env, &mut rwtxn)?;
        let reporting = reporting::Dbs::new(env, &mut rwtxn)?;
        let balances = balances::Dbs::new(env, &mut rwtxn)?;
        let positions = positions::Dbs::new(env, &mut rwtxn)?;
        let last_block = DatabaseUnique::create(env, &mut rwtxn, "last_block")?;
        let version = DatabaseUnique::create(env, &mut rwtxn, "state_version")?;
        if version.try_get(&rwtxn, &())?.is_none() {
            version.put(&mut rwtxn, &(), &VERSION)?;
        }
        rwtxn.commit()?;
        Ok(Self {
            markets,
            universes,
            fee_windows,
            reporting,
            balances,
            positions,
            last_block,
            _version: version,
        })
    }

    pub fn markets(&self) -> &markets::Dbs {
        &self.markets
    }

    pub fn universes(&self) -> &universes::Dbs {
        &self.universes
    }

    pub fn fee_windows(&self) -> &fee_windows::Dbs {
        &self.fee_windows
    }

    pub fn reporting(&self) -> &reporting::Dbs {
        &self.reporting
    }

    pub fn balances(&self) -> &balances::Dbs {
        &self.balances
    }

    pub fn positions(&self) -> &positions::Dbs {
        &self.positions
    }

    pub fn try_get_last_block(
        &self,
        rotxn: &RoTxn,
    ) -> Result<Option<BlockStamp>, Error> {
        Ok(self.last_block.try_get(rotxn, &())?)
    }

    pub fn put_last_block(
        &self,
        rwtxn: &mut RwTxn,
        block: &BlockStamp,
    ) -> Result<(), Error> {
        self.last_block.put(rwtxn, &(), block)?;
        Ok(())
    }
}
