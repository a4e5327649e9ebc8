use heed::types::SerdeBincode;
use serde::{Deserialize, Serialize};
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    math::fixed_point::Decimal,
    state::Error,
    types::{Address, MarketId, Outcome},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub account: Address,
    pub market: MarketId,
    pub outcome: Outcome,
    /// Signed display shares
    pub amount: Decimal,
}

/// Positions are stored as the full outcome vector of one
/// (account, market) pair, so a single put replaces every row at once.
#[derive(Clone)]
pub struct Dbs {
    positions:
        DatabaseUnique<SerdeBincode<(Address, MarketId)>, SerdeBincode<Vec<Position>>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 1;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        let positions = DatabaseUnique::create(env, rwtxn, "positions")?;
        Ok(Self { positions })
    }

    pub fn get_positions(
        &self,
        rotxn: &RoTxn,
        account: &Address,
        market: &MarketId,
    ) -> Result<Vec<Position>, Error> {
        let positions = self
            .positions
            .try_get(rotxn, &(*account, *market))?
            .unwrap_or_default();
        Ok(positions)
    }

    /// Supersede every position row of (`account`, `market`).
    pub fn replace_positions(
        &self,
        rwtxn: &mut RwTxn,
        account: &Address,
        market: &MarketId,
        positions: &[Position],
    ) -> Result<(), Error> {
        let key = (*account, *market);
        if positions.is_empty() {
            self.positions.delete(rwtxn, &key)?;
        } else {
            self.positions.put(rwtxn, &key, &positions.to_vec())?;
        }
        tracing::debug!(
            %account,
            %market,
            outcomes = positions.len(),
            "replaced positions"
        );
        Ok(())
    }
}
