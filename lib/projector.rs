//! Recomputes share positions from the blockchain client

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    chain::{self, ChainClient},
    math::fixed_point,
    state::{Error, Position, State},
    types::{Address, MarketId, Outcome},
};

type PositionKey = (Address, MarketId);

/// Serializes position refreshes per (account, market).
///
/// Refreshes of different keys run independently.
#[derive(Clone, Default)]
pub struct Projector {
    locks: Arc<Mutex<HashMap<PositionKey, Arc<tokio::sync::Mutex<()>>>>>,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_lock(&self, key: PositionKey) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(key).or_default().clone()
    }

    /// Drop the lock entry for `key` if no other refresh holds it.
    fn release(&self, key: &PositionKey, key_lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock();
        // One reference in the map, one held here
        if Arc::strong_count(&key_lock) == 2 {
            locks.remove(key);
        }
    }

    /// Recompute the positions of `account` in `market` and replace every
    /// stored row for the pair in one write transaction.
    pub async fn refresh_position<C>(
        &self,
        env: &sneed::Env,
        state: &State,
        client: &C,
        market: &MarketId,
        account: &Address,
    ) -> Result<Vec<Position>, Error>
    where
        C: ChainClient,
    {
        let key = (*account, *market);
        let key_lock = self.key_lock(key);
        let guard = key_lock.lock().await;
        let res = refresh(env, state, client, market, account).await;
        drop(guard);
        self.release(&key, key_lock);
        res
    }
}

async fn refresh<C>(
    env: &sneed::Env,
    state: &State,
    client: &C,
    market: &MarketId,
    account: &Address,
) -> Result<Vec<Position>, Error>
where
    C: ChainClient,
{
    let tick_size = {
        let rotxn = env.read_txn()?;
        state.markets().get_market(&rotxn, market)?.tick_size()?
    };
    let raw_positions = client
        .get_position_in_market(market, account, &tick_size)
        .await
        .inspect_err(|err| {
            tracing::warn!(%market, %account, "position query failed: {err:#}")
        })?;
    let positions = raw_positions
        .into_iter()
        .enumerate()
        .map(|(outcome, amount)| -> Result<_, Error> {
            let outcome = Outcome::try_from(outcome).map_err(|_| {
                chain::Error::MalformedResponse(format!(
                    "outcome index {outcome} out of range"
                ))
            })?;
            Ok(Position {
                account: *account,
                market: *market,
                outcome,
                amount: fixed_point::on_chain_amount_to_display(
                    amount, &tick_size,
                ),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut rwtxn = env.write_txn()?;
    state
        .positions()
        .replace_positions(&mut rwtxn, account, market, &positions)?;
    rwtxn.commit()?;
    tracing::debug!(%market, %account, "refreshed position");
    Ok(positions)
}
