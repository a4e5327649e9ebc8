use std::{path::Path, sync::Arc};

use sneed::{Env, EnvError, RwTxnError, env};

use crate::{
    chain::ChainClient,
    projector::Projector,
    reporting_fees::{self, FeeDetails},
    state::{self, BlockStamp, Position, State, logs},
    types::{Address, LogBatch, MarketId, TokenId, UniverseId},
};

#[allow(clippy::duplicated_attributes)]
#[derive(thiserror::Error, transitive::Transitive, Debug)]
#[transitive(from(env::error::OpenEnv, EnvError))]
#[transitive(from(env::error::ReadTxn, EnvError))]
#[transitive(from(env::error::WriteTxn, EnvError))]
pub enum Error {
    #[error("Database env error")]
    DbEnv(#[from] EnvError),
    #[error("Database write error")]
    DbWrite(#[from] RwTxnError),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("reporting fee task failed")]
    Join(#[from] tokio::task::JoinError),
    #[error("state error")]
    State(#[source] Box<state::Error>),
}

impl From<state::Error> for Error {
    fn from(err: state::Error) -> Self {
        Self::State(Box::new(err))
    }
}

impl Error {
    /// The state error behind this error, if any
    pub fn state_error(&self) -> Option<&state::Error> {
        match self {
            Self::State(err) => Some(err),
            _ => None,
        }
    }
}

/// Owns the store and the blockchain client
pub struct Node<C> {
    env: Env,
    state: State,
    client: Arc<C>,
    /// Token fees are paid in
    cash: TokenId,
    projector: Projector,
}

impl<C> Clone for Node<C> {
    fn clone(&self) -> Self {
        Self {
            env: self.env.clone(),
            state: self.state.clone(),
            client: self.client.clone(),
            cash: self.cash,
            projector: self.projector.clone(),
        }
    }
}

impl<C> Node<C>
where
    C: ChainClient,
{
    pub async fn new(datadir: &Path, client: C) -> Result<Self, Error> {
        let env_path = datadir.join("data.mdb");
        std::fs::create_dir_all(&env_path)?;
        let env = {
            let mut env_open_opts = heed::EnvOpenOptions::new();
            env_open_opts
                .map_size(1024 * 1024 * 1024)
                .max_dbs(State::NUM_DBS);
            unsafe { Env::open(&env_open_opts, &env_path) }?
        };
        let state = State::new(&env)?;
        let cash = client
            .contract_addresses()
            .await
            .map_err(state::Error::from)?
            .cash;
        tracing::info!(datadir = %datadir.display(), %cash, "opened node");
        Ok(Self {
            env,
            state,
            client: Arc::new(client),
            cash,
            projector: Projector::new(),
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub async fn refresh_position(
        &self,
        market: MarketId,
        account: Address,
    ) -> Result<Vec<Position>, Error> {
        let positions = self
            .projector
            .refresh_position(
                &self.env,
                &self.state,
                self.client.as_ref(),
                &market,
                &account,
            )
            .await?;
        Ok(positions)
    }

    /// Computed on a blocking thread from one read snapshot. Dropping the
    /// returned future discards the result.
    pub async fn get_reporting_fees(
        &self,
        reporter: Option<Address>,
        universe: Option<UniverseId>,
    ) -> Result<FeeDetails, Error> {
        let env = self.env.clone();
        let state = self.state.clone();
        let cash = self.cash;
        tokio::task::spawn_blocking(move || -> Result<_, Error> {
            let rotxn = env.read_txn()?;
            let details = reporting_fees::get_reporting_fees(
                &state, &rotxn, reporter, universe, &cash,
            )?;
            Ok(details)
        })
        .await?
    }

    /// Apply `batch` atomically, then refresh every position it touched.
    ///
    /// The batch stays applied if a refresh fails; refreshes can be
    /// retried with [`Self::refresh_position`].
    pub async fn apply_log_batch(
        &self,
        batch: LogBatch,
    ) -> Result<Vec<Position>, Error> {
        let refreshes = {
            let mut rwtxn = self.env.write_txn()?;
            let refreshes =
                logs::apply_batch(&self.state, &mut rwtxn, &batch)?;
            rwtxn.commit().map_err(RwTxnError::from)?;
            refreshes
        };
        let positions = futures::future::try_join_all(
            refreshes
                .into_iter()
                .map(|(market, account)| self.refresh_position(market, account)),
        )
        .await?;
        Ok(positions.into_iter().flatten().collect())
    }

    pub fn try_get_last_block(&self) -> Result<Option<BlockStamp>, Error> {
        let rotxn = self.env.read_txn()?;
        Ok(self.state.try_get_last_block(&rotxn)?)
    }

    pub fn get_positions(
        &self,
        account: Address,
        market: MarketId,
    ) -> Result<Vec<Position>, Error> {
        let rotxn = self.env.read_txn()?;
        let positions =
            self.state.positions().get_positions(&rotxn, &account, &market)?;
        Ok(positions)
    }
}
