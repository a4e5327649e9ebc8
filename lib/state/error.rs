//! State errors

use sneed::{db::error as db, env::error as env, rwtxn::error as rwtxn};
use thiserror::Error;
use transitive::Transitive;

use crate::{
    chain,
    math::fixed_point,
    types::{
        Address, Amount, AmountOverflowError, AmountUnderflowError, CrowdsourcerId,
        FeeWindowId, MarketId, TokenId, UniverseId,
    },
};

#[derive(Debug, Error, Transitive)]
#[transitive(from(db::Clear, db::Error))]
#[transitive(from(db::Delete, db::Error))]
#[transitive(from(db::Error, sneed::Error))]
#[transitive(from(db::IterInit, db::Error))]
#[transitive(from(db::IterItem, db::Error))]
#[transitive(from(db::Put, db::Error))]
#[transitive(from(db::TryGet, db::Error))]
#[transitive(from(env::CreateDb, env::Error))]
#[transitive(from(env::Error, sneed::Error))]
#[transitive(from(env::ReadTxn, env::Error))]
#[transitive(from(env::WriteTxn, env::Error))]
#[transitive(from(rwtxn::Commit, rwtxn::Error))]
#[transitive(from(rwtxn::Error, sneed::Error))]
pub enum Error {
    #[error(transparent)]
    AmountOverflow(#[from] AmountOverflowError),
    #[error(
        "balance of {owner} in token {token} would become negative"
    )]
    AmountUnderflow {
        token: TokenId,
        owner: Address,
        source: AmountUnderflowError,
    },
    #[error("blockchain client unavailable")]
    CollaboratorUnavailable(#[from] chain::Error),
    #[error("crowdsourcer {crowdsourcer} is not known")]
    CrowdsourcerNotFound { crowdsourcer: CrowdsourcerId },
    #[error("store query failed")]
    Db(#[from] sneed::Error),
    #[error("fee window {fee_window} is not known")]
    FeeWindowNotFound { fee_window: FeeWindowId },
    #[error(transparent)]
    FixedPoint(#[from] fixed_point::Error),
    #[error(
        "{token} balance {balance} exceeds its total supply {supply}"
    )]
    InconsistentSupply {
        token: TokenId,
        balance: Amount,
        supply: Amount,
    },
    #[error("market {market} has no initial report")]
    InitialReportNotFound { market: MarketId },
    #[error("market {market} was created in {expected}, not {actual}")]
    MarketMigrationMismatch {
        market: MarketId,
        expected: UniverseId,
        actual: UniverseId,
    },
    #[error("market {market} not found")]
    MarketNotFound { market: MarketId },
    #[error("must provide {0}")]
    MissingArgument(&'static str),
    #[error("block {block_number} is not newer than last applied block {last}")]
    StaleBatch { block_number: u64, last: u64 },
    #[error("universe {universe} not found")]
    UniverseNotFound { universe: UniverseId },
}
