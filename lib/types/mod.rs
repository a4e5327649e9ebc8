use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

mod address;
pub mod log;

pub use address::{Address, AddressParseError};
pub use log::{Log, LogBatch};
pub use semver::Version;

/// Schema version written into fresh stores
pub const VERSION: Version = Version::new(0, 1, 0);

macro_rules! address_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(
            Clone,
            Copy,
            Debug,
            Deserialize,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            Serialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub Address);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = AddressParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<$name> for Address {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

address_id!(
    /// Market contract
    MarketId
);
address_id!(
    /// Universe contract
    UniverseId
);
address_id!(
    /// Fee window contract. Also the participation token of the window.
    FeeWindowId
);
address_id!(
    /// Dispute crowdsourcer contract. Also the token staked into it.
    CrowdsourcerId
);
address_id!(
    /// Initial reporter contract of a market
    InitialReporterId
);
address_id!(
    /// Any ERC20-style token tracked in the balance ledger
    TokenId
);

impl From<FeeWindowId> for TokenId {
    fn from(id: FeeWindowId) -> Self {
        Self(id.0)
    }
}

impl From<CrowdsourcerId> for TokenId {
    fn from(id: CrowdsourcerId) -> Self {
        Self(id.0)
    }
}

/// Outcome index within a market
pub type Outcome = u32;

/// Payout numerators, one per outcome. Identifies a candidate result.
#[derive(
    Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct PayoutNumerators(pub Vec<u64>);

#[derive(Clone, Copy, Debug, Error)]
#[error("amount overflow")]
pub struct AmountOverflowError;

#[derive(Clone, Copy, Debug, Error)]
#[error("amount underflow")]
pub struct AmountUnderflowError;

/// Integer quantity in base on-chain units
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountOverflowError> {
        self.0.checked_add(rhs.0).map(Self).ok_or(AmountOverflowError)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, AmountUnderflowError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(AmountUnderflowError)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Amount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Serialized as a decimal string for JSON, as a raw integer otherwise
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(&self.0)
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            u128::deserialize(deserializer).map(Self)
        }
    }
}
