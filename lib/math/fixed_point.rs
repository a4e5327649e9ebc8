//! Exact fixed-point conversions between on-chain integers and display
//! quantities.
//!
//! All intermediate values are exact rationals. Amounts are rounded only in
//! [`Decimal::floor_to_amount`], which truncates toward zero so that summed
//! claims never exceed the pool they are drawn from. Text goes through
//! `fraction`, and only display truncates.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use fraction::BigFraction;
use num::{BigInt, BigRational, Signed as _, ToPrimitive as _, Zero as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

use crate::types::Amount;

/// Fractional digits shown for a [`Decimal`], the precision of Cash
pub const DISPLAY_PRECISION: usize = 18;

#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error(
        "invalid market parameters: num ticks {num_ticks}, min price {min_price}, max price {max_price}"
    )]
    InvalidMarketParameters {
        num_ticks: u64,
        min_price: Decimal,
        max_price: Decimal,
    },
    #[error("invalid decimal literal `{0}`")]
    Parse(String),
    #[error("negative value not allowed: {0}")]
    Negative(Decimal),
    #[error("value exceeds maximum amount: {0}")]
    Overflow(Decimal),
}

/// Exact signed decimal quantity
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Decimal(BigRational);

impl Decimal {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn from_integer(value: i128) -> Self {
        Self(BigRational::from_integer(BigInt::from(value)))
    }

    /// `numer / denom`, or zero if `denom` is zero
    pub fn ratio(numer: Amount, denom: Amount) -> Self {
        if denom.is_zero() {
            return Self::zero();
        }
        Self(BigRational::new(BigInt::from(numer.0), BigInt::from(denom.0)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn half(&self) -> Self {
        Self(self.0.clone() / BigRational::from_integer(BigInt::from(2)))
    }

    /// `None` if `rhs` is zero
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(Self(&self.0 / &rhs.0))
        }
    }

    /// Truncate toward zero to whole base units.
    pub fn floor_to_amount(&self) -> Result<Amount, Error> {
        if self.is_negative() {
            return Err(Error::Negative(self.clone()));
        }
        self.0
            .to_integer()
            .to_u128()
            .map(Amount)
            .ok_or_else(|| Error::Overflow(self.clone()))
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        Self(BigRational::from_integer(BigInt::from(amount.0)))
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self(BigRational::from_integer(BigInt::from(value)))
    }
}

impl Add for Decimal {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn add(self, rhs: &'a Decimal) -> Decimal {
        Decimal(&self.0 + &rhs.0)
    }
}

impl Sub for Decimal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for Decimal {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl<'a> Mul<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &'a Decimal) -> Decimal {
        Decimal(&self.0 * &rhs.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, value| &acc + value)
    }
}

impl Decimal {
    fn to_fraction(&self) -> BigFraction {
        let sign = if self.is_negative() {
            fraction::Sign::Minus
        } else {
            fraction::Sign::Plus
        };
        BigFraction::new_raw_signed(
            sign,
            self.0.numer().magnitude().clone(),
            self.0.denom().magnitude().clone(),
        )
    }

    /// `None` for NaN and infinities
    fn try_from_fraction(fraction: &BigFraction) -> Option<Self> {
        let sign = match fraction.sign()? {
            fraction::Sign::Plus => num::bigint::Sign::Plus,
            fraction::Sign::Minus => num::bigint::Sign::Minus,
        };
        let numer = BigInt::from_biguint(sign, fraction.numer()?.clone());
        let denom = BigInt::from(fraction.denom()?.clone());
        if denom.is_zero() {
            return None;
        }
        Some(Self(BigRational::new(numer, denom)))
    }
}

/// Positional notation, truncated to [`DISPLAY_PRECISION`] fractional digits
/// unless the formatter asks for another precision.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DISPLAY_PRECISION);
        write!(f, "{:.precision$}", self.to_fraction())
    }
}

/// Accepts decimal (`-0.05`) and fraction (`1/3`) literals.
impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigFraction::from_str(s)
            .ok()
            .and_then(|fraction| Self::try_from_fraction(&fraction))
            .ok_or_else(|| Error::Parse(s.to_owned()))
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            BigRational::deserialize(deserializer).map(Self)
        }
    }
}

/// Price granularity of a market: `(max_price - min_price) / num_ticks`
pub fn tick_size(
    num_ticks: u64,
    min_price: &Decimal,
    max_price: &Decimal,
) -> Result<Decimal, Error> {
    let invalid = || Error::InvalidMarketParameters {
        num_ticks,
        min_price: min_price.clone(),
        max_price: max_price.clone(),
    };
    if num_ticks == 0 || max_price <= min_price {
        return Err(invalid());
    }
    let range = max_price.clone() - min_price.clone();
    range.checked_div(&Decimal::from(num_ticks)).ok_or_else(invalid)
}

/// Convert an on-chain share amount to display shares.
pub fn on_chain_amount_to_display(amount: i128, tick_size: &Decimal) -> Decimal {
    &Decimal::from_integer(amount) * tick_size
}
