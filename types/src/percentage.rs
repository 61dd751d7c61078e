//! Fixed-point percentage with an 18-decimal base.
//!
//! `PCT_BASE` represents 100%. A reward percentage of 42% is stored as
//! `420_000_000_000_000_000`.

use crate::amount::TokenAmount;
use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 100% in fixed-point units (1e18).
pub const PCT_BASE: u64 = 1_000_000_000_000_000_000;

/// A fraction in `[0, 1]` expressed in units of `1 / PCT_BASE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Percentage(u64);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(PCT_BASE);

    /// Create a percentage from raw fixed-point units; rejects values above 100%.
    pub fn new(raw: u64) -> Result<Self, TypesError> {
        if raw > PCT_BASE {
            return Err(TypesError::PercentageOutOfRange {
                raw,
                base: PCT_BASE,
            });
        }
        Ok(Self(raw))
    }

    /// Create a percentage from whole percent points (`42` → 42%).
    pub fn from_percent(percent: u64) -> Result<Self, TypesError> {
        let raw = percent
            .checked_mul(PCT_BASE / 100)
            .ok_or(TypesError::Overflow)?;
        Self::new(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `amount × self`, rounded half up.
    ///
    /// The amount is split into whole multiples of the base and a remainder so
    /// the intermediate product never exceeds `u128`. The result is never
    /// greater than `amount`.
    pub fn apply(&self, amount: TokenAmount) -> TokenAmount {
        let base = PCT_BASE as u128;
        let pct = self.0 as u128;
        let whole = amount.raw() / base;
        let rem = amount.raw() % base;
        // whole * pct <= whole * base <= amount, rem * pct < base^2 < u128::MAX
        let scaled = whole * pct + (rem * pct + base / 2) / base;
        TokenAmount::new(scaled)
    }
}

impl TryFrom<u64> for Percentage {
    type Error = TypesError;
    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Percentage> for u64 {
    fn from(pct: Percentage) -> Self {
        pct.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / (PCT_BASE / 100);
        let frac = self.0 % (PCT_BASE / 100);
        if frac == 0 {
            write!(f, "{whole}%")
        } else {
            write!(f, "{whole}.{:0>16}%", frac)
        }
    }
}
