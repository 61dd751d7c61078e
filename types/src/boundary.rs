//! Boundary type used for epoch windows, vote snapshots and lock gating.
//!
//! A boundary is either a block height or a Unix timestamp in seconds,
//! depending on how the host chain measures time. The engine never mixes
//! the two: every boundary, duration and lock time in one deployment uses
//! the same unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the chain's monotonic axis (block number or seconds).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Boundary(u64);

impl Boundary {
    /// Genesis (boundary zero).
    pub const GENESIS: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// This boundary shifted forward by `duration`, saturating at `u64::MAX`.
    pub fn offset(&self, duration: u64) -> Self {
        Self(self.0.saturating_add(duration))
    }

    /// Whether this boundary + duration has been reached relative to `now`.
    pub fn has_elapsed(&self, duration: u64, now: Boundary) -> bool {
        now.0 >= self.0.saturating_add(duration)
    }
}

impl From<u64> for Boundary {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_elapsed_is_inclusive() {
        let lock = Boundary::new(100);
        assert!(!lock.has_elapsed(50, Boundary::new(149)));
        assert!(lock.has_elapsed(50, Boundary::new(150)));
    }

    #[test]
    fn offset_saturates() {
        assert_eq!(Boundary::new(u64::MAX - 1).offset(10).value(), u64::MAX);
    }
}
