//! Nullable clock: deterministic boundaries for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use votereward_store::Clock;
use votereward_types::Boundary;

/// A deterministic clock for testing.
///
/// The boundary only advances when you tell it to.
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: AtomicU64::new(initial),
        }
    }

    /// Advance by a number of blocks (or seconds).
    pub fn advance(&self, units: u64) {
        self.current.fetch_add(units, Ordering::SeqCst);
    }

    /// Set the boundary to a specific value.
    pub fn set(&self, value: u64) {
        self.current.store(value, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Boundary {
        Boundary::new(self.current.load(Ordering::SeqCst))
    }
}
