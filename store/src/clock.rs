//! Current chain boundary.

use votereward_types::Boundary;

/// Source of the current block height or timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> Boundary;
}
