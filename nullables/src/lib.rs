//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators (clock, voting, token balances, vault,
//! metadata storage) are abstracted behind traits in `votereward-store`.
//! This crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and fixture runs.

pub mod balances;
pub mod clock;
pub mod store;
pub mod vault;
pub mod votes;

pub use balances::NullBalanceSource;
pub use clock::NullClock;
pub use store::NullMetaStore;
pub use vault::{NullVault, VaultRequest};
pub use votes::NullVoteSource;
