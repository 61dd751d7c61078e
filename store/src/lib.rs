//! Abstract collaborator traits for the voting rewards engine.
//!
//! The engine only reads votes and balances and only *requests* transfers.
//! Every backend (chain RPC, indexer, in-memory for testing) implements
//! these traits; the rest of the workspace depends only on the traits.

pub mod balance;
pub mod clock;
pub mod error;
pub mod meta;
pub mod vault;
pub mod vote;

pub use balance::BalanceSource;
pub use clock::Clock;
pub use error::SourceError;
pub use meta::{MetaStore, MetaWrite};
pub use vault::VaultTransfer;
pub use vote::{VoteRecord, VoteSource};
