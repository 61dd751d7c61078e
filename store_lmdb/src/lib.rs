//! LMDB storage backend for the voting rewards ledger.
//!
//! Implements `MetaStore` from `votereward-store` using the `heed` LMDB
//! bindings. Every write commits one LMDB transaction, so a batch is either
//! fully durable or not visible at all.

pub mod environment;
pub mod error;
pub mod meta;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
