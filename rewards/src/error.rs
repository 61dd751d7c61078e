//! Reward computation errors.

use thiserror::Error;
use votereward_store::SourceError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("external source error: {0}")]
    Source(#[from] SourceError),

    #[error("window ends at {to} before it starts at {from}")]
    InvertedWindow { from: u64, to: u64 },
}
