use thiserror::Error;
use votereward_store::SourceError;
use votereward_types::{AccountId, Boundary, EpochNumber, TypesError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("epoch start {start} precedes the earliest allowed start {min_start}")]
    EpochOrder { start: Boundary, min_start: Boundary },

    #[error("distribution window for epoch {0} is already open")]
    WindowAlreadyOpen(EpochNumber),

    #[error("no distribution window is open")]
    WindowNotOpen,

    #[error("no collectible rewards for {0}")]
    NoRewards(AccountId),

    #[error("reward amount must be non-zero")]
    ZeroAmount,

    #[error("invalid reward parameters: {0}")]
    InvalidParams(#[from] TypesError),

    #[error("arithmetic overflow in reward accounting")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("storage error: {0}")]
    Storage(#[from] SourceError),
}
