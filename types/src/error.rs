//! Errors raised while constructing or validating fundamental types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("percentage {raw} exceeds the base {base}")]
    PercentageOutOfRange { raw: u64, base: u64 },

    #[error("invalid account address: {0}")]
    InvalidAccount(String),

    #[error("epoch duration must be non-zero")]
    ZeroEpochDuration,

    #[error("arithmetic overflow")]
    Overflow,
}
