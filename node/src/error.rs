use thiserror::Error;
use votereward_ledger::LedgerError;
use votereward_rewards::RewardError;
use votereward_store::SourceError;
use votereward_types::{AccountId, Boundary, TypesError};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("external source error: {0}")]
    Source(#[from] SourceError),

    #[error("reward computation error: {0}")]
    Reward(RewardError),

    #[error("{missing} missing votes exceed the threshold of {threshold}")]
    TooManyMissingVotes { missing: u64, threshold: u64 },

    #[error("the vote source has no votes")]
    NoVotes,

    #[error("{0} was already rewarded in the open epoch")]
    AlreadyDistributed(AccountId),

    #[error("epoch ending at {end} has not elapsed (now {now})")]
    EpochNotElapsed { end: Boundary, now: Boundary },

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] TypesError),

    #[error("config error: {0}")]
    Config(String),

    #[error("worker task failed: {0}")]
    Task(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<RewardError> for DriverError {
    fn from(err: RewardError) -> Self {
        match err {
            RewardError::Source(source) => DriverError::Source(source),
            other => DriverError::Reward(other),
        }
    }
}

impl DriverError {
    /// Whether the error stems from an unreachable or malformed collaborator.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            DriverError::Source(_) | DriverError::Ledger(LedgerError::Storage(_))
        )
    }
}
