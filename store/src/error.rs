use thiserror::Error;

/// Failure reported by an external collaborator (vote source, balance
/// source, metadata store).
///
/// Callers must never treat a source error as a zero balance or an absent
/// vote; it aborts processing of the affected beneficiary only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed data from source: {0}")]
    Malformed(String),

    #[error("vote {0} not found")]
    VoteNotFound(u64),

    #[error("storage backend error: {0}")]
    Backend(String),
}
