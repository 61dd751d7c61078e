use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbError> for votereward_store::SourceError {
    fn from(e: LmdbError) -> Self {
        votereward_store::SourceError::Backend(e.to_string())
    }
}
