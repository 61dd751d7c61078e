//! Metadata storage trait.

use crate::SourceError;

/// One write inside a [`MetaStore::write_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaWrite {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl MetaWrite {
    pub fn put(key: impl Into<String>, value: Vec<u8>) -> Self {
        MetaWrite::Put {
            key: key.into(),
            value,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        MetaWrite::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            MetaWrite::Put { key, .. } | MetaWrite::Delete { key } => key,
        }
    }
}

/// Key-value store for engine bookkeeping (ledger state, reward records).
///
/// Values are opaque bytes so the store does not depend on the ledger crate;
/// the ledger serializes its own types.
pub trait MetaStore: Send + Sync {
    /// Store a metadata value.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), SourceError>;

    /// Retrieve a metadata value, `None` if the key was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError>;

    /// Delete a metadata entry.
    fn delete_meta(&self, key: &str) -> Result<(), SourceError>;

    /// Every entry whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, SourceError>;

    /// Apply `writes` in order as one unit: after an error none of them is
    /// visible.
    fn write_batch(&self, writes: &[MetaWrite]) -> Result<(), SourceError>;
}
