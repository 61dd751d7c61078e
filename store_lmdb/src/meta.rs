//! LMDB implementation of MetaStore.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env};

use votereward_store::{MetaStore, MetaWrite, SourceError};

use crate::environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
use crate::LmdbError;

pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Str, Bytes>,
}

impl LmdbMetaStore {
    /// Open (creating if needed) a store in the directory `path` with the
    /// default map size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LmdbError> {
        Ok(LmdbEnvironment::open(path.as_ref(), DEFAULT_MAP_SIZE)?.meta_store())
    }
}

impl MetaStore for LmdbMetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), SourceError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, key, value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self.meta_db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(<[u8]>::to_vec))
    }

    fn delete_meta(&self, key: &str) -> Result<(), SourceError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .delete(&mut wtxn, key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, SourceError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .meta_db
            .prefix_iter(&rtxn, prefix)
            .map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            entries.push((key.to_string(), val.to_vec()));
        }
        Ok(entries)
    }

    fn write_batch(&self, writes: &[MetaWrite]) -> Result<(), SourceError> {
        // Dropping the transaction on an early return aborts it.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for write in writes {
            match write {
                MetaWrite::Put { key, value } => {
                    self.meta_db
                        .put(&mut wtxn, key, value)
                        .map_err(LmdbError::from)?;
                }
                MetaWrite::Delete { key } => {
                    self.meta_db
                        .delete(&mut wtxn, key)
                        .map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
