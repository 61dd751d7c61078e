//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Env, EnvOpenOptions};
use tracing::info;

use crate::meta::LmdbMetaStore;
use crate::LmdbError;

/// Default maximum size of the memory map. LMDB files are sparse, so this
/// only bounds growth.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const META_DB: &str = "meta";

/// Wraps the LMDB environment and its database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    meta_db: heed::Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per directory by this
        // process and the memory map is never modified outside heed.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let meta_db = env.create_database::<Str, Bytes>(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;
        info!(path = %path.display(), map_size, "LMDB environment opened");
        Ok(Self {
            env: Arc::new(env),
            meta_db,
        })
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }
}
