//! Nullable metadata store: thread-safe in-memory storage for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use votereward_store::{MetaStore, MetaWrite, SourceError};

#[derive(Default)]
pub struct NullMetaStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl NullMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored key, in order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    /// Make every subsequent write fail as a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), SourceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SourceError::Backend("writes disabled".into()));
        }
        Ok(())
    }
}

impl MetaStore for NullMetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), SourceError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn delete_meta(&self, key: &str) -> Result<(), SourceError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, SourceError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&self, writes: &[MetaWrite]) -> Result<(), SourceError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        for write in writes {
            match write {
                MetaWrite::Put { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                MetaWrite::Delete { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
