//! Ledger persistence.
//!
//! The sequencing state lives under [`STATE_KEY`] inside a versioned
//! envelope; each beneficiary's records live under their own key below
//! [`RECORDS_PREFIX`]. A staged write persists the state and only the
//! accounts it touched, in one batch. Pending events are not persisted.

use crate::error::LedgerError;
use crate::ledger::{EpochLedger, LedgerState};
use crate::record::RewardRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use votereward_store::{MetaStore, MetaWrite};
use votereward_types::AccountId;

/// Metadata key holding the epoch sequencing state.
pub const STATE_KEY: &str = "ledger/state";

/// Prefix of the per-beneficiary record keys.
pub const RECORDS_PREFIX: &str = "ledger/rewards/";

const SNAPSHOT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct StateSnapshot {
    version: u32,
    state: LedgerState,
}

fn records_key(account: &AccountId) -> String {
    format!("{RECORDS_PREFIX}{account}")
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(value).map_err(|e| LedgerError::Snapshot(e.to_string()))
}

impl EpochLedger {
    fn state_write(&self) -> Result<MetaWrite, LedgerError> {
        let snapshot = StateSnapshot {
            version: SNAPSHOT_VERSION,
            state: self.state.clone(),
        };
        Ok(MetaWrite::put(STATE_KEY, encode(&snapshot)?))
    }

    fn records_write(&self, account: &AccountId) -> Result<MetaWrite, LedgerError> {
        Ok(match self.records.get(account) {
            Some(records) => MetaWrite::put(records_key(account), encode(records)?),
            None => MetaWrite::delete(records_key(account)),
        })
    }

    /// Persist the whole ledger, replacing whatever the store held.
    pub fn save_to_store(&self, store: &dyn MetaStore) -> Result<(), LedgerError> {
        let mut writes = vec![self.state_write()?];
        for (key, _) in store.scan_prefix(RECORDS_PREFIX)? {
            let known = key
                .strip_prefix(RECORDS_PREFIX)
                .is_some_and(|account| self.records.contains_key(&AccountId::from(account)));
            if !known {
                writes.push(MetaWrite::delete(key));
            }
        }
        for account in self.records.keys() {
            writes.push(self.records_write(account)?);
        }
        store.write_batch(&writes)?;
        debug!(
            writes = writes.len(),
            epoch = self.current_epoch(),
            "ledger saved"
        );
        Ok(())
    }

    /// Persist what changed in the current staged write: the sequencing
    /// state and the records of every touched account. Outside a staged
    /// write the whole ledger is saved.
    pub fn persist_changes(&self, store: &dyn MetaStore) -> Result<(), LedgerError> {
        if !self.in_write() {
            return self.save_to_store(store);
        }
        let mut writes = vec![self.state_write()?];
        for account in self.touched_accounts() {
            writes.push(self.records_write(account)?);
        }
        store.write_batch(&writes)?;
        debug!(
            writes = writes.len(),
            epoch = self.current_epoch(),
            "ledger changes saved"
        );
        Ok(())
    }

    /// Restore the ledger from a metadata store, `None` if none was ever
    /// saved there.
    pub fn load_from_store(store: &dyn MetaStore) -> Result<Option<Self>, LedgerError> {
        let Some(bytes) = store.get_meta(STATE_KEY)? else {
            return Ok(None);
        };
        let snapshot: StateSnapshot =
            bincode::deserialize(&bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut records = BTreeMap::new();
        for (key, bytes) in store.scan_prefix(RECORDS_PREFIX)? {
            let account = key
                .strip_prefix(RECORDS_PREFIX)
                .map(AccountId::from)
                .ok_or_else(|| LedgerError::Snapshot(format!("unexpected key '{key}'")))?;
            let list: Vec<RewardRecord> = bincode::deserialize(&bytes)
                .map_err(|e| LedgerError::Snapshot(format!("records of {account}: {e}")))?;
            records.insert(account, list);
        }

        Ok(Some(Self {
            state: snapshot.state,
            records,
            ..Self::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votereward_nullables::NullMetaStore;
    use votereward_types::{Boundary, RewardParams, TokenAmount};

    fn account(n: u64) -> AccountId {
        AccountId::from_index(n)
    }

    fn populated() -> EpochLedger {
        let mut ledger = EpochLedger::new();
        let params = RewardParams::default();
        ledger.open_distribution(Boundary::new(0), &params).unwrap();
        ledger
            .post_reward(&account(1), TokenAmount::new(420), Boundary::new(20))
            .unwrap();
        ledger.close_distribution(Boundary::new(20)).unwrap();
        ledger.open_distribution(Boundary::new(20), &params).unwrap();
        ledger
    }

    #[test]
    fn store_roundtrip_preserves_state() {
        let store = NullMetaStore::new();
        let ledger = populated();
        ledger.save_to_store(&store).unwrap();

        let mut restored = EpochLedger::load_from_store(&store).unwrap().unwrap();
        assert_eq!(restored.current_epoch(), 1);
        assert!(restored.is_open());
        assert_eq!(restored.epoch_history(), ledger.epoch_history());
        assert_eq!(
            restored.rewards_for(&account(1)),
            ledger.rewards_for(&account(1))
        );
        assert_eq!(restored.last_distribution_boundary(), Boundary::new(20));
        assert!(restored.drain_events().is_empty());
    }

    #[test]
    fn staged_write_persists_only_touched_accounts() {
        let store = NullMetaStore::new();
        let mut ledger = populated();
        ledger.save_to_store(&store).unwrap();
        store.delete_meta(&records_key(&account(1))).unwrap();

        ledger.begin();
        ledger
            .post_reward(&account(2), TokenAmount::new(7), Boundary::new(40))
            .unwrap();
        ledger.persist_changes(&store).unwrap();
        ledger.finish();

        assert_eq!(
            store.keys(),
            vec![records_key(&account(2)), STATE_KEY.to_string()]
        );
        let restored = EpochLedger::load_from_store(&store).unwrap().unwrap();
        assert_eq!(restored.window().unwrap().rewards_posted, 1);
        assert_eq!(restored.rewards_for(&account(2)).len(), 1);
    }

    #[test]
    fn save_drops_records_the_ledger_no_longer_has() {
        let store = NullMetaStore::new();
        populated().save_to_store(&store).unwrap();
        EpochLedger::new().save_to_store(&store).unwrap();
        assert_eq!(store.keys(), vec![STATE_KEY.to_string()]);
    }

    #[test]
    fn failed_batch_leaves_store_unchanged() {
        let store = NullMetaStore::new();
        let ledger = populated();
        ledger.save_to_store(&store).unwrap();
        let before = store.keys();

        let mut ledger = ledger;
        ledger.begin();
        ledger
            .post_reward(&account(3), TokenAmount::new(1), Boundary::new(40))
            .unwrap();
        store.set_fail_writes(true);
        assert!(matches!(
            ledger.persist_changes(&store),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(store.keys(), before);
    }

    #[test]
    fn empty_store_yields_nothing() {
        let store = NullMetaStore::new();
        assert!(EpochLedger::load_from_store(&store).unwrap().is_none());
    }

    #[test]
    fn garbage_state_is_rejected() {
        let store = NullMetaStore::new();
        store.put_meta(STATE_KEY, &[0xff, 0x01]).unwrap();
        assert!(matches!(
            EpochLedger::load_from_store(&store),
            Err(LedgerError::Snapshot(_))
        ));
    }
}
