//! Staged writes.
//!
//! Between [`EpochLedger::begin`] and [`EpochLedger::finish`] the ledger
//! keeps an undo log: the sequencing state as it was and the prior record
//! list of each account it touched. The log names exactly what must be
//! persisted, and [`EpochLedger::rollback`] restores the ledger from it.

use std::collections::BTreeMap;

use votereward_types::AccountId;

use crate::event::RewardEvent;
use crate::ledger::{EpochLedger, LedgerState};
use crate::record::RewardRecord;

#[derive(Clone, Debug)]
pub(crate) struct Journal {
    state: LedgerState,
    records: BTreeMap<AccountId, Option<Vec<RewardRecord>>>,
    events: usize,
}

impl EpochLedger {
    /// Start a staged write. A write already in progress is kept as is.
    pub fn begin(&mut self) {
        if self.journal.is_some() {
            return;
        }
        self.journal = Some(Journal {
            state: self.state.clone(),
            records: BTreeMap::new(),
            events: self.events.len(),
        });
    }

    pub fn in_write(&self) -> bool {
        self.journal.is_some()
    }

    /// Accounts whose records changed since [`begin`](Self::begin).
    pub fn touched_accounts(&self) -> Vec<&AccountId> {
        self.journal
            .as_ref()
            .map(|j| j.records.keys().collect())
            .unwrap_or_default()
    }

    /// Undo everything since [`begin`](Self::begin), including the events it
    /// produced.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        self.state = journal.state;
        for (account, prior) in journal.records {
            match prior {
                Some(records) => {
                    self.records.insert(account, records);
                }
                None => {
                    self.records.remove(&account);
                }
            }
        }
        self.events.truncate(journal.events);
    }

    /// Keep everything since [`begin`](Self::begin) and hand back the
    /// pending events.
    pub fn finish(&mut self) -> Vec<RewardEvent> {
        self.journal = None;
        self.drain_events()
    }

    /// Remember the records of `account` before their first change in the
    /// current write.
    pub(crate) fn touch(&mut self, account: &AccountId) {
        if let Some(journal) = self.journal.as_mut() {
            journal
                .records
                .entry(account.clone())
                .or_insert_with(|| self.records.get(account).cloned());
        }
    }
}
