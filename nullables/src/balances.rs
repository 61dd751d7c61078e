//! Nullable balance source: checkpointed balance history.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use votereward_store::{BalanceSource, SourceError};
use votereward_types::{AccountId, Boundary, TokenAmount};

/// Balance history kept as `(boundary, balance)` checkpoints per account,
/// sorted by boundary. A lookup returns the latest checkpoint at or before
/// the requested boundary, zero if there is none.
#[derive(Default)]
pub struct NullBalanceSource {
    checkpoints: Mutex<HashMap<AccountId, Vec<(Boundary, TokenAmount)>>>,
    failing: Mutex<HashSet<AccountId>>,
}

impl NullBalanceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the balance of `account` from `at` onwards.
    pub fn set_balance(&self, account: &AccountId, at: Boundary, amount: TokenAmount) {
        let mut checkpoints = self.checkpoints.lock().unwrap();
        let history = checkpoints.entry(account.clone()).or_default();
        match history.binary_search_by_key(&at, |(b, _)| *b) {
            Ok(idx) => history[idx].1 = amount,
            Err(idx) => history.insert(idx, (at, amount)),
        }
    }

    /// Increase the balance of `account` by `delta` from `at` onwards,
    /// including every checkpoint already recorded after `at`.
    pub fn mint(&self, account: &AccountId, at: Boundary, delta: TokenAmount) {
        let current = self.lookup(account, at);
        self.set_balance(account, at, current.saturating_add(delta));

        let mut checkpoints = self.checkpoints.lock().unwrap();
        if let Some(history) = checkpoints.get_mut(account) {
            for (_, balance) in history.iter_mut().filter(|(b, _)| *b > at) {
                *balance = balance.saturating_add(delta);
            }
        }
    }

    /// Make every balance lookup for `account` fail as unavailable.
    pub fn fail_for(&self, account: &AccountId) {
        self.failing.lock().unwrap().insert(account.clone());
    }

    fn lookup(&self, account: &AccountId, at: Boundary) -> TokenAmount {
        let checkpoints = self.checkpoints.lock().unwrap();
        let Some(history) = checkpoints.get(account) else {
            return TokenAmount::ZERO;
        };
        let idx = history.partition_point(|(b, _)| *b <= at);
        if idx == 0 {
            TokenAmount::ZERO
        } else {
            history[idx - 1].1
        }
    }
}

impl BalanceSource for NullBalanceSource {
    fn balance_at(
        &self,
        account: &AccountId,
        boundary: Boundary,
    ) -> Result<TokenAmount, SourceError> {
        if self.failing.lock().unwrap().contains(account) {
            return Err(SourceError::Unavailable(format!(
                "balance of {account} at {boundary}"
            )));
        }
        Ok(self.lookup(account, boundary))
    }
}
