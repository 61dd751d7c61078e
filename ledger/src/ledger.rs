//! The epoch ledger, the single authoritative reward state machine.
//!
//! `Idle → Open → Idle`: a distribution window opens for the current epoch,
//! accepts reward postings, and closes, which advances the epoch number.
//! Collection is independent of the window and gated only by lock time.
//!
//! Every operation validates before mutating, so a failed call leaves the
//! ledger exactly as it was.

use crate::epoch::{DistributionWindow, Epoch, EpochClosure};
use crate::error::LedgerError;
use crate::event::RewardEvent;
use crate::journal::Journal;
use crate::record::{Collection, RewardRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use votereward_types::{
    AccountId, Boundary, EpochNumber, RewardParams, RewardState, TokenAmount,
};

/// Epoch sequencing state, persisted apart from the reward records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    pub(crate) current_epoch: EpochNumber,
    /// Every epoch ever opened, oldest first.
    pub(crate) history: Vec<Epoch>,
    pub(crate) window: Option<DistributionWindow>,
    /// Boundary at which the last window closed; the initial boundary
    /// until one has.
    pub(crate) last_distribution: Boundary,
}

#[derive(Clone, Debug, Default)]
pub struct EpochLedger {
    pub(crate) state: LedgerState,
    pub(crate) records: BTreeMap<AccountId, Vec<RewardRecord>>,
    pub(crate) events: Vec<RewardEvent>,
    pub(crate) journal: Option<Journal>,
}

impl EpochLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh ledger whose first epoch may not start before `initial`.
    pub fn starting_at(initial: Boundary) -> Self {
        let mut ledger = Self::new();
        ledger.state.last_distribution = initial;
        ledger
    }

    /// Open the distribution window for the current epoch starting at `start`.
    ///
    /// `start` must not precede [`next_min_start`](Self::next_min_start).
    pub fn open_distribution(
        &mut self,
        start: Boundary,
        params: &RewardParams,
    ) -> Result<&Epoch, LedgerError> {
        if self.state.window.is_some() {
            return Err(LedgerError::WindowAlreadyOpen(self.state.current_epoch));
        }
        let min_start = self.next_min_start();
        if start < min_start {
            return Err(LedgerError::EpochOrder { start, min_start });
        }
        params.validate()?;

        let epoch = Epoch::new(self.state.current_epoch, start, params);
        let end = epoch.end();
        self.state.window = Some(DistributionWindow {
            epoch: epoch.number,
            start,
            end,
            total_locked: TokenAmount::ZERO,
            rewards_posted: 0,
        });
        self.events.push(RewardEvent::DistributionWindowOpened {
            epoch: epoch.number,
            start,
            end,
        });
        info!(epoch = epoch.number, %start, %end, "distribution window opened");

        self.state.history.push(epoch);
        Ok(&self.state.history[self.state.history.len() - 1])
    }

    /// Lock a reward for `beneficiary` in the open window.
    ///
    /// Postings are not deduplicated here: posting twice creates two records.
    /// Callers that need once-per-epoch semantics check
    /// [`posted_beneficiaries`](Self::posted_beneficiaries) first.
    pub fn post_reward(
        &mut self,
        beneficiary: &AccountId,
        amount: TokenAmount,
        at: Boundary,
    ) -> Result<&RewardRecord, LedgerError> {
        let window = self.state.window.as_ref().ok_or(LedgerError::WindowNotOpen)?;
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let total_locked = window
            .total_locked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let epoch = self.open_epoch().ok_or(LedgerError::WindowNotOpen)?;

        let record = RewardRecord {
            beneficiary: beneficiary.clone(),
            epoch: epoch.number,
            amount,
            lock_boundary: at,
            lock_duration: epoch.lock_time,
            state: RewardState::Locked,
            withdrawn_at: None,
        };
        self.events.push(RewardEvent::RewardLocked {
            beneficiary: beneficiary.clone(),
            epoch: record.epoch,
            amount,
            lock_boundary: at,
        });
        debug!(%beneficiary, epoch = record.epoch, %amount, "reward locked");

        self.touch(beneficiary);
        if let Some(window) = self.state.window.as_mut() {
            window.total_locked = total_locked;
            window.rewards_posted += 1;
        }
        let records = self.records.entry(beneficiary.clone()).or_default();
        records.push(record);
        Ok(&records[records.len() - 1])
    }

    /// Close the open window and advance the epoch number.
    pub fn close_distribution(&mut self, at: Boundary) -> Result<EpochClosure, LedgerError> {
        let window = self.state.window.take().ok_or(LedgerError::WindowNotOpen)?;
        if let Some(epoch) = self.state.history.last_mut() {
            epoch.closed_at = Some(at);
        }
        self.state.last_distribution = at;
        self.state.current_epoch += 1;

        self.events.push(RewardEvent::DistributionWindowClosed {
            epoch: window.epoch,
            closed_at: at,
        });
        info!(
            epoch = window.epoch,
            closed_at = %at,
            total_locked = %window.total_locked,
            rewards = window.rewards_posted,
            "distribution window closed"
        );

        Ok(EpochClosure {
            epoch: window.epoch,
            start: window.start,
            end: window.end,
            closed_at: at,
            total_locked: window.total_locked,
            rewards_posted: window.rewards_posted,
        })
    }

    /// Withdraw every locked record of `beneficiary` whose lock time has
    /// elapsed at `now`. A record already withdrawn is never touched again.
    pub fn collect(
        &mut self,
        beneficiary: &AccountId,
        now: Boundary,
    ) -> Result<Collection, LedgerError> {
        let records = self
            .records
            .get(beneficiary)
            .ok_or_else(|| LedgerError::NoRewards(beneficiary.clone()))?;

        let mut amount = TokenAmount::ZERO;
        let mut matured = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            if record.is_collectible(now) {
                amount = amount
                    .checked_add(record.amount)
                    .ok_or(LedgerError::Overflow)?;
                matured.push(idx);
            }
        }
        if matured.is_empty() {
            return Err(LedgerError::NoRewards(beneficiary.clone()));
        }

        self.touch(beneficiary);
        let Some(records) = self.records.get_mut(beneficiary) else {
            return Err(LedgerError::NoRewards(beneficiary.clone()));
        };
        let mut withdrawn = Vec::with_capacity(matured.len());
        for idx in matured {
            let record = &mut records[idx];
            record.state = RewardState::Withdrawn;
            record.withdrawn_at = Some(now);
            withdrawn.push((record.epoch, record.amount));
            self.events.push(RewardEvent::RewardWithdrawn {
                beneficiary: beneficiary.clone(),
                epoch: record.epoch,
                amount: record.amount,
            });
        }
        info!(%beneficiary, %amount, records = withdrawn.len(), "rewards collected");

        Ok(Collection {
            beneficiary: beneficiary.clone(),
            amount,
            withdrawn,
        })
    }

    /// [`collect`](Self::collect) for each beneficiary independently.
    pub fn collect_many(
        &mut self,
        beneficiaries: &[AccountId],
        now: Boundary,
    ) -> Vec<(AccountId, Result<Collection, LedgerError>)> {
        beneficiaries
            .iter()
            .map(|b| (b.clone(), self.collect(b, now)))
            .collect()
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn current_epoch(&self) -> EpochNumber {
        self.state.current_epoch
    }

    pub fn is_open(&self) -> bool {
        self.state.window.is_some()
    }

    pub fn window(&self) -> Option<&DistributionWindow> {
        self.state.window.as_ref()
    }

    /// The epoch whose window is currently open.
    pub fn open_epoch(&self) -> Option<&Epoch> {
        self.state.window.as_ref().and_then(|_| self.state.history.last())
    }

    /// Boundary at which the last window closed, or the initial boundary
    /// before any has.
    pub fn last_distribution_boundary(&self) -> Boundary {
        self.state.last_distribution
    }

    pub fn epoch_history(&self) -> &[Epoch] {
        &self.state.history
    }

    /// Earliest start accepted by the next `open_distribution`: the end of
    /// the previous epoch, and never before the last distribution.
    pub fn next_min_start(&self) -> Boundary {
        let previous_end = self
            .state
            .history
            .last()
            .map(Epoch::end)
            .unwrap_or(Boundary::GENESIS);
        previous_end.max(self.state.last_distribution)
    }

    pub fn rewards_for(&self, beneficiary: &AccountId) -> &[RewardRecord] {
        self.records
            .get(beneficiary)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn locked_rewards(&self, beneficiary: &AccountId) -> Vec<&RewardRecord> {
        self.rewards_in_state(beneficiary, RewardState::Locked)
    }

    pub fn withdrawn_rewards(&self, beneficiary: &AccountId) -> Vec<&RewardRecord> {
        self.rewards_in_state(beneficiary, RewardState::Withdrawn)
    }

    /// Smallest locked amount among records locked at or after `since`.
    pub fn minimum_locked_since(
        &self,
        beneficiary: &AccountId,
        since: Boundary,
    ) -> Option<TokenAmount> {
        self.rewards_for(beneficiary)
            .iter()
            .filter(|r| r.state == RewardState::Locked && r.lock_boundary >= since)
            .map(|r| r.amount)
            .min()
    }

    /// Beneficiaries holding at least one record from `epoch`.
    pub fn posted_beneficiaries(&self, epoch: EpochNumber) -> BTreeSet<AccountId> {
        self.records
            .iter()
            .filter(|(_, records)| records.iter().any(|r| r.epoch == epoch))
            .map(|(account, _)| account.clone())
            .collect()
    }

    /// Sum of all records still locked.
    pub fn total_locked(&self) -> TokenAmount {
        self.records
            .values()
            .flatten()
            .filter(|r| r.state == RewardState::Locked)
            .map(|r| r.amount)
            .sum()
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RewardEvent> {
        std::mem::take(&mut self.events)
    }

    fn rewards_in_state(&self, beneficiary: &AccountId, state: RewardState) -> Vec<&RewardRecord> {
        self.rewards_for(beneficiary)
            .iter()
            .filter(|r| r.state == state)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votereward_types::Percentage;

    fn params() -> RewardParams {
        RewardParams {
            epoch_duration: 20,
            lock_time: 40,
            percentage_reward: Percentage::from_percent(42).unwrap(),
            missing_votes_threshold: 1,
        }
    }

    fn account(n: u64) -> AccountId {
        AccountId::from_index(n)
    }

    fn b(v: u64) -> Boundary {
        Boundary::new(v)
    }

    fn amount(v: u128) -> TokenAmount {
        TokenAmount::new(v)
    }

    #[test]
    fn open_sets_window_from_duration() {
        let mut ledger = EpochLedger::new();
        let epoch = ledger.open_distribution(b(100), &params()).unwrap();
        assert_eq!(epoch.number, 0);
        assert_eq!(epoch.end(), b(120));

        let window = ledger.window().unwrap();
        assert_eq!((window.start, window.end), (b(100), b(120)));
        assert_eq!(
            ledger.drain_events(),
            vec![RewardEvent::DistributionWindowOpened {
                epoch: 0,
                start: b(100),
                end: b(120)
            }]
        );
    }

    #[test]
    fn cannot_open_twice() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        let err = ledger.open_distribution(b(100), &params()).unwrap_err();
        assert_eq!(err, LedgerError::WindowAlreadyOpen(0));
        assert_eq!(ledger.epoch_history().len(), 1);
    }

    #[test]
    fn next_epoch_must_start_after_previous_window() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(100), &params()).unwrap();
        ledger.close_distribution(b(120)).unwrap();

        let err = ledger.open_distribution(b(119), &params()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::EpochOrder {
                start: b(119),
                min_start: b(120)
            }
        );
        assert_eq!(ledger.current_epoch(), 1);
        assert!(!ledger.is_open());

        ledger.open_distribution(b(120), &params()).unwrap();
        assert_eq!(ledger.open_epoch().unwrap().number, 1);
    }

    #[test]
    fn next_epoch_cannot_start_before_last_distribution() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.close_distribution(b(500)).unwrap();
        assert_eq!(ledger.next_min_start(), b(500));

        assert_eq!(
            ledger.open_distribution(b(20), &params()).unwrap_err(),
            LedgerError::EpochOrder {
                start: b(20),
                min_start: b(500)
            }
        );
        ledger.open_distribution(b(500), &params()).unwrap();
    }

    #[test]
    fn first_epoch_cannot_start_before_initial_boundary() {
        let mut ledger = EpochLedger::starting_at(b(50));
        assert_eq!(ledger.last_distribution_boundary(), b(50));
        assert_eq!(
            ledger.open_distribution(b(0), &params()).unwrap_err(),
            LedgerError::EpochOrder {
                start: b(0),
                min_start: b(50)
            }
        );
        assert!(ledger.epoch_history().is_empty());

        let epoch = ledger.open_distribution(b(50), &params()).unwrap();
        assert_eq!(epoch.number, 0);
    }

    #[test]
    fn reopening_same_start_after_close_is_rejected() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(50), &params()).unwrap();
        ledger.close_distribution(b(50)).unwrap();
        assert!(matches!(
            ledger.open_distribution(b(50), &params()),
            Err(LedgerError::EpochOrder { .. })
        ));
    }

    #[test]
    fn invalid_params_are_rejected_without_opening() {
        let mut ledger = EpochLedger::new();
        let bad = RewardParams {
            epoch_duration: 0,
            ..params()
        };
        assert!(matches!(
            ledger.open_distribution(b(0), &bad),
            Err(LedgerError::InvalidParams(_))
        ));
        assert!(!ledger.is_open());
    }

    #[test]
    fn post_requires_open_window() {
        let mut ledger = EpochLedger::new();
        let err = ledger.post_reward(&account(1), amount(10), b(0)).unwrap_err();
        assert_eq!(err, LedgerError::WindowNotOpen);
        assert!(ledger.rewards_for(&account(1)).is_empty());
    }

    #[test]
    fn post_rejects_zero_amount() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        let err = ledger.post_reward(&account(1), TokenAmount::ZERO, b(20)).unwrap_err();
        assert_eq!(err, LedgerError::ZeroAmount);
        assert_eq!(ledger.window().unwrap().rewards_posted, 0);
    }

    #[test]
    fn post_snapshots_lock_time_of_epoch() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        let record = ledger.post_reward(&account(1), amount(420), b(21)).unwrap();
        assert_eq!(record.lock_duration, 40);
        assert_eq!(record.unlocks_at(), b(61));
        assert_eq!(record.state, RewardState::Locked);
    }

    #[test]
    fn posting_twice_creates_two_records() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(10), b(20)).unwrap();
        ledger.post_reward(&account(1), amount(15), b(21)).unwrap();
        assert_eq!(ledger.rewards_for(&account(1)).len(), 2);
        assert_eq!(ledger.window().unwrap().total_locked, amount(25));
    }

    #[test]
    fn close_without_window_fails() {
        let mut ledger = EpochLedger::new();
        assert_eq!(
            ledger.close_distribution(b(0)).unwrap_err(),
            LedgerError::WindowNotOpen
        );
        assert_eq!(ledger.current_epoch(), 0);
    }

    #[test]
    fn close_reports_totals_and_advances_epoch() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        for n in 1..=3 {
            ledger.post_reward(&account(n), amount(420), b(21)).unwrap();
        }
        let closure = ledger.close_distribution(b(22)).unwrap();
        assert_eq!(closure.total_locked, amount(1260));
        assert_eq!(closure.rewards_posted, 3);
        assert_eq!(ledger.current_epoch(), 1);
        assert_eq!(ledger.last_distribution_boundary(), b(22));
        assert!(ledger.epoch_history()[0].is_closed());
        assert_eq!(
            ledger.close_distribution(b(23)).unwrap_err(),
            LedgerError::WindowNotOpen
        );
    }

    #[test]
    fn collect_is_gated_by_lock_time() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(420), b(20)).unwrap();
        ledger.close_distribution(b(20)).unwrap();

        assert_eq!(
            ledger.collect(&account(1), b(59)).unwrap_err(),
            LedgerError::NoRewards(account(1))
        );
        let collection = ledger.collect(&account(1), b(60)).unwrap();
        assert_eq!(collection.amount, amount(420));
        assert_eq!(collection.withdrawn, vec![(0, amount(420))]);
    }

    #[test]
    fn collect_never_withdraws_twice() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(420), b(20)).unwrap();
        ledger.close_distribution(b(20)).unwrap();

        ledger.collect(&account(1), b(100)).unwrap();
        assert_eq!(
            ledger.collect(&account(1), b(1_000)).unwrap_err(),
            LedgerError::NoRewards(account(1))
        );
        let withdrawn = ledger.withdrawn_rewards(&account(1));
        assert_eq!(withdrawn.len(), 1);
        assert_eq!(withdrawn[0].withdrawn_at, Some(b(100)));
        assert_eq!(ledger.total_locked(), TokenAmount::ZERO);
    }

    #[test]
    fn collect_takes_only_matured_records_across_epochs() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(100), b(20)).unwrap();
        ledger.close_distribution(b(20)).unwrap();
        ledger.open_distribution(b(21), &params()).unwrap();
        ledger.post_reward(&account(1), amount(200), b(41)).unwrap();
        ledger.close_distribution(b(41)).unwrap();

        // first unlocks at 60, second at 81
        let first = ledger.collect(&account(1), b(70)).unwrap();
        assert_eq!(first.amount, amount(100));
        assert_eq!(ledger.locked_rewards(&account(1)).len(), 1);
        assert_eq!(ledger.minimum_locked_since(&account(1), b(0)), Some(amount(200)));

        let second = ledger.collect(&account(1), b(81)).unwrap();
        assert_eq!(second.withdrawn, vec![(1, amount(200))]);
    }

    #[test]
    fn collect_many_is_independent_per_beneficiary() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(420), b(20)).unwrap();
        ledger.close_distribution(b(20)).unwrap();

        let results = ledger.collect_many(&[account(2), account(1), account(1)], b(60));
        assert!(matches!(results[0].1, Err(LedgerError::NoRewards(_))));
        assert_eq!(results[1].1.as_ref().unwrap().amount, amount(420));
        assert!(matches!(results[2].1, Err(LedgerError::NoRewards(_))));
    }

    #[test]
    fn posted_beneficiaries_tracks_epoch() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(1), b(20)).unwrap();
        ledger.post_reward(&account(2), amount(1), b(20)).unwrap();
        let posted = ledger.posted_beneficiaries(0);
        assert_eq!(posted.len(), 2);
        assert!(posted.contains(&account(1)));
        assert!(ledger.posted_beneficiaries(1).is_empty());
    }

    #[test]
    fn emits_lifecycle_events_in_order() {
        let mut ledger = EpochLedger::new();
        ledger.open_distribution(b(0), &params()).unwrap();
        ledger.post_reward(&account(1), amount(5), b(20)).unwrap();
        ledger.close_distribution(b(20)).unwrap();
        ledger.collect(&account(1), b(60)).unwrap();

        let events = ledger.drain_events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[1], RewardEvent::RewardLocked { .. }));
        assert_eq!(
            events[3],
            RewardEvent::RewardWithdrawn {
                beneficiary: account(1),
                epoch: 0,
                amount: amount(5)
            }
        );
        assert!(ledger.drain_events().is_empty());
    }
}
