//! Epoch distribution orchestration.
//!
//! The driver opens an epoch's distribution window, evaluates beneficiaries
//! in bounded parallel batches against the read-only vote and balance
//! sources, funnels every result through a single serialized write into the
//! ledger, closes the window, and later releases matured rewards.
//!
//! Every ledger write is staged in the ledger's undo journal, persisted as
//! one batch holding the state and the touched accounts, and rolled back if
//! either step fails, so a failed write leaves the ledger untouched.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, info, warn};

use votereward_ledger::{
    Collection, DistributionWindow, Epoch, EpochClosure, EpochLedger, LedgerError, RewardEvent,
    RewardRecord,
};
use votereward_rewards::{EligibilityEvaluator, RewardCalculator, VoteWindow};
use votereward_store::{BalanceSource, Clock, MetaStore, VaultTransfer, VoteSource};
use votereward_types::{AccountId, Boundary, EpochNumber, RewardParams, TokenAmount};

use crate::config::DriverConfig;
use crate::event_bus::EventBus;
use crate::metrics::DistributionMetrics;
use crate::report::{CollectionReport, DistributionOutcome, DistributionReport, EpochRun};
use crate::DriverError;

/// External collaborators the driver reads from and sends transfers to.
#[derive(Clone)]
pub struct Collaborators {
    pub votes: Arc<dyn VoteSource>,
    pub balances: Arc<dyn BalanceSource>,
    pub vault: Arc<dyn VaultTransfer>,
    pub clock: Arc<dyn Clock>,
}

/// Point-in-time view of the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverStatus {
    pub now: Boundary,
    pub current_epoch: EpochNumber,
    pub window: Option<DistributionWindow>,
    pub last_distribution: Boundary,
    pub next_min_start: Boundary,
    pub total_locked: TokenAmount,
    pub params: RewardParams,
}

type Evaluation = (usize, AccountId, Result<TokenAmount, DriverError>);

pub struct DistributionDriver {
    sources: Collaborators,
    ledger: Mutex<EpochLedger>,
    params: RwLock<RewardParams>,
    store: Option<Arc<dyn MetaStore>>,
    initial_boundary: Boundary,
    batch_size: usize,
    semaphore: Arc<Semaphore>,
    events: EventBus,
    metrics: DistributionMetrics,
}

impl DistributionDriver {
    pub fn new(config: &DriverConfig, sources: Collaborators) -> Result<Self, DriverError> {
        config.validate()?;
        let initial_boundary = Boundary::new(config.initial_boundary);
        Ok(Self {
            sources,
            ledger: Mutex::new(EpochLedger::starting_at(initial_boundary)),
            params: RwLock::new(config.params.clone()),
            store: None,
            initial_boundary,
            batch_size: config.batch_size,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            events: EventBus::new(),
            metrics: DistributionMetrics::new()?,
        })
    }

    /// Persist the ledger to `store` after every write, resuming from the
    /// ledger already saved there. An empty store starts a fresh ledger at
    /// the configured initial boundary.
    pub fn with_store(mut self, store: Arc<dyn MetaStore>) -> Result<Self, DriverError> {
        let ledger = EpochLedger::load_from_store(store.as_ref())?
            .unwrap_or_else(|| EpochLedger::starting_at(self.initial_boundary));
        self.metrics.window_open.set(i64::from(ledger.is_open()));
        info!(
            epoch = ledger.current_epoch(),
            open = ledger.is_open(),
            "ledger restored"
        );
        self.ledger = Mutex::new(ledger);
        self.store = Some(store);
        Ok(self)
    }

    /// Start from an existing ledger instead of an empty one.
    pub fn with_ledger(mut self, ledger: EpochLedger) -> Self {
        self.metrics.window_open.set(i64::from(ledger.is_open()));
        self.ledger = Mutex::new(ledger);
        self
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&RewardEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn metrics(&self) -> &DistributionMetrics {
        &self.metrics
    }

    // ── Parameters ─────────────────────────────────────────────────────

    pub async fn params(&self) -> RewardParams {
        self.params.read().await.clone()
    }

    /// Replace the parameters used for epochs opened from now on.
    pub async fn update_params(&self, params: RewardParams) -> Result<(), DriverError> {
        params.validate()?;
        info!(
            epoch_duration = params.epoch_duration,
            lock_time = params.lock_time,
            percentage_reward = %params.percentage_reward,
            missing_votes_threshold = params.missing_votes_threshold,
            "reward parameters updated"
        );
        *self.params.write().await = params;
        Ok(())
    }

    // ── Epoch cycle ────────────────────────────────────────────────────

    /// Open the distribution window for the current epoch, starting at `start`.
    ///
    /// The epoch must have fully elapsed (`start + epoch_duration ≤ now`) so
    /// every vote in its window has closed.
    pub async fn open_epoch(&self, start: Boundary) -> Result<Epoch, DriverError> {
        let params = self.params().await;
        let now = self.sources.clock.now();
        let epoch = self
            .commit(|ledger| {
                let end = start.offset(params.epoch_duration);
                if !ledger.is_open() && now < end {
                    return Err(DriverError::EpochNotElapsed { end, now });
                }
                Ok(ledger.open_distribution(start, &params)?.clone())
            })
            .await?;
        self.metrics.epochs_opened.inc();
        self.metrics.window_open.set(1);
        Ok(epoch)
    }

    /// Evaluate and post rewards for `beneficiaries` in the open window.
    ///
    /// May be called any number of times while the window is open.
    /// Beneficiaries already posted in this epoch, or repeated in the input,
    /// are reported as [`DriverError::AlreadyDistributed`] and never
    /// re-evaluated. Per-beneficiary failures never abort the batch.
    pub async fn distribute(
        &self,
        beneficiaries: &[AccountId],
    ) -> Result<DistributionReport, DriverError> {
        let (epoch, posted) = {
            let ledger = self.ledger.lock().await;
            let epoch = ledger.open_epoch().cloned().ok_or(LedgerError::WindowNotOpen)?;
            let posted = ledger.posted_beneficiaries(epoch.number);
            (epoch, posted)
        };

        if self.sources.votes.vote_count()? == 0 {
            return Err(DriverError::NoVotes);
        }
        let vote_duration = self.sources.votes.vote_duration()?;
        let window = VoteWindow::new(epoch.start, epoch.end(), vote_duration)?;

        let mut results: Vec<Option<Result<DistributionOutcome, DriverError>>> =
            (0..beneficiaries.len()).map(|_| None).collect();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for (idx, account) in beneficiaries.iter().enumerate() {
            if posted.contains(account) || !seen.insert(account.clone()) {
                results[idx] = Some(Err(DriverError::AlreadyDistributed(account.clone())));
            } else {
                pending.push((idx, account.clone()));
            }
        }

        let evaluations = self.evaluate_all(pending, window, &epoch).await;

        let posted_results = self
            .commit(|ledger| {
                if ledger.open_epoch().map(|e| e.number) != Some(epoch.number) {
                    return Err(DriverError::Ledger(LedgerError::WindowNotOpen));
                }
                let now = self.sources.clock.now();
                let already = ledger.posted_beneficiaries(epoch.number);
                let mut out = Vec::with_capacity(evaluations.len());
                for (idx, account, evaluation) in evaluations {
                    let outcome = match evaluation {
                        Ok(amount) if amount.is_zero() => Ok(DistributionOutcome::Skipped),
                        Ok(_) if already.contains(&account) => {
                            Err(DriverError::AlreadyDistributed(account.clone()))
                        }
                        Ok(amount) => ledger
                            .post_reward(&account, amount, now)
                            .map(|record| DistributionOutcome::Locked {
                                amount: record.amount,
                                lock_boundary: record.lock_boundary,
                            })
                            .map_err(DriverError::from),
                        Err(e) => Err(e),
                    };
                    out.push((idx, outcome));
                }
                Ok(out)
            })
            .await?;

        for (idx, outcome) in posted_results {
            let account = &beneficiaries[idx];
            match &outcome {
                Ok(DistributionOutcome::Locked { amount, .. }) => {
                    self.metrics.rewards_locked.inc();
                    debug!(%account, %amount, "reward posted");
                }
                Ok(DistributionOutcome::Skipped) => {
                    debug!(%account, "zero reward, nothing posted");
                }
                Err(e @ DriverError::TooManyMissingVotes { .. }) => {
                    self.metrics.ineligible_beneficiaries.inc();
                    debug!(%account, error = %e, "beneficiary ineligible");
                }
                Err(e) => {
                    if e.is_source_failure() {
                        self.metrics.source_failures.inc();
                    }
                    warn!(%account, error = %e, "beneficiary not distributed");
                }
            }
            results[idx] = Some(outcome);
        }

        let results = beneficiaries
            .iter()
            .cloned()
            .zip(results)
            .map(|(account, outcome)| {
                let outcome =
                    outcome.unwrap_or_else(|| Err(DriverError::Task("no result produced".into())));
                (account, outcome)
            })
            .collect();
        let report = DistributionReport {
            epoch: epoch.number,
            results,
        };
        info!(
            epoch = epoch.number,
            locked = report.locked_count(),
            skipped = report.skipped_count(),
            failed = report.failures().count(),
            total = %report.total_locked(),
            "distribution batch finished"
        );
        Ok(report)
    }

    /// Close the open window and reserve its total in the vault.
    pub async fn close_epoch(&self) -> Result<EpochClosure, DriverError> {
        let now = self.sources.clock.now();
        let closure = self
            .commit(|ledger| Ok(ledger.close_distribution(now)?))
            .await?;
        if !closure.total_locked.is_zero() {
            self.sources
                .vault
                .reserve(closure.epoch, closure.total_locked);
        }
        self.metrics.epochs_closed.inc();
        self.metrics.window_open.set(0);
        Ok(closure)
    }

    /// Open, distribute to every beneficiary, and close in one call.
    pub async fn run_epoch(
        &self,
        start: Boundary,
        beneficiaries: &[AccountId],
    ) -> Result<EpochRun, DriverError> {
        let epoch = self.open_epoch(start).await?;
        let distribution = self.distribute(beneficiaries).await?;
        let closure = self.close_epoch().await?;
        Ok(EpochRun {
            epoch,
            distribution,
            closure,
        })
    }

    /// Withdraw matured rewards for each beneficiary and request payment.
    ///
    /// Each beneficiary succeeds or fails on its own; a beneficiary with
    /// nothing mature reports [`LedgerError::NoRewards`].
    pub async fn collect(&self, beneficiaries: &[AccountId]) -> Result<CollectionReport, DriverError> {
        let now = self.sources.clock.now();
        let collected = self
            .commit(|ledger| Ok(ledger.collect_many(beneficiaries, now)))
            .await?;

        let results = collected
            .into_iter()
            .map(|(account, result)| {
                let result = result.map_err(DriverError::from);
                if let Ok(collection) = &result {
                    self.sources.vault.request(&account, collection.amount);
                    self.metrics
                        .rewards_withdrawn
                        .inc_by(collection.withdrawn.len() as u64);
                }
                (account, result)
            })
            .collect();
        let report = CollectionReport { results };
        info!(
            collected = report.collected_count(),
            total = %report.total_collected(),
            "collection finished"
        );
        Ok(report)
    }

    /// Collect for a single beneficiary.
    pub async fn collect_one(&self, beneficiary: &AccountId) -> Result<Collection, DriverError> {
        let report = self.collect(std::slice::from_ref(beneficiary)).await?;
        report
            .results
            .into_iter()
            .next()
            .map(|(_, r)| r)
            .unwrap_or_else(|| Err(DriverError::Ledger(LedgerError::NoRewards(beneficiary.clone()))))
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub async fn status(&self) -> DriverStatus {
        let params = self.params().await;
        let ledger = self.ledger.lock().await;
        DriverStatus {
            now: self.sources.clock.now(),
            current_epoch: ledger.current_epoch(),
            window: ledger.window().cloned(),
            last_distribution: ledger.last_distribution_boundary(),
            next_min_start: ledger.next_min_start(),
            total_locked: ledger.total_locked(),
            params,
        }
    }

    pub async fn rewards_for(&self, beneficiary: &AccountId) -> Vec<RewardRecord> {
        self.ledger.lock().await.rewards_for(beneficiary).to_vec()
    }

    /// A copy of the current ledger.
    pub async fn ledger(&self) -> EpochLedger {
        self.ledger.lock().await.clone()
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Evaluate beneficiaries in chunks of `batch_size`, at most
    /// `max_concurrent` chunks at a time, each on a blocking worker.
    async fn evaluate_all(
        &self,
        pending: Vec<(usize, AccountId)>,
        window: VoteWindow,
        epoch: &Epoch,
    ) -> Vec<Evaluation> {
        let mut handles = Vec::new();
        for chunk in pending.chunks(self.batch_size) {
            let chunk = chunk.to_vec();
            let fallback = chunk.clone();
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    handles.push((fallback, Err(e.to_string())));
                    continue;
                }
            };
            let votes = Arc::clone(&self.sources.votes);
            let balances = Arc::clone(&self.sources.balances);
            let epoch = epoch.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let started = Instant::now();
                let evaluations: Vec<Evaluation> = chunk
                    .into_iter()
                    .map(|(idx, account)| {
                        let result = evaluate_beneficiary(
                            votes.as_ref(),
                            balances.as_ref(),
                            &account,
                            &window,
                            &epoch,
                        );
                        (idx, account, result)
                    })
                    .collect();
                (evaluations, started.elapsed())
            });
            handles.push((fallback, Ok(handle)));
        }

        let mut evaluations = Vec::with_capacity(pending.len());
        for (fallback, handle) in handles {
            let joined = match handle {
                Ok(handle) => handle.await.map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            match joined {
                Ok((batch, elapsed)) => {
                    self.metrics
                        .batch_duration_ms
                        .observe(elapsed.as_secs_f64() * 1000.0);
                    evaluations.extend(batch);
                }
                Err(reason) => {
                    warn!(beneficiaries = fallback.len(), %reason, "evaluation batch failed");
                    evaluations.extend(fallback.into_iter().map(|(idx, account)| {
                        (idx, account, Err(DriverError::Task(reason.clone())))
                    }));
                }
            }
        }
        evaluations
    }

    /// Apply `f` as one staged ledger write, persist what it changed, then
    /// publish the events it produced. Any failure rolls the write back.
    async fn commit<T>(
        &self,
        f: impl FnOnce(&mut EpochLedger) -> Result<T, DriverError>,
    ) -> Result<T, DriverError> {
        let mut ledger = self.ledger.lock().await;
        ledger.begin();
        let out = match f(&mut *ledger) {
            Ok(out) => out,
            Err(e) => {
                ledger.rollback();
                return Err(e);
            }
        };
        if let Some(store) = &self.store {
            if let Err(e) = ledger.persist_changes(store.as_ref()) {
                ledger.rollback();
                warn!(error = %e, "ledger write not persisted, rolled back");
                return Err(e.into());
            }
        }
        let events = ledger.finish();
        drop(ledger);
        self.events.emit_all(&events);
        Ok(out)
    }
}

/// Eligibility first, then the minimum-balance reward.
fn evaluate_beneficiary(
    votes: &dyn VoteSource,
    balances: &dyn BalanceSource,
    account: &AccountId,
    window: &VoteWindow,
    epoch: &Epoch,
) -> Result<TokenAmount, DriverError> {
    let threshold = epoch.missing_votes_threshold;
    let eligibility = EligibilityEvaluator::new(votes).evaluate(account, window, threshold)?;
    if !eligibility.eligible {
        return Err(DriverError::TooManyMissingVotes {
            missing: eligibility.missing_votes,
            threshold,
        });
    }
    let current_balance = balances.balance_at(account, window.to)?;
    let reward = RewardCalculator::new(votes, balances).compute_reward(
        account,
        window,
        epoch.percentage_reward,
        current_balance,
        threshold,
    )?;
    Ok(reward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use votereward_nullables::{
        NullBalanceSource, NullClock, NullMetaStore, NullVault, NullVoteSource,
    };
    use votereward_types::{Percentage, VoterState};

    struct Harness {
        votes: Arc<NullVoteSource>,
        balances: Arc<NullBalanceSource>,
        vault: Arc<NullVault>,
        clock: Arc<NullClock>,
        driver: DistributionDriver,
    }

    fn harness() -> Harness {
        let votes = Arc::new(NullVoteSource::new(2));
        let balances = Arc::new(NullBalanceSource::new());
        let vault = Arc::new(NullVault::new());
        let clock = Arc::new(NullClock::new(0));
        let config = DriverConfig {
            batch_size: 2,
            max_concurrent: 2,
            params: RewardParams {
                epoch_duration: 20,
                lock_time: 40,
                percentage_reward: Percentage::from_percent(10).unwrap(),
                missing_votes_threshold: 0,
            },
            ..DriverConfig::default()
        };
        let driver = DistributionDriver::new(
            &config,
            Collaborators {
                votes: votes.clone(),
                balances: balances.clone(),
                vault: vault.clone(),
                clock: clock.clone(),
            },
        )
        .unwrap();
        Harness {
            votes,
            balances,
            vault,
            clock,
            driver,
        }
    }

    fn account(n: u64) -> AccountId {
        AccountId::from_index(n)
    }

    #[tokio::test]
    async fn open_requires_elapsed_epoch() {
        let h = harness();
        h.clock.set(19);
        let err = h.driver.open_epoch(Boundary::GENESIS).await.unwrap_err();
        assert!(matches!(err, DriverError::EpochNotElapsed { .. }));

        h.clock.set(20);
        let epoch = h.driver.open_epoch(Boundary::GENESIS).await.unwrap();
        assert_eq!(epoch.end(), Boundary::new(20));
        assert_eq!(h.driver.metrics().window_open.get(), 1);
    }

    #[tokio::test]
    async fn second_open_reports_window_already_open() {
        let h = harness();
        h.clock.set(100);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();
        let err = h.driver.open_epoch(Boundary::new(20)).await.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Ledger(LedgerError::WindowAlreadyOpen(0))
        ));
    }

    #[tokio::test]
    async fn distribute_without_votes_fails() {
        let h = harness();
        h.clock.set(20);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();
        let err = h.driver.distribute(&[account(1)]).await.unwrap_err();
        assert!(matches!(err, DriverError::NoVotes));
    }

    #[tokio::test]
    async fn distribute_without_window_fails() {
        let h = harness();
        let err = h.driver.distribute(&[account(1)]).await.unwrap_err();
        assert!(matches!(err, DriverError::Ledger(LedgerError::WindowNotOpen)));
    }

    #[tokio::test]
    async fn ineligible_and_zero_rewards_create_no_records() {
        let h = harness();
        let id = h.votes.new_vote(Boundary::new(5));
        h.votes.cast(id, &account(1), VoterState::Yes);
        h.votes.cast(id, &account(2), VoterState::Yes);
        h.balances
            .set_balance(&account(1), Boundary::GENESIS, TokenAmount::new(1000));
        h.balances
            .set_balance(&account(3), Boundary::GENESIS, TokenAmount::new(1000));
        // account 2 holds nothing, account 3 never voted
        h.clock.set(30);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();

        let report = h
            .driver
            .distribute(&[account(1), account(2), account(3)])
            .await
            .unwrap();
        assert_eq!(
            report.results[0].1.as_ref().unwrap(),
            &DistributionOutcome::Locked {
                amount: TokenAmount::new(100),
                lock_boundary: Boundary::new(30)
            }
        );
        assert_eq!(report.results[1].1.as_ref().unwrap(), &DistributionOutcome::Skipped);
        assert!(matches!(
            report.results[2].1,
            Err(DriverError::TooManyMissingVotes {
                missing: 1,
                threshold: 0
            })
        ));
        assert!(h.driver.rewards_for(&account(2)).await.is_empty());
        assert!(h.driver.rewards_for(&account(3)).await.is_empty());
        assert_eq!(h.driver.metrics().ineligible_beneficiaries.get(), 1);
    }

    #[tokio::test]
    async fn repeated_beneficiary_is_not_posted_twice() {
        let h = harness();
        let id = h.votes.new_vote(Boundary::new(5));
        h.votes.cast(id, &account(1), VoterState::No);
        h.balances
            .set_balance(&account(1), Boundary::GENESIS, TokenAmount::new(50));
        h.clock.set(20);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();

        let first = h.driver.distribute(&[account(1), account(1)]).await.unwrap();
        assert_eq!(first.locked_count(), 1);
        assert!(matches!(
            first.results[1].1,
            Err(DriverError::AlreadyDistributed(_))
        ));

        let second = h.driver.distribute(&[account(1)]).await.unwrap();
        assert!(matches!(
            second.results[0].1,
            Err(DriverError::AlreadyDistributed(_))
        ));
        assert_eq!(h.driver.rewards_for(&account(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn source_failure_aborts_only_that_beneficiary() {
        let h = harness();
        let id = h.votes.new_vote(Boundary::new(5));
        for n in 1..=3 {
            h.votes.cast(id, &account(n), VoterState::Yes);
            h.balances
                .set_balance(&account(n), Boundary::GENESIS, TokenAmount::new(10));
        }
        h.balances.fail_for(&account(2));
        h.clock.set(20);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();

        let report = h
            .driver
            .distribute(&[account(1), account(2), account(3)])
            .await
            .unwrap();
        assert_eq!(report.locked_count(), 2);
        assert!(matches!(report.results[1].1, Err(DriverError::Source(_))));
        assert_eq!(h.driver.metrics().source_failures.get(), 1);
    }

    #[tokio::test]
    async fn close_reserves_total_and_collect_pays_out() {
        let h = harness();
        let id = h.votes.new_vote(Boundary::new(5));
        h.votes.cast(id, &account(1), VoterState::Yes);
        h.balances
            .set_balance(&account(1), Boundary::GENESIS, TokenAmount::new(1000));
        h.clock.set(20);
        h.driver.open_epoch(Boundary::GENESIS).await.unwrap();
        h.driver.distribute(&[account(1)]).await.unwrap();

        let closure = h.driver.close_epoch().await.unwrap();
        assert_eq!(closure.total_locked, TokenAmount::new(100));
        assert_eq!(h.vault.total_reserved(), TokenAmount::new(100));

        h.clock.set(59);
        let early = h.driver.collect(&[account(1)]).await.unwrap();
        assert_eq!(early.collected_count(), 0);

        h.clock.set(60);
        let collection = h.driver.collect_one(&account(1)).await.unwrap();
        assert_eq!(collection.amount, TokenAmount::new(100));
        assert_eq!(h.vault.paid_to(&account(1)), TokenAmount::new(100));
        assert!(matches!(
            h.driver.collect_one(&account(1)).await,
            Err(DriverError::Ledger(LedgerError::NoRewards(_)))
        ));
    }

    #[tokio::test]
    async fn params_change_applies_to_next_epoch_only() {
        let h = harness();
        h.clock.set(100);
        let first = h.driver.open_epoch(Boundary::GENESIS).await.unwrap();
        h.driver
            .update_params(RewardParams {
                epoch_duration: 30,
                lock_time: 5,
                ..h.driver.params().await
            })
            .await
            .unwrap();
        assert_eq!(h.driver.status().await.window.unwrap().end, first.end());

        h.driver.close_epoch().await.unwrap();
        h.clock.set(130);
        let second = h.driver.open_epoch(Boundary::new(100)).await.unwrap();
        assert_eq!(second.duration, 30);
        assert_eq!(second.lock_time, 5);
        assert_eq!(first.lock_time, 40);
    }

    #[tokio::test]
    async fn first_epoch_respects_initial_boundary() {
        let h = harness();
        let config = DriverConfig {
            initial_boundary: 30,
            ..DriverConfig::default()
        };
        let driver = DistributionDriver::new(
            &config,
            Collaborators {
                votes: h.votes.clone(),
                balances: h.balances.clone(),
                vault: h.vault.clone(),
                clock: h.clock.clone(),
            },
        )
        .unwrap();
        h.clock.set(100);

        assert_eq!(driver.status().await.next_min_start, Boundary::new(30));
        assert!(matches!(
            driver.open_epoch(Boundary::GENESIS).await,
            Err(DriverError::Ledger(LedgerError::EpochOrder { .. }))
        ));
        let epoch = driver.open_epoch(Boundary::new(30)).await.unwrap();
        assert_eq!(epoch.number, 0);
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_the_write() {
        let h = harness();
        let id = h.votes.new_vote(Boundary::new(5));
        h.votes.cast(id, &account(1), VoterState::Yes);
        h.balances
            .set_balance(&account(1), Boundary::GENESIS, TokenAmount::new(1000));
        let store = Arc::new(NullMetaStore::new());
        let mut driver = h.driver.with_store(store.clone()).unwrap();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        driver.subscribe(Box::new(move |e: &RewardEvent| {
            sink.lock().unwrap().push(e.clone())
        }));
        h.clock.set(20);
        driver.open_epoch(Boundary::GENESIS).await.unwrap();

        store.set_fail_writes(true);
        assert!(matches!(
            driver.distribute(&[account(1)]).await,
            Err(DriverError::Ledger(LedgerError::Storage(_)))
        ));
        assert!(driver.rewards_for(&account(1)).await.is_empty());
        assert_eq!(driver.status().await.window.unwrap().rewards_posted, 0);
        assert_eq!(seen.lock().unwrap().len(), 1);

        store.set_fail_writes(false);
        let report = driver.distribute(&[account(1)]).await.unwrap();
        assert_eq!(report.locked_count(), 1);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_params_update_is_rejected() {
        let h = harness();
        let bad = RewardParams {
            epoch_duration: 0,
            ..RewardParams::default()
        };
        assert!(matches!(
            h.driver.update_params(bad).await,
            Err(DriverError::InvalidParams(_))
        ));
        assert_eq!(h.driver.params().await.epoch_duration, 20);
    }
}
