//! Minimum-balance reward sizing.

use crate::error::RewardError;
use crate::window::VoteWindow;
use serde::{Deserialize, Serialize};
use tracing::trace;
use votereward_store::{BalanceSource, VoteSource};
use votereward_types::{AccountId, Percentage, TokenAmount, VoteId};

/// Why a computation ended the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardOutcome {
    /// Reward derived from the minimum balance (may still round to zero).
    Computed,
    /// The account held nothing at the snapshot of this vote.
    ZeroBalance { vote_id: VoteId },
    /// The account skipped more in-window votes than the threshold allows.
    TooManyMissingVotes { missing: u64, threshold: u64 },
}

/// Full result of a reward computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAssessment {
    pub reward: TokenAmount,
    /// Smallest balance seen before the scan ended.
    pub minimum_balance: TokenAmount,
    /// Missing votes seen before the scan ended.
    pub missing_votes: u64,
    /// In-window votes inspected.
    pub votes_scanned: u64,
    pub outcome: RewardOutcome,
}

/// Computes `round(minimum_balance × percentage)` for an account over a window.
///
/// The minimum starts at `current_balance` (the balance at the end of the
/// window) and is lowered by the balance at every in-window vote's snapshot.
/// A zero snapshot balance or too many missing votes short-circuits to a
/// zero reward. Windows without votes pay on `current_balance` alone.
pub struct RewardCalculator<'a> {
    votes: &'a dyn VoteSource,
    balances: &'a dyn BalanceSource,
}

impl<'a> RewardCalculator<'a> {
    pub fn new(votes: &'a dyn VoteSource, balances: &'a dyn BalanceSource) -> Self {
        Self { votes, balances }
    }

    pub fn compute_reward(
        &self,
        account: &AccountId,
        window: &VoteWindow,
        percentage: Percentage,
        current_balance: TokenAmount,
        missing_votes_threshold: u64,
    ) -> Result<TokenAmount, RewardError> {
        self.assess(
            account,
            window,
            percentage,
            current_balance,
            missing_votes_threshold,
        )
        .map(|assessment| assessment.reward)
    }

    pub fn assess(
        &self,
        account: &AccountId,
        window: &VoteWindow,
        percentage: Percentage,
        current_balance: TokenAmount,
        missing_votes_threshold: u64,
    ) -> Result<RewardAssessment, RewardError> {
        let mut minimum_balance = current_balance;
        let mut missing_votes = 0u64;
        let mut votes_scanned = 0u64;

        for vote in window.votes(self.votes)? {
            votes_scanned += 1;

            let balance = self.balances.balance_at(account, vote.start)?;
            if balance.is_zero() {
                trace!(%account, vote_id = vote.id, "zero balance at vote snapshot");
                return Ok(RewardAssessment {
                    reward: TokenAmount::ZERO,
                    minimum_balance: TokenAmount::ZERO,
                    missing_votes,
                    votes_scanned,
                    outcome: RewardOutcome::ZeroBalance { vote_id: vote.id },
                });
            }

            if !self.votes.voter_state(vote.id, account)?.has_voted() {
                missing_votes += 1;
                if missing_votes > missing_votes_threshold {
                    trace!(%account, missing_votes, "missing votes threshold exceeded");
                    return Ok(RewardAssessment {
                        reward: TokenAmount::ZERO,
                        minimum_balance,
                        missing_votes,
                        votes_scanned,
                        outcome: RewardOutcome::TooManyMissingVotes {
                            missing: missing_votes,
                            threshold: missing_votes_threshold,
                        },
                    });
                }
            }

            minimum_balance = minimum_balance.min(balance);
        }

        Ok(RewardAssessment {
            reward: percentage.apply(minimum_balance),
            minimum_balance,
            missing_votes,
            votes_scanned,
            outcome: RewardOutcome::Computed,
        })
    }
}
