//! Eligibility from vote participation.

use crate::error::RewardError;
use crate::window::VoteWindow;
use serde::{Deserialize, Serialize};
use votereward_store::VoteSource;
use votereward_types::{AccountId, Boundary, VoteId, VoterState};

/// How an account took part in one in-window vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteParticipation {
    pub vote_id: VoteId,
    pub start: Boundary,
    pub state: VoterState,
}

/// Verdict for one account over one window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub missing_votes: u64,
    /// In-window votes, newest first.
    pub votes_in_window: Vec<VoteParticipation>,
}

impl Eligibility {
    pub fn total_votes(&self) -> u64 {
        self.votes_in_window.len() as u64
    }

    pub fn votes_cast(&self) -> u64 {
        self.total_votes() - self.missing_votes
    }
}

/// Decides whether an account voted in enough of an epoch's votes.
///
/// An account is eligible when `missing_votes ≤ missing_votes_threshold`.
/// A window with no votes carries no obligation, so every account is
/// eligible for it.
pub struct EligibilityEvaluator<'a> {
    votes: &'a dyn VoteSource,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(votes: &'a dyn VoteSource) -> Self {
        Self { votes }
    }

    pub fn evaluate(
        &self,
        account: &AccountId,
        window: &VoteWindow,
        missing_votes_threshold: u64,
    ) -> Result<Eligibility, RewardError> {
        let mut missing_votes = 0u64;
        let mut votes_in_window = Vec::new();

        for vote in window.votes(self.votes)? {
            let state = self.votes.voter_state(vote.id, account)?;
            if !state.has_voted() {
                missing_votes += 1;
            }
            votes_in_window.push(VoteParticipation {
                vote_id: vote.id,
                start: vote.start,
                state,
            });
        }

        Ok(Eligibility {
            eligible: missing_votes <= missing_votes_threshold,
            missing_votes,
            votes_in_window,
        })
    }
}
