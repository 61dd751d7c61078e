//! Nullable voting collaborator.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use votereward_store::{SourceError, VoteRecord, VoteSource};
use votereward_types::{AccountId, Boundary, VoteId, VoterState};

/// In-memory vote history.
///
/// Votes are appended in creation order; accounts that never cast a vote
/// read back as [`VoterState::Absent`].
pub struct NullVoteSource {
    duration: u64,
    votes: Mutex<Vec<VoteRecord>>,
    states: Mutex<HashMap<(VoteId, AccountId), VoterState>>,
    failing: Mutex<HashSet<AccountId>>,
}

impl NullVoteSource {
    pub fn new(duration: u64) -> Self {
        Self {
            duration,
            votes: Mutex::new(Vec::new()),
            states: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Create a vote starting at `start`; returns its id.
    pub fn new_vote(&self, start: Boundary) -> VoteId {
        let mut votes = self.votes.lock().unwrap();
        let id = votes.len() as VoteId + 1;
        votes.push(VoteRecord { id, start });
        id
    }

    /// Record how `account` voted on `id`.
    pub fn cast(&self, id: VoteId, account: &AccountId, state: VoterState) {
        self.states
            .lock()
            .unwrap()
            .insert((id, account.clone()), state);
    }

    /// Make every participation lookup for `account` fail as unavailable.
    pub fn fail_for(&self, account: &AccountId) {
        self.failing.lock().unwrap().insert(account.clone());
    }
}

impl VoteSource for NullVoteSource {
    fn vote_count(&self) -> Result<u64, SourceError> {
        Ok(self.votes.lock().unwrap().len() as u64)
    }

    fn vote(&self, id: VoteId) -> Result<VoteRecord, SourceError> {
        let votes = self.votes.lock().unwrap();
        id.checked_sub(1)
            .and_then(|idx| votes.get(idx as usize))
            .cloned()
            .ok_or(SourceError::VoteNotFound(id))
    }

    fn voter_state(&self, id: VoteId, account: &AccountId) -> Result<VoterState, SourceError> {
        if self.failing.lock().unwrap().contains(account) {
            return Err(SourceError::Unavailable(format!(
                "voter state of {account} in vote {id}"
            )));
        }
        if id == 0 || id > self.vote_count()? {
            return Err(SourceError::VoteNotFound(id));
        }
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(&(id, account.clone()))
            .copied()
            .unwrap_or(VoterState::Absent))
    }

    fn vote_duration(&self) -> Result<u64, SourceError> {
        Ok(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(votes: &[VoteRecord]) -> Vec<VoteId> {
        votes.iter().map(|v| v.id).collect()
    }

    #[test]
    fn unknown_voter_is_absent() {
        let source = NullVoteSource::new(5);
        let id = source.new_vote(Boundary::new(10));
        let state = source.voter_state(id, &AccountId::from_index(1)).unwrap();
        assert_eq!(state, VoterState::Absent);
    }

    #[test]
    fn unknown_vote_is_an_error() {
        let source = NullVoteSource::new(5);
        assert_eq!(source.vote(1), Err(SourceError::VoteNotFound(1)));
        assert_eq!(source.vote(0), Err(SourceError::VoteNotFound(0)));
    }

    #[test]
    fn votes_in_range_uses_close_boundary_inclusively() {
        let source = NullVoteSource::new(5);
        // closes at 9, 10, 15, 20, 21
        for start in [4, 5, 10, 15, 16] {
            source.new_vote(Boundary::new(start));
        }
        let votes = source
            .votes_in_range(Boundary::new(10), Boundary::new(20), 5)
            .unwrap();
        assert_eq!(ids(&votes), vec![4, 3, 2]);
    }

    #[test]
    fn votes_in_range_stops_at_first_vote_closed_before_window() {
        let source = NullVoteSource::new(5);
        for start in [1, 2, 30, 31] {
            source.new_vote(Boundary::new(start));
        }
        let votes = source
            .votes_in_range(Boundary::new(30), Boundary::new(40), 5)
            .unwrap();
        assert_eq!(ids(&votes), vec![4, 3]);
    }

    #[test]
    fn votes_in_range_rejects_out_of_order_history() {
        let source = NullVoteSource::new(5);
        source.new_vote(Boundary::new(50));
        source.new_vote(Boundary::new(10));
        let result = source.votes_in_range(Boundary::new(0), Boundary::new(100), 5);
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }

    #[test]
    fn empty_history_has_no_votes_in_range() {
        let source = NullVoteSource::new(5);
        let votes = source
            .votes_in_range(Boundary::new(0), Boundary::new(100), 5)
            .unwrap();
        assert!(votes.is_empty());
    }
}
