//! Read-only access to the external voting collaborator.

use crate::SourceError;
use serde::{Deserialize, Serialize};
use votereward_types::{AccountId, Boundary, VoteId, VoterState};

/// A vote as recorded by the voting collaborator. Never mutated here.
///
/// Every vote lasts the collaborator-wide [`VoteSource::vote_duration`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: VoteId,
    /// Boundary at which the vote opened; also its balance snapshot point.
    pub start: Boundary,
}

impl VoteRecord {
    /// Boundary at which the vote closes under the given vote duration.
    pub fn closes_at(&self, vote_duration: u64) -> Boundary {
        self.start.offset(vote_duration)
    }
}

/// Source of vote records and per-account participation.
///
/// Votes are numbered `1..=vote_count()` in creation order, so their start
/// boundaries are non-decreasing with the id.
pub trait VoteSource: Send + Sync {
    /// Number of votes ever created.
    fn vote_count(&self) -> Result<u64, SourceError>;

    /// Fetch a single vote by id.
    fn vote(&self, id: VoteId) -> Result<VoteRecord, SourceError>;

    /// How `account` participated in vote `id`.
    fn voter_state(&self, id: VoteId, account: &AccountId) -> Result<VoterState, SourceError>;

    /// Vote duration configured in the voting collaborator.
    fn vote_duration(&self) -> Result<u64, SourceError>;

    /// Votes whose close boundary (`start + vote_duration`) lies in `[from, to]`,
    /// newest first.
    ///
    /// Scans from the newest vote backwards and stops at the first vote that
    /// closed before `from`: every older vote closed no later than it.
    fn votes_in_range(
        &self,
        from: Boundary,
        to: Boundary,
        vote_duration: u64,
    ) -> Result<Vec<VoteRecord>, SourceError> {
        let mut in_window = Vec::new();
        let mut newer_start: Option<Boundary> = None;
        let mut id = self.vote_count()?;

        while id >= 1 {
            let vote = self.vote(id)?;
            if vote.id != id {
                return Err(SourceError::Malformed(format!(
                    "requested vote {id}, got vote {}",
                    vote.id
                )));
            }
            if let Some(newer) = newer_start {
                if vote.start > newer {
                    return Err(SourceError::Malformed(format!(
                        "vote {id} starts at {} after a newer vote starting at {newer}",
                        vote.start
                    )));
                }
            }
            newer_start = Some(vote.start);

            let closes_at = vote.closes_at(vote_duration);
            if closes_at < from {
                break;
            }
            if closes_at <= to {
                in_window.push(vote);
            }
            id -= 1;
        }

        Ok(in_window)
    }
}
