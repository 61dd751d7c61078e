//! The vote window an epoch is evaluated over.

use crate::error::RewardError;
use serde::{Deserialize, Serialize};
use votereward_store::{SourceError, VoteRecord, VoteSource};
use votereward_types::Boundary;

/// An inclusive `[from, to]` window plus the vote duration used to decide
/// which votes closed inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWindow {
    pub from: Boundary,
    pub to: Boundary,
    pub vote_duration: u64,
}

impl VoteWindow {
    pub fn new(from: Boundary, to: Boundary, vote_duration: u64) -> Result<Self, RewardError> {
        if to < from {
            return Err(RewardError::InvertedWindow {
                from: from.value(),
                to: to.value(),
            });
        }
        Ok(Self {
            from,
            to,
            vote_duration,
        })
    }

    /// Whether `vote` closes inside this window.
    pub fn contains(&self, vote: &VoteRecord) -> bool {
        let closes_at = vote.closes_at(self.vote_duration);
        closes_at >= self.from && closes_at <= self.to
    }

    /// In-window votes from `source`, newest first.
    pub fn votes(&self, source: &dyn VoteSource) -> Result<Vec<VoteRecord>, SourceError> {
        source.votes_in_range(self.from, self.to, self.vote_duration)
    }
}
