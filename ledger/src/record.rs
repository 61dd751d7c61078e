//! Reward records and collections.

use serde::{Deserialize, Serialize};
use votereward_types::{AccountId, Boundary, EpochNumber, RewardState, TokenAmount};

/// A reward computed for one beneficiary in one epoch.
///
/// Moves `Locked → Withdrawn` exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub beneficiary: AccountId,
    pub epoch: EpochNumber,
    pub amount: TokenAmount,
    /// Boundary at which the reward was posted.
    pub lock_boundary: Boundary,
    pub lock_duration: u64,
    pub state: RewardState,
    pub withdrawn_at: Option<Boundary>,
}

impl RewardRecord {
    /// Boundary from which the record may be collected.
    pub fn unlocks_at(&self) -> Boundary {
        self.lock_boundary.offset(self.lock_duration)
    }

    /// Locked and past its lock time at `now`.
    pub fn is_collectible(&self, now: Boundary) -> bool {
        self.state == RewardState::Locked
            && self.lock_boundary.has_elapsed(self.lock_duration, now)
    }
}

/// Result of a successful collection for one beneficiary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub beneficiary: AccountId,
    pub amount: TokenAmount,
    /// `(epoch, amount)` of every record withdrawn.
    pub withdrawn: Vec<(EpochNumber, TokenAmount)>,
}
