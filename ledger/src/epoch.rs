//! Epochs and distribution windows.

use serde::{Deserialize, Serialize};
use votereward_types::{Boundary, EpochNumber, Percentage, RewardParams, TokenAmount};

/// One accounting window. Parameters are snapshotted when the window opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub number: EpochNumber,
    pub start: Boundary,
    pub duration: u64,
    pub lock_time: u64,
    pub percentage_reward: Percentage,
    pub missing_votes_threshold: u64,
    /// Set once the distribution window closes; the epoch is immutable after.
    pub closed_at: Option<Boundary>,
}

impl Epoch {
    pub fn new(number: EpochNumber, start: Boundary, params: &RewardParams) -> Self {
        Self {
            number,
            start,
            duration: params.epoch_duration,
            lock_time: params.lock_time,
            percentage_reward: params.percentage_reward,
            missing_votes_threshold: params.missing_votes_threshold,
            closed_at: None,
        }
    }

    /// End of the epoch window (inclusive), and the earliest start of the next epoch.
    pub fn end(&self) -> Boundary {
        self.start.offset(self.duration)
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// The open distribution window. At most one exists at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionWindow {
    pub epoch: EpochNumber,
    pub start: Boundary,
    pub end: Boundary,
    /// Sum of rewards posted so far in this window.
    pub total_locked: TokenAmount,
    /// Number of reward records posted so far in this window.
    pub rewards_posted: u64,
}

/// Summary returned when a window closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClosure {
    pub epoch: EpochNumber,
    pub start: Boundary,
    pub end: Boundary,
    pub closed_at: Boundary,
    pub total_locked: TokenAmount,
    pub rewards_posted: u64,
}
