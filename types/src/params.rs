//! Reward parameters: the configuration surface read by the engine.
//!
//! Each field may change between epochs. An epoch snapshots the parameters
//! when its distribution window opens, so changes never affect a window
//! already in progress or a reward already locked.

use crate::error::TypesError;
use crate::percentage::Percentage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Length of an epoch window, in boundary units.
    #[serde(default = "default_epoch_duration")]
    pub epoch_duration: u64,

    /// Delay between a reward being locked and becoming collectible.
    #[serde(default = "default_lock_time")]
    pub lock_time: u64,

    /// Share of the minimum balance paid as reward (1e18 = 100%).
    #[serde(default = "default_percentage_reward")]
    pub percentage_reward: Percentage,

    /// Maximum number of in-window votes an account may skip and stay eligible.
    #[serde(default = "default_missing_votes_threshold")]
    pub missing_votes_threshold: u64,
}

fn default_epoch_duration() -> u64 {
    20
}

fn default_lock_time() -> u64 {
    40
}

fn default_percentage_reward() -> Percentage {
    Percentage::from_percent(42).unwrap_or(Percentage::ZERO)
}

fn default_missing_votes_threshold() -> u64 {
    1
}

impl RewardParams {
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.epoch_duration == 0 {
            return Err(TypesError::ZeroEpochDuration);
        }
        Ok(())
    }
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            epoch_duration: default_epoch_duration(),
            lock_time: default_lock_time(),
            percentage_reward: default_percentage_reward(),
            missing_votes_threshold: default_missing_votes_threshold(),
        }
    }
}
