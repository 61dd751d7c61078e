//! State enums for voter participation and reward records.

use serde::{Deserialize, Serialize};

/// How an account participated in a single vote.
///
/// Only the distinction between `Absent` and having voted matters for
/// reward eligibility; the direction is kept for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoterState {
    /// The account did not cast a vote.
    Absent,
    /// The account voted in favour.
    Yes,
    /// The account voted against.
    No,
}

impl VoterState {
    pub fn has_voted(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Lifecycle state of a reward record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardState {
    /// Computed and waiting for its lock time to elapse.
    Locked,
    /// Collected and transferred to the beneficiary. Terminal.
    Withdrawn,
}
