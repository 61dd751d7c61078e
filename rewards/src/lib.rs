//! Reward computation for governance participants.
//!
//! For one account and one epoch window this crate answers two questions:
//! - Eligibility: did the account vote in enough of the votes that closed
//!   inside the window? (`missing_votes ≤ missing_votes_threshold`)
//! - Reward size: `round(minimum_balance × percentage_reward)`, where the
//!   minimum is taken over the account's balance at every in-window vote's
//!   snapshot and its balance at the end of the window.
//!
//! Both are pure reads over the `VoteSource` and `BalanceSource`
//! collaborators and can run in parallel across beneficiaries.

pub mod calculator;
pub mod eligibility;
pub mod error;
pub mod window;

pub use calculator::{RewardAssessment, RewardCalculator, RewardOutcome};
pub use eligibility::{Eligibility, EligibilityEvaluator, VoteParticipation};
pub use error::RewardError;
pub use window::VoteWindow;
