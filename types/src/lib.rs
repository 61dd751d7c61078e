//! Fundamental types for the voting rewards engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! accounts, boundaries, token amounts, fixed-point percentages, identifiers,
//! reward parameters, and state enums.

pub mod account;
pub mod amount;
pub mod boundary;
pub mod error;
pub mod params;
pub mod percentage;
pub mod state;

pub use account::AccountId;
pub use amount::TokenAmount;
pub use boundary::Boundary;
pub use error::TypesError;
pub use params::RewardParams;
pub use percentage::{Percentage, PCT_BASE};
pub use state::{RewardState, VoterState};

/// Sequential epoch number. The first distribution cycle is epoch 0.
pub type EpochNumber = u64;

/// Identifier of a vote in the external voting collaborator (1-based).
pub type VoteId = u64;
