//! Epoch ledger for voting rewards.
//!
//! Epochs open a single distribution window in strict order; rewards posted
//! into the window are locked for the epoch's lock time and then withdrawn
//! exactly once by their beneficiary.

pub mod epoch;
pub mod error;
pub mod event;
mod journal;
pub mod ledger;
pub mod record;
pub mod snapshot;

pub use epoch::{DistributionWindow, Epoch, EpochClosure};
pub use error::LedgerError;
pub use event::RewardEvent;
pub use ledger::EpochLedger;
pub use record::{Collection, RewardRecord};
pub use snapshot::{RECORDS_PREFIX, STATE_KEY};
