//! Voting-rewards distribution driver.
//!
//! Wires the vote and balance sources, the reward calculator and the epoch
//! ledger together:
//! - Opens an epoch's distribution window once the epoch has elapsed
//! - Evaluates beneficiaries in bounded parallel batches
//! - Posts rewards through a single serialized ledger write path
//! - Reserves each epoch's total in the vault on close
//! - Releases matured rewards and requests payment

pub mod config;
pub mod driver;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod metrics;
pub mod report;

pub use config::DriverConfig;
pub use driver::{Collaborators, DistributionDriver, DriverStatus};
pub use error::DriverError;
pub use event_bus::EventBus;
pub use logging::{init_logging, LogFormat};
pub use metrics::DistributionMetrics;
pub use report::{CollectionReport, DistributionOutcome, DistributionReport, EpochRun};
