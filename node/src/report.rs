//! Per-beneficiary results of batched driver operations.

use votereward_ledger::{Collection, Epoch, EpochClosure};
use votereward_types::{AccountId, Boundary, EpochNumber, TokenAmount};

use crate::DriverError;

/// What happened to one beneficiary during distribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistributionOutcome {
    /// A reward record was locked in the ledger.
    Locked {
        amount: TokenAmount,
        lock_boundary: Boundary,
    },
    /// Eligible, but the reward came out as zero; nothing was posted.
    Skipped,
}

/// Results of one `distribute` call, in input order.
#[derive(Debug)]
pub struct DistributionReport {
    pub epoch: EpochNumber,
    pub results: Vec<(AccountId, Result<DistributionOutcome, DriverError>)>,
}

impl DistributionReport {
    pub fn total_locked(&self) -> TokenAmount {
        self.results
            .iter()
            .filter_map(|(_, r)| match r {
                Ok(DistributionOutcome::Locked { amount, .. }) => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn locked_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(DistributionOutcome::Locked { .. })))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(DistributionOutcome::Skipped)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&AccountId, &DriverError)> {
        self.results
            .iter()
            .filter_map(|(account, r)| r.as_ref().err().map(|e| (account, e)))
    }

    pub fn outcome_for(&self, account: &AccountId) -> Option<&Result<DistributionOutcome, DriverError>> {
        self.results
            .iter()
            .find(|(a, _)| a == account)
            .map(|(_, r)| r)
    }
}

/// Results of one `collect` call, in input order.
#[derive(Debug)]
pub struct CollectionReport {
    pub results: Vec<(AccountId, Result<Collection, DriverError>)>,
}

impl CollectionReport {
    pub fn total_collected(&self) -> TokenAmount {
        self.results
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok().map(|c| c.amount))
            .sum()
    }

    pub fn collected_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

/// A full open → distribute → close cycle.
#[derive(Debug)]
pub struct EpochRun {
    pub epoch: Epoch,
    pub distribution: DistributionReport,
    pub closure: EpochClosure,
}
