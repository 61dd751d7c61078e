//! Nullable vault: records transfer requests instead of moving tokens.

use serde::Serialize;
use std::sync::Mutex;
use votereward_store::VaultTransfer;
use votereward_types::{AccountId, EpochNumber, TokenAmount};

/// A request observed by the [`NullVault`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VaultRequest {
    Reserve {
        epoch: EpochNumber,
        amount: TokenAmount,
    },
    Pay {
        beneficiary: AccountId,
        amount: TokenAmount,
    },
}

#[derive(Default)]
pub struct NullVault {
    requests: Mutex<Vec<VaultRequest>>,
}

impl NullVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request in the order it was made.
    pub fn requests(&self) -> Vec<VaultRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Sum of all `reserve` requests.
    pub fn total_reserved(&self) -> TokenAmount {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| match r {
                VaultRequest::Reserve { amount, .. } => Some(*amount),
                VaultRequest::Pay { .. } => None,
            })
            .sum()
    }

    /// Sum of all payments made to `beneficiary`.
    pub fn paid_to(&self, beneficiary: &AccountId) -> TokenAmount {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| match r {
                VaultRequest::Pay {
                    beneficiary: b,
                    amount,
                } if b == beneficiary => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

impl VaultTransfer for NullVault {
    fn reserve(&self, epoch: EpochNumber, amount: TokenAmount) {
        self.requests
            .lock()
            .unwrap()
            .push(VaultRequest::Reserve { epoch, amount });
    }

    fn request(&self, beneficiary: &AccountId, amount: TokenAmount) {
        self.requests.lock().unwrap().push(VaultRequest::Pay {
            beneficiary: beneficiary.clone(),
            amount,
        });
    }
}
