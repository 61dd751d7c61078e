//! Side-effect requests to the external reward vault.

use votereward_types::{AccountId, EpochNumber, TokenAmount};

/// Reward vault collaborator. Calls are fire-and-forget: the vault owns
/// retries and failure reporting for the actual transfers.
pub trait VaultTransfer: Send + Sync {
    /// Move the total locked for `epoch` into the rewards vault.
    fn reserve(&self, epoch: EpochNumber, amount: TokenAmount);

    /// Pay `amount` out of the rewards vault to `beneficiary`.
    fn request(&self, beneficiary: &AccountId, amount: TokenAmount);
}
