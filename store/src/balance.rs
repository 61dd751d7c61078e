//! Historical token balances.

use crate::SourceError;
use votereward_types::{AccountId, Boundary, TokenAmount};

/// Source of historical voting-token balances ("balance of at").
pub trait BalanceSource: Send + Sync {
    /// Balance held by `account` at `boundary`.
    fn balance_at(&self, account: &AccountId, boundary: Boundary)
        -> Result<TokenAmount, SourceError>;
}
