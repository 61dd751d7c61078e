//! Account identifier for voters and reward beneficiaries.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A governance participant, rendered as a `0x`-prefixed 20-byte hex address.
///
/// Stored lowercase so that the same account always maps to the same key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits after the prefix.
    pub const HEX_LEN: usize = 40;

    /// Create an account id from a raw string without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_ascii_lowercase())
    }

    /// Parse and validate an account id.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let account = Self::new(raw);
        if account.is_valid() {
            Ok(account)
        } else {
            Err(TypesError::InvalidAccount(raw.to_string()))
        }
    }

    /// Deterministic account for tests and fixtures: `0x000…0n`.
    pub fn from_index(n: u64) -> Self {
        Self(format!("{}{:0>40x}", Self::PREFIX, n))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this account is a well-formed hex address.
    pub fn is_valid(&self) -> bool {
        match self.0.strip_prefix(Self::PREFIX) {
            Some(hex) => hex.len() == Self::HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => false,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
