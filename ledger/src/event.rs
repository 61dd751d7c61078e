//! Domain events emitted by the epoch ledger.

use serde::{Deserialize, Serialize};
use votereward_types::{AccountId, Boundary, EpochNumber, TokenAmount};

/// Events for observers (logs, UIs, indexers). The engine never consumes them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RewardEvent {
    DistributionWindowOpened {
        epoch: EpochNumber,
        start: Boundary,
        end: Boundary,
    },
    DistributionWindowClosed {
        epoch: EpochNumber,
        closed_at: Boundary,
    },
    RewardLocked {
        beneficiary: AccountId,
        epoch: EpochNumber,
        amount: TokenAmount,
        lock_boundary: Boundary,
    },
    RewardWithdrawn {
        beneficiary: AccountId,
        epoch: EpochNumber,
        amount: TokenAmount,
    },
}
