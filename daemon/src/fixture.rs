//! JSON fixtures describing the external world: the current boundary, the
//! vote history and per-account balance checkpoints.
//!
//! ```json
//! {
//!   "now": 25,
//!   "vote_duration": 5,
//!   "votes": [
//!     { "start": 1, "voters": { "0x…01": "yes", "0x…02": "no" } }
//!   ],
//!   "balances": {
//!     "0x…01": [[0, 1000], [2, 1010]]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;

use votereward_nullables::{NullBalanceSource, NullClock, NullVault, NullVoteSource};
use votereward_node::Collaborators;
use votereward_types::{AccountId, Boundary, TokenAmount, VoterState};

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub now: u64,
    pub vote_duration: u64,
    #[serde(default)]
    pub votes: Vec<FixtureVote>,
    #[serde(default)]
    pub balances: BTreeMap<String, Vec<(u64, u128)>>,
    /// Accounts to distribute to and collect for; every account with a
    /// balance history when omitted.
    #[serde(default)]
    pub beneficiaries: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureVote {
    pub start: u64,
    #[serde(default)]
    pub voters: BTreeMap<String, VoterState>,
}

/// Nullable collaborators populated from a fixture. The vault is kept
/// concrete so its requests can be reported.
pub struct FixtureWorld {
    pub collaborators: Collaborators,
    pub vault: Arc<NullVault>,
    pub clock: Arc<NullClock>,
    pub beneficiaries: Vec<AccountId>,
}

impl Fixture {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn build(&self) -> anyhow::Result<FixtureWorld> {
        let votes = Arc::new(NullVoteSource::new(self.vote_duration));
        let mut last_start = 0;
        for vote in &self.votes {
            if vote.start < last_start {
                bail!("votes must be listed in start order ({} after {last_start})", vote.start);
            }
            last_start = vote.start;
            let id = votes.new_vote(Boundary::new(vote.start));
            for (account, state) in &vote.voters {
                votes.cast(id, &parse_account(account)?, *state);
            }
        }

        let balances = Arc::new(NullBalanceSource::new());
        let mut holders = Vec::new();
        for (account, checkpoints) in &self.balances {
            let account = parse_account(account)?;
            for (at, amount) in checkpoints {
                balances.set_balance(&account, Boundary::new(*at), TokenAmount::new(*amount));
            }
            holders.push(account);
        }

        let beneficiaries = match &self.beneficiaries {
            Some(list) => list
                .iter()
                .map(|a| parse_account(a))
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => holders,
        };

        let vault = Arc::new(NullVault::new());
        let clock = Arc::new(NullClock::new(self.now));
        Ok(FixtureWorld {
            collaborators: Collaborators {
                votes,
                balances,
                vault: vault.clone(),
                clock: clock.clone(),
            },
            vault,
            clock,
            beneficiaries,
        })
    }
}

pub fn parse_account(s: &str) -> anyhow::Result<AccountId> {
    AccountId::parse(s).with_context(|| format!("invalid account '{s}'"))
}
