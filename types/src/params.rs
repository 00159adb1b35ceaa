//! Observer module parameters.
//!
//! Per-chain values (support flag, ballot threshold) live in the chain
//! parameter list; these are the module-wide knobs.

use crate::Threshold;
use serde::{Deserialize, Serialize};

/// Module-wide parameters of the observer core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverParams {
    /// Number of blocks after creation at which a ballot is pruned,
    /// whatever its status.
    #[serde(default = "default_ballot_maturity_blocks")]
    pub ballot_maturity_blocks: i64,

    /// Threshold for keysign blame ballots. Lower than the observation
    /// threshold: a minority report of a failed signing round is enough.
    #[serde(default = "default_blame_threshold")]
    pub blame_threshold: Threshold,

    /// Minimum self-delegated tokens an observer's validator must keep to
    /// remain in the observer set.
    #[serde(default = "default_min_observer_delegation")]
    pub min_observer_delegation: u128,
}

fn default_ballot_maturity_blocks() -> i64 {
    100
}

fn default_blame_threshold() -> Threshold {
    // 0.34: strictly more than a third of the observers.
    Threshold::from_bps(3400).unwrap_or(Threshold::ONE)
}

fn default_min_observer_delegation() -> u128 {
    // 10 whole tokens at 18 decimals.
    10 * 1_000_000_000_000_000_000
}

impl Default for ObserverParams {
    fn default() -> Self {
        Self {
            ballot_maturity_blocks: default_ballot_maturity_blocks(),
            blame_threshold: default_blame_threshold(),
            min_observer_delegation: default_min_observer_delegation(),
        }
    }
}
