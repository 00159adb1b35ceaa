//! Block height of the ledger running the observer module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger block height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(i64);

impl BlockHeight {
    pub const GENESIS: Self = Self(0);

    /// Sentinel for "never": a keygen scheduled at this height is never retried.
    pub const NEVER: Self = Self(i64::MAX);

    pub fn new(height: i64) -> Self {
        Self(height)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// The height `blocks` blocks earlier, saturating at `i64::MIN`.
    pub fn saturating_sub(&self, blocks: i64) -> Self {
        Self(self.0.saturating_sub(blocks))
    }

    pub fn saturating_add(&self, blocks: i64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    /// Order-preserving key encoding (big-endian with the sign bit flipped).
    pub fn to_key_bytes(&self) -> [u8; 8] {
        ((self.0 as u64) ^ (1 << 63)).to_be_bytes()
    }

    pub fn from_key_bytes(bytes: [u8; 8]) -> Self {
        Self((u64::from_be_bytes(bytes) ^ (1 << 63)) as i64)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BlockHeight {
    fn from(height: i64) -> Self {
        Self(height)
    }
}
