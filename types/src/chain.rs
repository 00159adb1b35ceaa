//! Connected-chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a connected (external) chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub i64);

impl ChainId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Big-endian, sign-flipped encoding so that byte order matches numeric order.
    pub fn to_key_bytes(&self) -> [u8; 8] {
        ((self.0 as u64) ^ (1 << 63)).to_be_bytes()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChainId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
