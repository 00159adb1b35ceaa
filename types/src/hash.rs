//! Observation digests.

use crate::TypeError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte Blake2b digest identifying an observed fact.
///
/// Ballot identifiers are the lowercase hex rendering of a digest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a single byte string.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidDigest(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidDigest(format!("expected 32 bytes: {s}")))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Canonical digest of a multi-field message.
///
/// Every field is length-prefixed, so `("ab", "c")` and `("a", "bc")` hash
/// differently. Field order is part of the digest.
pub struct DigestBuilder {
    hasher: Blake2b256,
}

impl DigestBuilder {
    /// Start a digest under a domain tag (e.g. `"inbound"`).
    pub fn new(domain: &str) -> Self {
        let mut builder = Self {
            hasher: Blake2b256::new(),
        };
        builder.push_bytes(domain.as_bytes());
        builder
    }

    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.push_bytes(data);
        self
    }

    pub fn str(self, s: &str) -> Self {
        self.bytes(s.as_bytes())
    }

    pub fn i64(self, v: i64) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub fn u64(self, v: u64) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub fn u128(self, v: u128) -> Self {
        self.bytes(&v.to_be_bytes())
    }

    pub fn finish(self) -> Digest {
        Digest(self.hasher.finalize().into())
    }

    fn push_bytes(&mut self, data: &[u8]) {
        self.hasher.update((data.len() as u64).to_be_bytes());
        self.hasher.update(data);
    }
}
