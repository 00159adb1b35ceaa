//! Account, validator-operator and consensus addresses.
//!
//! An account address is `acc1` followed by 40 lowercase hex characters (the
//! 20-byte account key). The validator operator address of the same key uses
//! the `valoper1` prefix, so the two convert into each other without any
//! registry lookup.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

const KEY_HEX_LEN: usize = 40;

/// An account address, used for observers and node-account operators.
///
/// Construction never fails: observer sets may legitimately contain malformed
/// entries, which are rejected later with [`TypeError::InvalidAddress`] when
/// they have to be mapped to a validator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for account addresses.
    pub const PREFIX: &'static str = "acc1";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build an address from a raw 20-byte account key.
    pub fn from_key(key: [u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address has the `acc1` prefix and a 20-byte hex body.
    pub fn is_valid(&self) -> bool {
        key_body(&self.0, Self::PREFIX).is_some()
    }

    /// Parse a string, rejecting malformed addresses.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let addr = Self::new(raw);
        if addr.is_valid() {
            Ok(addr)
        } else {
            Err(TypeError::InvalidAddress(raw.to_string()))
        }
    }

    /// The validator operator address controlled by the same key.
    pub fn operator_address(&self) -> Result<ValidatorAddress, TypeError> {
        let body = key_body(&self.0, Self::PREFIX)
            .ok_or_else(|| TypeError::InvalidAddress(self.0.clone()))?;
        Ok(ValidatorAddress(format!("{}{}", ValidatorAddress::PREFIX, body)))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A validator operator address (`valoper1` + 20-byte hex key).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorAddress(String);

impl ValidatorAddress {
    pub const PREFIX: &'static str = "valoper1";

    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        if key_body(raw, Self::PREFIX).is_some() {
            Ok(Self(raw.to_string()))
        } else {
            Err(TypeError::InvalidValidatorAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The account address controlled by the same key.
    pub fn account_address(&self) -> AccountAddress {
        // Only constructed through `parse` or `operator_address`, so the body is well-formed.
        let body = &self.0[Self::PREFIX.len()..];
        AccountAddress(format!("{}{}", AccountAddress::PREFIX, body))
    }
}

impl fmt::Display for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Consensus (block-signing) address of a validator, as reported by the
/// validator registry. Opaque to this crate.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsensusAddress(String);

impl ConsensusAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsensusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn key_body<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let body = raw.strip_prefix(prefix)?;
    let well_formed = body.len() == KEY_HEX_LEN
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    well_formed.then_some(body)
}
