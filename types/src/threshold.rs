//! Ballot threshold: a decimal fraction in (0, 1] with four decimal places.
//!
//! Stored as basis points so that every finalization decision is an exact
//! integer comparison. Floating point never enters the vote tally: two nodes
//! replaying the same votes always reach the same decision.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Basis-point denominator (1.0000).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// A ballot threshold in basis points, `0 < bps <= 10_000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Threshold(u32);

impl Threshold {
    /// Unanimity (1.00).
    pub const ONE: Self = Self(BPS_DENOMINATOR);

    pub fn from_bps(bps: u32) -> Result<Self, TypeError> {
        if bps == 0 || bps > BPS_DENOMINATOR {
            return Err(TypeError::InvalidThreshold(format!(
                "{bps} bps is outside (0, {BPS_DENOMINATOR}]"
            )));
        }
        Ok(Self(bps))
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    /// `count / total >= threshold`.
    pub fn is_reached_by(&self, count: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        count as u128 * BPS_DENOMINATOR as u128 >= self.0 as u128 * total as u128
    }

    /// `count / total > 1 - threshold`: enough votes against that the
    /// threshold can no longer be reached.
    pub fn complement_exceeded_by(&self, count: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        let complement = (BPS_DENOMINATOR - self.0) as u128;
        count as u128 * BPS_DENOMINATOR as u128 > complement * total as u128
    }
}

impl FromStr for Threshold {
    type Err = TypeError;

    /// Parse a decimal such as `"0.66"`, `"1"` or `"1.00"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidThreshold(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let (kept, dropped) = frac_part.split_at(frac_part.len().min(4));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }
        let int: u32 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut frac: u32 = if kept.is_empty() {
            0
        } else {
            kept.parse().map_err(|_| invalid())?
        };
        for _ in kept.len()..4 {
            frac *= 10;
        }
        let bps = int
            .checked_mul(BPS_DENOMINATOR)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;
        Self::from_bps(bps)
    }
}

impl TryFrom<String> for Threshold {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Threshold> for String {
    fn from(t: Threshold) -> Self {
        t.to_string()
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / BPS_DENOMINATOR;
        let frac = self.0 % BPS_DENOMINATOR;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:04}");
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}
