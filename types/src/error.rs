//! Errors raised while parsing or converting primitive types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid validator address: {0}")]
    InvalidValidatorAddress(String),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
