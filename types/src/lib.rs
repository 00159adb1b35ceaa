//! Fundamental types for the observer consensus core.
//!
//! This crate defines the primitives shared across every other crate in the
//! workspace: account and validator addresses, chain identifiers, digests,
//! block heights, vote thresholds, module parameters, and the interfaces of
//! the external collaborators (block context, validator registry).

pub mod address;
pub mod chain;
pub mod context;
pub mod error;
pub mod hash;
pub mod height;
pub mod params;
pub mod threshold;
pub mod validator;

pub use address::{AccountAddress, ConsensusAddress, ValidatorAddress};
pub use chain::ChainId;
pub use context::BlockContext;
pub use error::TypeError;
pub use hash::{Digest, DigestBuilder};
pub use height::BlockHeight;
pub use params::ObserverParams;
pub use threshold::Threshold;
pub use validator::{BondStatus, Delegation, ValidatorInfo, ValidatorRegistry};
