//! Interface of the external validator staking/slashing registry.
//!
//! Observers are checked against the validator that shares their key; the
//! registry itself (bonding, jailing, slashing) is owned by another module.

use crate::{AccountAddress, ConsensusAddress, ValidatorAddress};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondStatus {
    Unbonded,
    Unbonding,
    Bonded,
}

/// The registry's current view of a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub operator: ValidatorAddress,
    pub consensus_address: ConsensusAddress,
    pub jailed: bool,
    pub status: BondStatus,
    /// Total bonded tokens.
    pub tokens: u128,
    /// Total delegator shares issued against `tokens`.
    pub delegator_shares: u128,
}

impl ValidatorInfo {
    /// Tokens represented by `shares` of this validator (rounded down).
    pub fn tokens_from_shares(&self, shares: u128) -> u128 {
        if self.delegator_shares == 0 {
            return 0;
        }
        shares.saturating_mul(self.tokens) / self.delegator_shares
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: AccountAddress,
    pub validator: ValidatorAddress,
    pub shares: u128,
}

/// Read-only view of the staking and slashing modules.
pub trait ValidatorRegistry {
    fn get_validator(&self, operator: &ValidatorAddress) -> Option<ValidatorInfo>;

    fn is_tombstoned(&self, consensus: &ConsensusAddress) -> bool;

    fn get_delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorAddress,
    ) -> Option<Delegation>;
}

impl<T: ValidatorRegistry + ?Sized> ValidatorRegistry for &T {
    fn get_validator(&self, operator: &ValidatorAddress) -> Option<ValidatorInfo> {
        (**self).get_validator(operator)
    }

    fn is_tombstoned(&self, consensus: &ConsensusAddress) -> bool {
        (**self).is_tombstoned(consensus)
    }

    fn get_delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorAddress,
    ) -> Option<Delegation> {
        (**self).get_delegation(delegator, validator)
    }
}

impl<T: ValidatorRegistry + ?Sized> ValidatorRegistry for std::sync::Arc<T> {
    fn get_validator(&self, operator: &ValidatorAddress) -> Option<ValidatorInfo> {
        (**self).get_validator(operator)
    }

    fn is_tombstoned(&self, consensus: &ConsensusAddress) -> bool {
        (**self).is_tombstoned(consensus)
    }

    fn get_delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorAddress,
    ) -> Option<Delegation> {
        (**self).get_delegation(delegator, validator)
    }
}
