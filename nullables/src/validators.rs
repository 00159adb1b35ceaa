//! Nullable validator registry: programmable staking/slashing view.

use interop_types::{
    AccountAddress, BondStatus, ConsensusAddress, Delegation, ValidatorAddress, ValidatorInfo,
    ValidatorRegistry,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A validator registry whose contents are set directly by tests.
pub struct NullValidatorRegistry {
    validators: Mutex<HashMap<ValidatorAddress, ValidatorInfo>>,
    tombstoned: Mutex<HashSet<ConsensusAddress>>,
    delegations: Mutex<HashMap<(AccountAddress, ValidatorAddress), Delegation>>,
}

impl NullValidatorRegistry {
    pub fn new() -> Self {
        Self {
            validators: Mutex::new(HashMap::new()),
            tombstoned: Mutex::new(HashSet::new()),
            delegations: Mutex::new(HashMap::new()),
        }
    }

    pub fn put_validator(&self, info: ValidatorInfo) {
        self.validators
            .lock()
            .unwrap()
            .insert(info.operator.clone(), info);
    }

    /// Register a bonded, unjailed validator for `account` with `tokens`
    /// self-delegated, one share per token.
    ///
    /// Panics if `account` is malformed; callers pass well-formed test keys.
    pub fn add_bonded(&self, account: &AccountAddress, tokens: u128) -> ValidatorInfo {
        let operator = account
            .operator_address()
            .expect("test accounts must be well-formed");
        let info = ValidatorInfo {
            operator: operator.clone(),
            consensus_address: ConsensusAddress::new(format!("cons-{}", account.as_str())),
            jailed: false,
            status: BondStatus::Bonded,
            tokens,
            delegator_shares: tokens,
        };
        self.put_validator(info.clone());
        self.put_delegation(Delegation {
            delegator: account.clone(),
            validator: operator,
            shares: tokens,
        });
        info
    }

    /// Apply `f` to a registered validator in place.
    pub fn update_validator(&self, operator: &ValidatorAddress, f: impl FnOnce(&mut ValidatorInfo)) {
        if let Some(info) = self.validators.lock().unwrap().get_mut(operator) {
            f(info);
        }
    }

    pub fn remove_validator(&self, operator: &ValidatorAddress) {
        self.validators.lock().unwrap().remove(operator);
    }

    pub fn tombstone(&self, consensus: &ConsensusAddress) {
        self.tombstoned.lock().unwrap().insert(consensus.clone());
    }

    pub fn put_delegation(&self, delegation: Delegation) {
        self.delegations.lock().unwrap().insert(
            (delegation.delegator.clone(), delegation.validator.clone()),
            delegation,
        );
    }

    pub fn remove_delegation(&self, delegator: &AccountAddress, validator: &ValidatorAddress) {
        self.delegations
            .lock()
            .unwrap()
            .remove(&(delegator.clone(), validator.clone()));
    }
}

impl Default for NullValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry for NullValidatorRegistry {
    fn get_validator(&self, operator: &ValidatorAddress) -> Option<ValidatorInfo> {
        self.validators.lock().unwrap().get(operator).cloned()
    }

    fn is_tombstoned(&self, consensus: &ConsensusAddress) -> bool {
        self.tombstoned.lock().unwrap().contains(consensus)
    }

    fn get_delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorAddress,
    ) -> Option<Delegation> {
        self.delegations
            .lock()
            .unwrap()
            .get(&(delegator.clone(), validator.clone()))
            .cloned()
    }
}
