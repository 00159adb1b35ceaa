//! Validator registry loaded from the node configuration.
//!
//! Stands in for the staking and slashing modules when the node replays
//! message logs on its own. Every validator is keyed by the operator address
//! of its account key and issues one share per token.

use std::collections::{HashMap, HashSet};

use interop_types::{
    AccountAddress, ConsensusAddress, Delegation, ValidatorAddress, ValidatorInfo,
    ValidatorRegistry,
};

use crate::config::ValidatorConfig;
use crate::NodeError;

#[derive(Debug, Default)]
pub struct StaticValidatorRegistry {
    validators: HashMap<ValidatorAddress, ValidatorInfo>,
    self_delegations: HashMap<ValidatorAddress, u128>,
    tombstoned: HashSet<ConsensusAddress>,
}

impl StaticValidatorRegistry {
    pub fn from_config(entries: &[ValidatorConfig]) -> Result<Self, NodeError> {
        let mut registry = Self::default();
        for entry in entries {
            let operator = entry
                .account
                .operator_address()
                .map_err(|e| NodeError::Config(e.to_string()))?;
            let consensus_address = consensus_address(&operator);
            if entry.tombstoned {
                registry.tombstoned.insert(consensus_address.clone());
            }
            registry.self_delegations.insert(
                operator.clone(),
                entry.self_delegation.unwrap_or(entry.tokens),
            );
            let info = ValidatorInfo {
                operator: operator.clone(),
                consensus_address,
                jailed: entry.jailed,
                status: entry.status,
                tokens: entry.tokens,
                delegator_shares: entry.tokens,
            };
            if registry.validators.insert(operator, info).is_some() {
                return Err(NodeError::Config(format!(
                    "validator {} is configured twice",
                    entry.account
                )));
            }
        }
        tracing::debug!(validators = registry.validators.len(), "loaded static validator registry");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// `valcons1` + the operator's key.
fn consensus_address(operator: &ValidatorAddress) -> ConsensusAddress {
    let body = &operator.as_str()[ValidatorAddress::PREFIX.len()..];
    ConsensusAddress::new(format!("valcons1{body}"))
}

impl ValidatorRegistry for StaticValidatorRegistry {
    fn get_validator(&self, operator: &ValidatorAddress) -> Option<ValidatorInfo> {
        self.validators.get(operator).cloned()
    }

    fn is_tombstoned(&self, consensus: &ConsensusAddress) -> bool {
        self.tombstoned.contains(consensus)
    }

    fn get_delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorAddress,
    ) -> Option<Delegation> {
        // Only self-delegations are modelled.
        if &validator.account_address() != delegator {
            return None;
        }
        let shares = *self.self_delegations.get(validator)?;
        Some(Delegation {
            delegator: delegator.clone(),
            validator: validator.clone(),
            shares,
        })
    }
}
