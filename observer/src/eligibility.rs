//! Observer eligibility: may this address vote right now?
//!
//! Membership of the *current* observer set is checked here; membership of a
//! ballot's voter snapshot is checked by the ballot itself. An evicted
//! observer fails this check even on ballots it is a voter of.

use crate::error::ObserverError;
use crate::ObserverKeeper;
use interop_store::KvStore;
use interop_types::{AccountAddress, BondStatus, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// Check that `address` is an observer backed by a healthy validator.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// membership, address format, validator existence, jailing, bonding,
    /// tombstoning.
    pub fn can_vote(&self, address: &AccountAddress) -> Result<(), ObserverError> {
        if !self.is_observer(address)? {
            return Err(ObserverError::NotObserver(address.to_string()));
        }
        self.check_validator(address)?;
        if self.is_operator_tombstoned(address)? {
            return Err(ObserverError::ValidatorTombstoned(address.to_string()));
        }
        Ok(())
    }

    /// The validator sharing `address`'s key exists, is unjailed and bonded.
    pub fn check_validator(&self, address: &AccountAddress) -> Result<(), ObserverError> {
        let operator = address.operator_address()?;
        let validator = self
            .validators()
            .get_validator(&operator)
            .ok_or_else(|| ObserverError::NotAValidator(address.to_string()))?;
        if validator.jailed {
            return Err(ObserverError::ValidatorJailed(address.to_string()));
        }
        if validator.status != BondStatus::Bonded {
            return Err(ObserverError::ValidatorNotBonded(address.to_string()));
        }
        Ok(())
    }

    /// Whether the validator sharing `address`'s key has been tombstoned.
    pub fn is_operator_tombstoned(&self, address: &AccountAddress) -> Result<bool, ObserverError> {
        let operator = address.operator_address()?;
        let validator = self
            .validators()
            .get_validator(&operator)
            .ok_or_else(|| ObserverError::NotAValidator(address.to_string()))?;
        Ok(self
            .validators()
            .is_tombstoned(&validator.consensus_address))
    }
}
