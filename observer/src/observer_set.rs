//! The observer registry: the current observer set and its bookkeeping.

use crate::error::{ErrorKind, ObserverError};
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, BlockContext, BlockHeight, ValidatorRegistry};
use serde::{Deserialize, Serialize};

/// Ordered list of observer addresses. Ballots snapshot it on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverSet {
    pub observer_list: Vec<AccountAddress>,
}

impl ObserverSet {
    pub fn contains(&self, address: &AccountAddress) -> bool {
        self.observer_list.contains(address)
    }

    pub fn len(&self) -> usize {
        self.observer_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observer_list.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastObserverCount {
    pub count: u64,
    pub last_change_height: BlockHeight,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_observer_set(&self) -> Result<Option<ObserverSet>, ObserverError> {
        Ok(self.store().get_record(keys::OBSERVER_SET)?)
    }

    pub fn set_observer_set(&self, set: &ObserverSet) -> Result<(), ObserverError> {
        self.store().put_record(keys::OBSERVER_SET, set)?;
        Ok(())
    }

    pub fn is_observer(&self, address: &AccountAddress) -> Result<bool, ObserverError> {
        Ok(self
            .get_observer_set()?
            .is_some_and(|set| set.contains(address)))
    }

    pub fn get_last_observer_count(&self) -> Result<Option<LastObserverCount>, ObserverError> {
        Ok(self.store().get_record(keys::LAST_OBSERVER_COUNT)?)
    }

    pub fn set_last_observer_count(&self, count: &LastObserverCount) -> Result<(), ObserverError> {
        self.store().put_record(keys::LAST_OBSERVER_COUNT, count)?;
        Ok(())
    }

    /// Add `address` to the observer set, creating the set if needed.
    /// Adding an existing observer changes nothing. Returns the set size.
    pub fn add_observer_to_set(
        &self,
        ctx: &impl BlockContext,
        address: &AccountAddress,
    ) -> Result<u64, ObserverError> {
        let mut set = self.get_observer_set()?.unwrap_or_default();
        if set.contains(address) {
            return Ok(set.len() as u64);
        }
        set.observer_list.push(address.clone());
        self.set_observer_set(&set)?;
        let count = set.len() as u64;
        self.record_observer_count(ctx, count)?;
        tracing::info!(observer = %address, count, "observer added");
        Ok(count)
    }

    /// Remove `address` from the observer set. Returns the set size; a
    /// missing set or non-member is a no-op.
    pub fn remove_observer_from_set(
        &self,
        ctx: &impl BlockContext,
        address: &AccountAddress,
    ) -> Result<u64, ObserverError> {
        let Some(mut set) = self.get_observer_set()? else {
            return Ok(0);
        };
        let before = set.len();
        set.observer_list.retain(|o| o != address);
        let count = set.len() as u64;
        if set.len() != before {
            self.set_observer_set(&set)?;
            self.record_observer_count(ctx, count)?;
            tracing::info!(observer = %address, count, "observer removed");
        }
        Ok(count)
    }

    /// Replace `old` by `new` in place, keeping its position in the set.
    pub fn update_observer_address(
        &self,
        old: &AccountAddress,
        new: &AccountAddress,
    ) -> Result<(), ObserverError> {
        let mut set = self
            .get_observer_set()?
            .ok_or(ObserverError::ObserverSetNotFound)?;
        let slot = set
            .observer_list
            .iter_mut()
            .find(|o| *o == old)
            .ok_or_else(|| ObserverError::NotObserver(old.to_string()))?;
        *slot = new.clone();
        self.set_observer_set(&set)
    }

    /// Remove `address` from the set when its validator's self-delegation has
    /// fallen below the minimum. Returns whether it was removed.
    pub fn check_observer_self_delegation(
        &self,
        ctx: &impl BlockContext,
        address: &AccountAddress,
    ) -> Result<bool, ObserverError> {
        let operator = address.operator_address()?;
        let validator = self
            .validators()
            .get_validator(&operator)
            .ok_or_else(|| ObserverError::ValidatorNotFound(operator.to_string()))?;
        let delegation = self
            .validators()
            .get_delegation(address, &operator)
            .ok_or_else(|| ObserverError::DelegationNotFound(address.to_string()))?;

        let tokens = validator.tokens_from_shares(delegation.shares);
        if tokens >= self.params().min_observer_delegation {
            return Ok(false);
        }
        tracing::info!(
            observer = %address,
            tokens,
            min = self.params().min_observer_delegation,
            "self-delegation below minimum"
        );
        self.remove_observer_from_set(ctx, address)?;
        Ok(true)
    }

    /// Run [`Self::check_observer_self_delegation`] over the whole set.
    /// Observers whose validator or self-delegation is unknown are kept.
    /// Returns how many observers were removed.
    pub fn enforce_observer_self_delegation(&self, ctx: &impl BlockContext) -> Result<usize, ObserverError> {
        let Some(set) = self.get_observer_set()? else {
            return Ok(0);
        };
        let mut removed = 0;
        for address in &set.observer_list {
            match self.check_observer_self_delegation(ctx, address) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(observer = %address, error = %e, "self-delegation not checked");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    fn record_observer_count(&self, ctx: &impl BlockContext, count: u64) -> Result<(), ObserverError> {
        self.set_last_observer_count(&LastObserverCount {
            count,
            last_change_height: ctx.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_nullables::{NullBlockContext, NullKvStore, NullValidatorRegistry};
    use interop_types::ObserverParams;

    fn keeper() -> ObserverKeeper<NullKvStore, NullValidatorRegistry> {
        ObserverKeeper::new(
            NullKvStore::new(),
            NullValidatorRegistry::new(),
            ObserverParams::default(),
        )
    }

    fn addr(b: u8) -> AccountAddress {
        AccountAddress::from_key([b; 20])
    }

    #[test]
    fn add_is_idempotent_and_counts() {
        let k = keeper();
        let ctx = NullBlockContext::new(7);
        assert_eq!(k.add_observer_to_set(&ctx, &addr(1)).unwrap(), 1);
        assert_eq!(k.add_observer_to_set(&ctx, &addr(2)).unwrap(), 2);
        assert_eq!(k.add_observer_to_set(&ctx, &addr(1)).unwrap(), 2);
        let last = k.get_last_observer_count().unwrap().unwrap();
        assert_eq!(last.count, 2);
        assert_eq!(last.last_change_height, BlockHeight::new(7));
    }

    #[test]
    fn remove_keeps_order_and_tolerates_absence() {
        let k = keeper();
        let ctx = NullBlockContext::new(1);
        assert_eq!(k.remove_observer_from_set(&ctx, &addr(1)).unwrap(), 0);
        for b in 1..=3 {
            k.add_observer_to_set(&ctx, &addr(b)).unwrap();
        }
        assert_eq!(k.remove_observer_from_set(&ctx, &addr(2)).unwrap(), 2);
        assert_eq!(k.remove_observer_from_set(&ctx, &addr(9)).unwrap(), 2);
        assert_eq!(
            k.get_observer_set().unwrap().unwrap().observer_list,
            vec![addr(1), addr(3)]
        );
    }

    #[test]
    fn update_replaces_in_place() {
        let k = keeper();
        let ctx = NullBlockContext::new(1);
        for b in 1..=3 {
            k.add_observer_to_set(&ctx, &addr(b)).unwrap();
        }
        k.update_observer_address(&addr(2), &addr(20)).unwrap();
        assert_eq!(
            k.get_observer_set().unwrap().unwrap().observer_list,
            vec![addr(1), addr(20), addr(3)]
        );
        assert!(matches!(
            k.update_observer_address(&addr(2), &addr(21)),
            Err(ObserverError::NotObserver(_))
        ));
    }

    #[test]
    fn self_delegation_check_errors_on_bad_input() {
        let k = keeper();
        let ctx = NullBlockContext::new(1);
        assert!(matches!(
            k.check_observer_self_delegation(&ctx, &AccountAddress::new("bogus")),
            Err(ObserverError::InvalidAddress(_))
        ));
        assert!(matches!(
            k.check_observer_self_delegation(&ctx, &addr(1)),
            Err(ObserverError::ValidatorNotFound(_))
        ));
        let operator = addr(1).operator_address().unwrap();
        k.validators().add_bonded(&addr(1), 100);
        k.validators().remove_delegation(&addr(1), &operator);
        assert!(matches!(
            k.check_observer_self_delegation(&ctx, &addr(1)),
            Err(ObserverError::DelegationNotFound(_))
        ));
    }

    #[test]
    fn enforcement_sweeps_the_set_and_skips_unknown_validators() {
        let k = keeper();
        let ctx = NullBlockContext::new(1);
        let min = k.params().min_observer_delegation;
        for b in 1..=3 {
            k.add_observer_to_set(&ctx, &addr(b)).unwrap();
        }
        k.validators().add_bonded(&addr(1), min - 1);
        k.validators().add_bonded(&addr(2), min);

        assert_eq!(k.enforce_observer_self_delegation(&ctx).unwrap(), 1);
        assert_eq!(
            k.get_observer_set().unwrap().unwrap().observer_list,
            vec![addr(2), addr(3)]
        );
        assert_eq!(k.enforce_observer_self_delegation(&ctx).unwrap(), 0);
    }

    #[test]
    fn self_delegation_below_minimum_removes_observer() {
        let k = keeper();
        let ctx = NullBlockContext::new(1);
        let min = k.params().min_observer_delegation;
        k.add_observer_to_set(&ctx, &addr(1)).unwrap();
        k.add_observer_to_set(&ctx, &addr(2)).unwrap();
        k.validators().add_bonded(&addr(1), min - 1);
        k.validators().add_bonded(&addr(2), min);

        assert!(k.check_observer_self_delegation(&ctx, &addr(1)).unwrap());
        assert!(!k.check_observer_self_delegation(&ctx, &addr(2)).unwrap());
        assert_eq!(
            k.get_observer_set().unwrap().unwrap().observer_list,
            vec![addr(2)]
        );
    }
}
