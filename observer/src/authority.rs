//! Authorization of administrative messages.

use crate::error::ObserverError;
use crate::ObserverKeeper;
use interop_store::KvStore;
use interop_types::{AccountAddress, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn is_admin(&self, signer: &AccountAddress) -> bool {
        self.admins().contains(signer)
    }

    pub fn ensure_admin(&self, signer: &AccountAddress) -> Result<(), ObserverError> {
        if self.is_admin(signer) {
            return Ok(());
        }
        tracing::warn!(signer = %signer, "rejected administrative message");
        Err(ObserverError::NotAuthorized(signer.to_string()))
    }
}
