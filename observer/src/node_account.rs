//! Node accounts: the operators that take part in TSS keygen.

use crate::error::ObserverError;
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, ValidatorRegistry};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Unknown,
    Active,
    Standby,
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAccount {
    pub operator: AccountAddress,
    /// Public key the node was granted for keygen participation.
    pub granted_pubkey: String,
    #[serde(default)]
    pub status: NodeStatus,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_node_account(&self, operator: &AccountAddress) -> Result<Option<NodeAccount>, ObserverError> {
        Ok(self
            .store()
            .get_record(&keys::node_account(operator.as_str()))?)
    }

    pub fn set_node_account(&self, account: &NodeAccount) -> Result<(), ObserverError> {
        self.store()
            .put_record(&keys::node_account(account.operator.as_str()), account)?;
        Ok(())
    }

    pub fn remove_node_account(&self, operator: &AccountAddress) -> Result<(), ObserverError> {
        self.store()
            .delete(&keys::node_account(operator.as_str()))?;
        Ok(())
    }

    /// All node accounts, ordered by operator address.
    pub fn node_accounts(&self) -> Result<Vec<NodeAccount>, ObserverError> {
        Ok(self.store().records_with_prefix(keys::NODE_ACCOUNT)?)
    }
}
