//! The observer keeper: owns every piece of observer-module state.
//!
//! State lives in the injected [`KvStore`]; the validator registry and the
//! module parameters are collaborators provided by the host. All operations
//! are implemented as `impl` blocks on [`ObserverKeeper`] spread across the
//! modules of this crate, one per subsystem.

use crate::chain_params::{ChainParams, ChainParamsList};
use crate::error::ObserverError;
use crate::keys;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, ChainId, ObserverParams, ValidatorRegistry};

pub struct ObserverKeeper<S, V> {
    store: S,
    validators: V,
    params: ObserverParams,
    admins: Vec<AccountAddress>,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn new(store: S, validators: V, params: ObserverParams) -> Self {
        Self {
            store,
            validators,
            params,
            admins: Vec::new(),
        }
    }

    /// Accounts allowed to run administrative messages.
    pub fn with_admins(mut self, admins: Vec<AccountAddress>) -> Self {
        self.admins = admins;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn validators(&self) -> &V {
        &self.validators
    }

    pub fn params(&self) -> &ObserverParams {
        &self.params
    }

    pub fn admins(&self) -> &[AccountAddress] {
        &self.admins
    }

    // ── chain params ───────────────────────────────────────────────────

    pub fn get_chain_params_list(&self) -> Result<Option<ChainParamsList>, ObserverError> {
        Ok(self.store.get_record(keys::CHAIN_PARAMS)?)
    }

    pub fn set_chain_params_list(&self, list: &ChainParamsList) -> Result<(), ObserverError> {
        list.validate()?;
        self.store.put_record(keys::CHAIN_PARAMS, list)?;
        Ok(())
    }

    pub fn get_chain_params(&self, chain: ChainId) -> Result<Option<ChainParams>, ObserverError> {
        Ok(self
            .get_chain_params_list()?
            .and_then(|list| list.get(chain).cloned()))
    }

    pub fn is_chain_supported(&self, chain: ChainId) -> Result<bool, ObserverError> {
        Ok(self
            .get_chain_params(chain)?
            .is_some_and(|p| p.is_supported))
    }

    /// Chain params of a supported chain, or the config error explaining why
    /// the chain cannot be voted on.
    pub fn supported_chain_params(&self, chain: ChainId) -> Result<ChainParams, ObserverError> {
        match self.get_chain_params(chain)? {
            Some(p) if p.is_supported => Ok(p),
            Some(_) => Err(ObserverError::UnsupportedChain(chain)),
            None => Err(ObserverError::ChainParamsNotFound(chain)),
        }
    }

    pub fn supported_chains(&self) -> Result<Vec<ChainId>, ObserverError> {
        Ok(self
            .get_chain_params_list()?
            .map(|list| list.supported_chains())
            .unwrap_or_default())
    }
}
