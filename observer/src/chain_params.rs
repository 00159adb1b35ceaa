//! Per-chain observation parameters.

use crate::error::ObserverError;
use interop_types::{ChainId, Threshold};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub chain_id: ChainId,
    /// Whether observations for this chain are currently accepted.
    #[serde(default)]
    pub is_supported: bool,
    /// Fraction of the observer set needed to finalize a ballot.
    #[serde(default = "default_ballot_threshold")]
    pub ballot_threshold: Threshold,
}

fn default_ballot_threshold() -> Threshold {
    Threshold::from_bps(6600).unwrap_or(Threshold::ONE)
}

impl ChainParams {
    pub fn new(chain_id: ChainId, is_supported: bool, ballot_threshold: Threshold) -> Self {
        Self {
            chain_id,
            is_supported,
            ballot_threshold,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParamsList {
    pub chain_params: Vec<ChainParams>,
}

impl ChainParamsList {
    /// Reject duplicate chain ids. Thresholds are range-checked on parse.
    pub fn validate(&self) -> Result<(), ObserverError> {
        let mut seen = HashSet::new();
        for params in &self.chain_params {
            if !seen.insert(params.chain_id) {
                return Err(ObserverError::InvalidChainParams(format!(
                    "duplicate chain id {}",
                    params.chain_id
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, chain: ChainId) -> Option<&ChainParams> {
        self.chain_params.iter().find(|p| p.chain_id == chain)
    }

    /// Insert or replace the entry for `params.chain_id`.
    pub fn upsert(&mut self, params: ChainParams) {
        match self
            .chain_params
            .iter_mut()
            .find(|p| p.chain_id == params.chain_id)
        {
            Some(existing) => *existing = params,
            None => self.chain_params.push(params),
        }
    }

    /// Supported chains in list order.
    pub fn supported_chains(&self) -> Vec<ChainId> {
        self.chain_params
            .iter()
            .filter(|p| p.is_supported)
            .map(|p| p.chain_id)
            .collect()
    }
}
