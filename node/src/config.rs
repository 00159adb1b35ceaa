//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use interop_observer::ChainParams;
use interop_types::{AccountAddress, BondStatus, ObserverParams, Threshold};

use crate::NodeError;

/// Configuration for an observer node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB state store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to print Prometheus metrics when a replay finishes.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Accounts allowed to send administrative messages.
    #[serde(default)]
    pub admins: Vec<AccountAddress>,

    /// Observer module parameters.
    #[serde(default)]
    pub params: ParamsConfig,

    /// Validators known to the static registry used when replaying.
    #[serde(default)]
    pub validators: Vec<ValidatorConfig>,

    /// Chain params installed on first start, when the store has none.
    #[serde(default)]
    pub chain_params: Vec<ChainParams>,
}

/// `[params]` table. Token amounts are decimal strings: they do not fit
/// TOML's 64-bit integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsConfig {
    #[serde(default = "default_ballot_maturity_blocks")]
    pub ballot_maturity_blocks: i64,

    #[serde(default = "default_blame_threshold")]
    pub blame_threshold: Threshold,

    #[serde(default = "default_min_observer_delegation", with = "decimal_u128")]
    pub min_observer_delegation: u128,
}

/// One `[[validators]]` entry. The operator address is derived from the
/// account key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub account: AccountAddress,

    #[serde(with = "decimal_u128")]
    pub tokens: u128,

    /// Self-delegated shares; all of `tokens` when absent.
    #[serde(default, with = "decimal_u128_opt", skip_serializing_if = "Option::is_none")]
    pub self_delegation: Option<u128>,

    #[serde(default)]
    pub jailed: bool,

    #[serde(default = "default_bond_status")]
    pub status: BondStatus,

    #[serde(default)]
    pub tombstoned: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./interop_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ballot_maturity_blocks() -> i64 {
    ObserverParams::default().ballot_maturity_blocks
}

fn default_blame_threshold() -> Threshold {
    ObserverParams::default().blame_threshold
}

fn default_min_observer_delegation() -> u128 {
    ObserverParams::default().min_observer_delegation
}

fn default_bond_status() -> BondStatus {
    BondStatus::Bonded
}

mod decimal_u128 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod decimal_u128_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u128>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u128>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| raw.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ParamsConfig {
    pub fn to_params(&self) -> ObserverParams {
        ObserverParams {
            ballot_maturity_blocks: self.ballot_maturity_blocks,
            blame_threshold: self.blame_threshold,
            min_observer_delegation: self.min_observer_delegation,
        }
    }
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            ballot_maturity_blocks: default_ballot_maturity_blocks(),
            blame_threshold: default_blame_threshold(),
            min_observer_delegation: default_min_observer_delegation(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject configurations the node cannot start with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.params.ballot_maturity_blocks <= 0 {
            return Err(NodeError::Config(format!(
                "ballot_maturity_blocks must be positive, got {}",
                self.params.ballot_maturity_blocks
            )));
        }
        for admin in &self.admins {
            if !admin.is_valid() {
                return Err(NodeError::Config(format!("invalid admin address {admin}")));
            }
        }
        for v in &self.validators {
            if !v.account.is_valid() {
                return Err(NodeError::Config(format!("invalid validator account {}", v.account)));
            }
        }
        let list = interop_observer::ChainParamsList {
            chain_params: self.chain_params.clone(),
        };
        list.validate()
            .map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            admins: Vec::new(),
            params: ParamsConfig::default(),
            validators: Vec::new(),
            chain_params: Vec::new(),
        }
    }
}
