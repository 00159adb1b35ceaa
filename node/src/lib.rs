//! Observer node: drives the observer and cross-chain modules.
//!
//! The node owns the state store and applies blocks of messages:
//! - every message runs against its own write batch and commits only on
//!   success, so a rejected message writes nothing
//! - end-of-block processing garbage-collects matured ballots
//! - configuration, logging and metrics follow the rest of the workspace

pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod metrics;
pub mod node;
pub mod registry;
pub mod tracing_spans;

pub use config::{NodeConfig, ParamsConfig, ValidatorConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use message::{BlockInput, Msg, MsgResponse};
pub use metrics::NodeMetrics;
pub use node::{BlockSummary, ObserverNode};
pub use registry::StaticValidatorRegistry;
