//! Observer consensus core.
//!
//! Observers vote on facts they witness on connected chains; a fact is
//! accepted once enough of the observer set agrees. This crate holds the
//! voting engine and everything built on it:
//!
//! - [`ballot`]: Ballot state machine (InProgress → FinalizedSuccess/FinalizedFailure).
//! - [`voting`]: Find-or-create, vote, finalize.
//! - [`observer_set`] / [`eligibility`]: Who may vote.
//! - [`nonces`]: Outbound nonce allocation per signing key and chain.
//! - [`tss`] / [`keygen`]: Signing keys and keygen consensus.
//! - [`blame`] / [`block_header`]: Facts recorded on finalization.
//! - [`gc`]: Height-driven pruning of matured ballots.
//! - [`msg_server`]: Message handlers.

pub mod authority;
pub mod ballot;
pub mod ballot_store;
pub mod blame;
pub mod block_header;
pub mod chain_params;
pub mod eligibility;
pub mod error;
pub mod gc;
pub mod keeper;
pub mod keygen;
pub mod keys;
pub mod messages;
pub mod msg_server;
pub mod node_account;
pub mod nonces;
pub mod observer_set;
pub mod tss;
pub mod voting;

pub use ballot::{Ballot, BallotList, BallotStatus, ObservationType, VoteType};
pub use blame::{Blame, NodeBlame};
pub use block_header::BlockHeaderRecord;
pub use chain_params::{ChainParams, ChainParamsList};
pub use error::{ErrorKind, ObserverError};
pub use keeper::ObserverKeeper;
pub use keygen::{Keygen, KeygenStatus};
pub use messages::*;
pub use node_account::{NodeAccount, NodeStatus};
pub use nonces::{ChainNonces, NonceToCctx, PendingNonces};
pub use observer_set::{LastObserverCount, ObserverSet};
pub use tss::Tss;
pub use voting::{BallotTemplate, VoteOutcome};
