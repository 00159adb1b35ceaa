//! Key-value store interface for the observer consensus core.
//!
//! Every storage backend (LMDB, in-memory for testing) implements [`KvStore`].
//! The rest of the codebase depends only on this trait and on the typed
//! helpers in [`codec`], never on a concrete backend.

pub mod batch;
pub mod codec;
pub mod error;
pub mod kv;
pub mod meta;

pub use batch::WriteBatch;
pub use codec::TypedStore;
pub use error::StoreError;
pub use kv::{KvPair, KvStore, KvWrite};
pub use meta::MetaStore;
