//! LMDB storage backend for the observer consensus core.
//!
//! Implements [`interop_store::KvStore`] using the `heed` LMDB bindings. All
//! module state lives in a single named database; subsystems partition it by
//! key prefix.

pub mod environment;
pub mod error;
pub mod kv;
pub mod migration;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use kv::LmdbKvStore;
