//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the observer core (block context, validator
//! registry, key-value storage) is abstracted behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod context;
pub mod store;
pub mod validators;

pub use context::NullBlockContext;
pub use store::NullKvStore;
pub use validators::NullValidatorRegistry;
