use interop_crosschain::CrosschainError;
use interop_observer::{ErrorKind, ObserverError};
use interop_store::StoreError;
use interop_store_lmdb::LmdbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] LmdbError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Observer(#[from] ObserverError),

    #[error(transparent)]
    Crosschain(#[from] CrosschainError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("logging error: {0}")]
    Logging(String),
}

impl NodeError {
    /// Classification of a message rejected by a handler, `None` for
    /// failures that are not about the message.
    pub fn message_kind(&self) -> Option<ErrorKind> {
        match self {
            NodeError::Observer(e) => Some(e.kind()),
            NodeError::Crosschain(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Whether the node must stop: state could not be read or written.
    pub fn is_fatal(&self) -> bool {
        match self.message_kind() {
            Some(kind) => kind == ErrorKind::Store,
            None => !matches!(self, NodeError::Decode(_)),
        }
    }
}
