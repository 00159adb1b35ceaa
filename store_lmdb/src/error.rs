use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported schema version {found}, this node supports up to {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("unknown migration: {from} -> {to}")]
    UnknownMigration { from: u32, to: u32 },

    #[error("store error: {0}")]
    Store(#[from] interop_store::StoreError),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for interop_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Store(inner) => inner,
            other => interop_store::StoreError::Backend(other.to_string()),
        }
    }
}
