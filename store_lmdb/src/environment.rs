//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::migration::Migrator;
use crate::{LmdbError, LmdbKvStore};

/// Name of the database holding all observer module state.
const STATE_DB: &str = "state";

/// Wraps the LMDB environment and the state database handle.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    state_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process for this path and
        // the memory map is never accessed outside heed's transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let state_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(STATE_DB))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            state_db,
        };
        Migrator::run(&environment.kv_store())?;
        tracing::info!(path = %path.display(), "opened LMDB environment");
        Ok(environment)
    }

    /// A [`interop_store::KvStore`] handle over the state database.
    pub fn kv_store(&self) -> LmdbKvStore {
        LmdbKvStore {
            env: Arc::clone(&self.env),
            db: self.state_db,
        }
    }
}
