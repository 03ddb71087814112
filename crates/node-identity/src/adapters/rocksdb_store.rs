//! # RocksDB Key Store Adapter
//!
//! RocksDB implementation of the `KeyValueStore` trait, for nodes that
//! already keep their other state in RocksDB and want the node key beside it.
//!
//! Enable with the `rocksdb` feature.

use std::path::Path;

use rocksdb::{Options, WriteOptions, DB};
use tracing::debug;

use crate::domain::KVStoreError;
use crate::ports::KeyValueStore;

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: DB,
    sync_writes: bool,
}

impl RocksDbStore {
    /// Open or create a RocksDB database at `path`.
    ///
    /// `sync_writes` fsyncs the WAL on every put; leave it on for the node key.
    pub fn open(path: impl AsRef<Path>, sync_writes: bool) -> Result<Self, KVStoreError> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB at {}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "Opened RocksDB key store");

        Ok(Self { db, sync_writes })
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(|e| KVStoreError::IOError {
            message: format!("RocksDB get failed: {}", e),
        })
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);

        self.db
            .put_opt(key, value, &write_opts)
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB put failed: {}", e),
            })
    }
}
