//! # Adapters
//!
//! Concrete key stores behind the `KeyValueStore` port, plus the process lock
//! that serialises provisioning per data directory.
//!
//! - `FileBackedKVStore` - single-file store, always available
//! - `RocksDbStore` - requires the `rocksdb` feature
//! - `StoreLock` - fs2 exclusive lock on the data directory

pub mod file_store;
pub mod lock;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use file_store::FileBackedKVStore;
pub use lock::StoreLock;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::RocksDbStore;
