//! # File-Backed Key-Value Store
//!
//! Persists entries to a single binary file, giving durability without
//! compiling RocksDB. The node key store holds one entry, so rewriting the
//! whole file on every put is fine.
//!
//! ## Format
//!
//! A sequence of `[key_len:u32 LE][key][value_len:u32 LE][value]` records.
//! Writes go to a temp file which is synced (unless disabled) and renamed
//! over the original.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::KVStoreError;
use crate::ports::KeyValueStore;

/// File-backed key-value store.
#[derive(Debug)]
pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    sync_writes: bool,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    ///
    /// # Errors
    ///
    /// `IOError` if the file exists but cannot be read, `CorruptionError` if
    /// its contents do not parse.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(|e| io_error(&path, e))?;
                let data = decode_records(&bytes)?;
                debug!(
                    path = %path.display(),
                    entries = data.len(),
                    "Opened key store file"
                );
                data
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No key store file yet, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        Ok(Self {
            data,
            path,
            sync_writes: true,
        })
    }

    /// Whether each put fsyncs the temp file before renaming it (default: true).
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_to_file(&self) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
        }

        let bytes = encode_records(&self.data);

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let result = self.write_and_replace(&temp_path, &bytes);
        if result.is_err() {
            // The temp file holds the serialized key; never leave it behind.
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_and_replace(&self, temp_path: &Path, bytes: &[u8]) -> Result<(), KVStoreError> {
        let mut file = create_private(temp_path).map_err(|e| io_error(temp_path, e))?;
        file.write_all(bytes).map_err(|e| io_error(temp_path, e))?;
        if self.sync_writes {
            file.sync_all().map_err(|e| io_error(temp_path, e))?;
        }
        drop(file);

        fs::rename(temp_path, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let previous = self.data.insert(key.to_vec(), value.to_vec());
        if let Err(e) = self.save_to_file() {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => self.data.insert(key.to_vec(), old),
                None => self.data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Create a file readable only by the owner; it holds secret key material.
fn create_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn io_error(path: &Path, err: io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("{}: {}", path.display(), err),
    }
}

fn encode_records(data: &HashMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (key, value) in data {
        bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(key);
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(value);
    }
    bytes
}

fn decode_records(bytes: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>, KVStoreError> {
    let mut data = HashMap::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let key = read_field(bytes, &mut cursor)?;
        let value = read_field(bytes, &mut cursor)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn read_field(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let len_end = *cursor + 4;
    let len_bytes: [u8; 4] = bytes
        .get(*cursor..len_end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated(*cursor))?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    let field = bytes
        .get(len_end..len_end + len)
        .ok_or_else(|| truncated(len_end))?
        .to_vec();
    *cursor = len_end + len;
    Ok(field)
}

fn truncated(offset: usize) -> KVStoreError {
    KVStoreError::CorruptionError {
        message: format!("record truncated at byte {}", offset),
    }
}
