//! Persistent key/value storage for the credential.
//!
//! The provider keeps exactly one value here, under a well-known key, and
//! mirrors it in memory.
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not a JSON object: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait CredentialStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        lock(&store.entries).insert(key.to_string(), value.to_string());
        store
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON object on disk. A missing file reads as empty.
///
/// Writes go to a sibling temp file first and are renamed into place.
/// `load` reports a corrupt file; `save` and `remove` replace it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    // Entries to rewrite, plus whether the file was corrupt and must be replaced.
    fn read_for_update(&self) -> Result<(HashMap<String, String>, bool), StorageError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt(err)) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding corrupt credential store");
                Ok((HashMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = lock(&self.io_lock);
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.io_lock);
        let (mut entries, _) = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.io_lock);
        let (mut entries, corrupt) = self.read_for_update()?;
        if entries.remove(key).is_some() || corrupt {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
