//! Content-addressed persistence for entities: node, chain head, blocks,
//! wallets. A single reader-writer lock protects all operations; writes are
//! exclusive and land atomically (write to a temp file, then rename).

mod key;

pub use key::StoreKey;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("corrupt entry at {0}: {1}")]
    Corrupt(String, String),
    #[error("I/O error at {0}: {1}")]
    Io(String, String),
}

/// Durable, thread-safe key/value persistence with semantic typing.
///
/// `Store::open` is idempotent within a process: construct once (typically
/// owned by the Node runtime singleton) and share behind an `Arc`.
pub struct Store {
    root: PathBuf,
    lock: RwLock<()>,
}

impl Store {
    /// Opens (creating if absent) the store rooted at `root`, creating the
    /// `node/`, `blocks/`, `wallets/` subdirectories on first init.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for sub in ["node", "blocks", "wallets"] {
            let dir = root.join(sub);
            fs::create_dir_all(&dir).map_err(|e| StoreError::Io(dir.display().to_string(), e.to_string()))?;
        }
        Ok(Self {
            root,
            lock: RwLock::new(()),
        })
    }

    fn full_path(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    /// Serialise `value` as JSON and write atomically.
    pub fn set<T: Serialize>(&self, key: &StoreKey, value: &T) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.full_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(parent.display().to_string(), e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Corrupt(path.display().to_string(), e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &json).map_err(|e| StoreError::Io(tmp.display().to_string(), e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Io(path.display().to_string(), e.to_string()))?;
        debug!(key = %key, "store: set");
        Ok(())
    }

    /// Load and deserialise. `NotFound` if absent, `Corrupt` if decode fails.
    pub fn get<T: DeserializeOwned>(&self, key: &StoreKey) -> Result<T, StoreError> {
        let _guard = self
            .lock
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.full_path(key);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Io(path.display().to_string(), e.to_string())
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(key.to_string(), e.to_string()))
    }

    /// Idempotent; `NotFound` is not an error here.
    pub fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.full_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(error = %e, key = %key, "store: delete failed");
                Err(StoreError::Io(path.display().to_string(), e.to_string()))
            }
        }
    }

    /// All persisted keys under a category, as relative paths.
    pub fn list(&self, category: &str) -> Result<Vec<String>, StoreError> {
        let _guard = self
            .lock
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let dir = self.root.join(category);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::Io(dir.display().to_string(), e.to_string()))? {
            let entry = entry.map_err(|e| StoreError::Io(dir.display().to_string(), e.to_string()))?;
            if entry.path().extension().map(|e| e == "tmp").unwrap_or(false) {
                continue;
            }
            out.push(entry.file_name().to_string_lossy().to_string());
        }
        out.sort();
        Ok(out)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Dummy {
        value: u32,
    }

    #[test]
    fn set_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let key = StoreKey::Block(3);
        store.set(&key, &Dummy { value: 42 }).unwrap();
        let loaded: Dummy = store.get(&key).unwrap();
        assert_eq!(loaded, Dummy { value: 42 });
    }

    #[test]
    fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let err = store.get::<Dummy>(&StoreKey::Block(9)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let key = StoreKey::Wallet("addr1".into());
        store.set(&key, &Dummy { value: 1 }).unwrap();
        store.delete(&key).unwrap();
        store.delete(&key).unwrap(); // second delete: still Ok
        assert!(store.get::<Dummy>(&key).is_err());
    }

    #[test]
    fn list_returns_persisted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.set(&StoreKey::Block(0), &Dummy { value: 0 }).unwrap();
        store.set(&StoreKey::Block(1), &Dummy { value: 1 }).unwrap();
        let listed = store.list("blocks").unwrap();
        assert_eq!(listed.len(), 2);
    }
}
