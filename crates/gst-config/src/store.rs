//! Key-addressed object storage.
//!
//! The host platform owns the real store; this crate only needs
//! `contains_key` + `read`. Two implementations ship here: an in-memory map
//! (tests, embedding) and a directory-backed store (CLI).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object store error key={}: {}", self.key, self.message)
    }
}

impl std::error::Error for StoreError {}

pub trait ObjectStore: Send + Sync {
    fn contains_key(&self, key: &str) -> bool;

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.into(), bytes.into());
        }
        self
    }
}

impl ObjectStore for MemoryObjectStore {
    fn contains_key(&self, key: &str) -> bool {
        self.objects
            .lock()
            .map(|o| o.contains_key(key))
            .unwrap_or(false)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let objects = self.objects.lock().map_err(|_| StoreError {
            key: key.to_string(),
            message: "store lock poisoned".to_string(),
        })?;
        objects.get(key).cloned().ok_or_else(|| StoreError {
            key: key.to_string(),
            message: "no such key".to_string(),
        })
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| StoreError {
            key: key.to_string(),
            message: "store lock poisoned".to_string(),
        })?;
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Directory-backed
// ---------------------------------------------------------------------------

/// Maps key `a/b/c.json` to `<root>/a/b/c.json`. Keys that would escape the
/// root (`..`, absolute paths) are rejected.
#[derive(Debug, Clone)]
pub struct DirObjectStore {
    root: PathBuf,
}

impl DirObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(key);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(StoreError {
                key: key.to_string(),
                message: "key must be a relative path without '..'".to_string(),
            });
        }
        Ok(self.root.join(rel))
    }
}

impl ObjectStore for DirObjectStore {
    fn contains_key(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|e| StoreError {
            key: key.to_string(),
            message: format!("read '{}': {e}", path.display()),
        })
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError {
                key: key.to_string(),
                message: format!("create '{}': {e}", parent.display()),
            })?;
        }
        fs::write(&path, bytes).map_err(|e| StoreError {
            key: key.to_string(),
            message: format!("write '{}': {e}", path.display()),
        })
    }
}
