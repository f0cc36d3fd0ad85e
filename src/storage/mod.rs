//! Durable key-value storage for conversation history
//!
//! The conversation store only needs string values under string keys plus an
//! atomic multi-key write. [`SledStore`] provides that on disk through an
//! embedded `sled` database; [`MemoryStore`] keeps everything in process and
//! is used for ephemeral sessions and tests.

use crate::error::{ParleyError, Result};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub mod types;
pub use types::WriteOp;

/// Minimal key-value contract used by the conversation store
///
/// `apply` must be all-or-nothing and durable when it returns `Ok`.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply every operation in `ops` atomically
    fn apply(&self, ops: &[WriteOp]) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn apply(&self, ops: &[WriteOp]) -> Result<()> {
        (**self).apply(ops)
    }
}

/// Default on-disk location of the conversation database
///
/// Resolves to the platform data directory, e.g.
/// `~/.local/share/parley/conversations.db` on Linux.
pub fn default_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "parley", "parley")
        .ok_or_else(|| ParleyError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("conversations.db"))
}

/// `sled`-backed key-value store
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Storage` if the database cannot be opened, which
    /// includes the case where another process already holds it.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::storage::{KeyValueStore, SledStore, WriteOp};
    ///
    /// # fn main() -> parley::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("conversations.db"))?;
    /// store.apply(&[WriteOp::put("greeting", "hello")])?;
    /// assert_eq!(store.get("greeting")?, Some("hello".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ParleyError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| ParleyError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened conversation database at {}", path.display());
        Ok(Self { db, path })
    }

    /// Open the store at [`default_path`]
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    /// Location of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let bytes = self
            .db
            .get(key.as_bytes())
            .map_err(|e| ParleyError::Storage(format!("Get failed: {}", e)))?;

        match bytes {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ParleyError::Storage(format!("Entry {} is not valid UTF-8: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn apply(&self, ops: &[WriteOp]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for op in ops {
            match op {
                WriteOp::Put { key, value } => batch.insert(key.as_bytes(), value.as_bytes()),
                WriteOp::Remove { key } => batch.remove(key.as_bytes()),
            }
        }

        self.db
            .apply_batch(batch)
            .map_err(|e| ParleyError::Storage(format!("Write failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ParleyError::Storage(format!("Flush failed: {}", e)))?;

        tracing::debug!("Applied {} storage operations", ops.len());
        Ok(())
    }
}

/// In-process key-value store
///
/// Nothing survives the process; useful for `--ephemeral` style sessions and
/// for exercising the conversation store without a database.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ParleyError::Storage("Memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, ops: &[WriteOp]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ParleyError::Storage("Memory store lock poisoned".to_string()))?;
        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                WriteOp::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_sled_store;
    use tempfile::tempdir;

    #[test]
    fn test_sled_get_missing_key_returns_none() {
        let (store, _dir) = temp_sled_store();
        assert_eq!(store.get("missing").expect("get failed"), None);
    }

    #[test]
    fn test_sled_put_then_get() {
        let (store, _dir) = temp_sled_store();
        store
            .apply(&[WriteOp::put("index", "[]")])
            .expect("apply failed");
        assert_eq!(
            store.get("index").expect("get failed"),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_sled_batch_puts_and_removes_together() {
        let (store, _dir) = temp_sled_store();
        store
            .apply(&[WriteOp::put("a", "1"), WriteOp::put("b", "2")])
            .expect("first apply failed");
        store
            .apply(&[WriteOp::remove("a"), WriteOp::put("b", "3")])
            .expect("second apply failed");

        assert_eq!(store.get("a").expect("get a"), None);
        assert_eq!(store.get("b").expect("get b"), Some("3".to_string()));
    }

    #[test]
    fn test_sled_remove_missing_key_is_ok() {
        let (store, _dir) = temp_sled_store();
        assert!(store.apply(&[WriteOp::remove("never-written")]).is_ok());
    }

    #[test]
    fn test_sled_data_survives_reopen() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("nested").join("conversations.db");

        {
            let store = SledStore::open(&path).expect("open failed");
            store
                .apply(&[WriteOp::put("k", "v")])
                .expect("apply failed");
        }

        let reopened = SledStore::open(&path).expect("reopen failed");
        assert_eq!(reopened.get("k").expect("get failed"), Some("v".to_string()));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_memory_store_put_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store
            .apply(&[WriteOp::put("x", "1"), WriteOp::put("y", "2")])
            .expect("apply failed");
        assert_eq!(store.len(), 2);

        store.apply(&[WriteOp::remove("x")]).expect("apply failed");
        assert_eq!(store.get("x").expect("get x"), None);
        assert_eq!(store.get("y").expect("get y"), Some("2".to_string()));
    }

    #[test]
    fn test_write_op_key() {
        assert_eq!(WriteOp::put("k1", "v").key(), "k1");
        assert_eq!(WriteOp::remove("k2").key(), "k2");
    }
}
