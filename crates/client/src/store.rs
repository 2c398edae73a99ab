//! Device key-value storage for session credentials.
//!
//! The backend contract uses exactly three keys: access token, refresh
//! token, and the serialized user record. There is no schema versioning -
//! unknown or stale values are simply cleared on the next invalidation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Storage key for the short-lived bearer token.
pub const ACCESS_TOKEN_KEY: &str = "nivasity.access_token";
/// Storage key for the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "nivasity.refresh_token";
/// Storage key for the serialized [`crate::models::User`] record.
pub const USER_KEY: &str = "nivasity.user";

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Abstraction over the device's key-value storage.
///
/// Implementations must be cheap to call from async code: operations are
/// synchronous and expected to touch at most a few kilobytes.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. The default for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Single-file JSON store so CLI sessions survive process restarts.
///
/// The whole map is rewritten on every mutation; the payload is three short
/// strings, so this stays well under a disk block.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file. The file and its parent
    /// directory are created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).unwrap(),
            Some("abc".to_string())
        );

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("nope").unwrap();
    }

    #[test]
    fn test_file_store_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "nivasity-store-test-{}-roundtrip.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = FileStore::new(&path);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);

        store.set(REFRESH_TOKEN_KEY, "r-1").unwrap();
        store.set(USER_KEY, "{\"id\":1}").unwrap();

        // A second handle sees the persisted values
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(REFRESH_TOKEN_KEY).unwrap(),
            Some("r-1".to_string())
        );

        reopened.remove(REFRESH_TOKEN_KEY).unwrap();
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(reopened.get(USER_KEY).unwrap(), Some("{\"id\":1}".to_string()));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_tolerates_missing_file() {
        let path = std::env::temp_dir().join(format!(
            "nivasity-store-test-{}-missing.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = FileStore::new(&path);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        store.remove(ACCESS_TOKEN_KEY).unwrap();
    }
}
