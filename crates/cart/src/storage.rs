//! Storage backend seam.
//!
//! The cart persists everything through a string key/value interface
//! shaped like the browser's `localStorage`: get, set, remove, and key
//! enumeration. The store and validator are generic over
//! [`StorageBackend`] so tests and embedders can supply an in-memory
//! backend, while a WASM host can forward to the real thing.
//!
//! Methods take `&self`; implementations use interior mutability, which
//! matches the ambient-storage model the cart was designed against.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

/// Storage key the serialized cart lives under.
pub const CART_KEY: &str = "cart";

/// Errors a storage backend can report on write.
///
/// Reads are infallible by design: an unreadable or missing value is
/// indistinguishable from an absent one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend refused the write because it is out of space.
    #[error("storage quota exceeded writing key '{key}'")]
    QuotaExceeded {
        /// Key whose write was rejected.
        key: String,
    },
    /// The backend is unavailable or failed in some other way.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String key/value storage.
pub trait StorageBackend {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value stored under `key`. Removing an absent key is a
    /// no-op.
    fn remove(&self, key: &str);

    /// Returns every key currently present, in unspecified order.
    fn keys(&self) -> Vec<String>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// In-memory [`StorageBackend`] used by tests and non-browser embedders.
///
/// Optionally enforces a total byte quota over stored values, mirroring
/// the `QuotaExceededError` a real `localStorage` throws when full.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty storage with no quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects writes once the total size of
    /// stored values would exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if used + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                });
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").is_none());

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));

        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v2"));

        storage.remove("k");
        assert!(storage.get("k").is_none());

        // Removing an absent key is a no-op.
        storage.remove("k");
    }

    #[test]
    fn test_keys() {
        let storage = MemoryStorage::new();
        storage.set("b", "2").unwrap();
        storage.set("a", "1").unwrap();

        let mut keys = storage.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let storage = MemoryStorage::with_quota(8);
        storage.set("a", "1234").unwrap();

        let err = storage.set("b", "56789").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                key: "b".to_owned()
            }
        );

        // Replacing an existing value only counts the replacement.
        storage.set("a", "12345678").unwrap();
    }

    #[test]
    fn test_shared_via_rc() {
        let storage = Rc::new(MemoryStorage::new());
        let alias = Rc::clone(&storage);

        alias.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }
}
