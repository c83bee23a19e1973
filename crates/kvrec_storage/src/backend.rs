//! Key-value store trait definition.

use crate::error::StorageResult;
use std::sync::Arc;

/// A flat key-value store.
///
/// Stores hold **opaque bytes** under string keys. kvrec owns all
/// interpretation of the values - stores do not know about records,
/// collections or JSON.
///
/// # Invariants
///
/// - `get` returns exactly the bytes most recently `put` under that key
/// - `put` and `delete` are atomic per key; nothing spans two keys
/// - `delete` of an absent key succeeds
/// - `list` returns every live key starting with `prefix`, in the
///   store's native order
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryKv`] - For testing
/// - [`super::FileKv`] - For persistent storage
pub trait KvStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not acceptable to the store or the
    /// write fails.
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Lists the names of all keys starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key space cannot be enumerated.
    fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list(prefix)
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list(prefix)
    }
}
