//! In-memory key-value store for testing.

use crate::backend::KvStore;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory key-value store.
///
/// This store keeps all entries in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral deployments that don't need persistence
///
/// Keys are listed in byte-lexicographic order.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use kvrec_storage::{InMemoryKv, KvStore};
///
/// let kv = InMemoryKv::new();
/// kv.put("items", b"[]").unwrap();
/// assert_eq!(kv.get("items").unwrap(), Some(b"[]".to_vec()));
/// assert_eq!(kv.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryKv {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryKv {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store with pre-existing entries.
    ///
    /// Useful for testing how readers cope with data they did not write.
    #[must_use]
    pub fn with_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Returns the number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of every entry.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.read().clone()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl KvStore for InMemoryKv {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::invalid_key(key, "empty key"));
        }
        self.entries.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_owned()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let kv = InMemoryKv::new();
        assert!(kv.is_empty());
        assert_eq!(kv.len(), 0);
        assert!(kv.list("").unwrap().is_empty());
    }

    #[test]
    fn memory_get_absent_is_none() {
        let kv = InMemoryKv::new();
        assert_eq!(kv.get("missing").unwrap(), None);
    }

    #[test]
    fn memory_put_then_get() {
        let kv = InMemoryKv::new();
        kv.put("todos", b"[1,2]").unwrap();
        assert_eq!(kv.get("todos").unwrap(), Some(b"[1,2]".to_vec()));
    }

    #[test]
    fn memory_put_overwrites() {
        let kv = InMemoryKv::new();
        kv.put("k", b"one").unwrap();
        kv.put("k", b"two").unwrap();
        assert_eq!(kv.get("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn memory_put_empty_key_fails() {
        let kv = InMemoryKv::new();
        let result = kv.put("", b"x");
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }

    #[test]
    fn memory_delete_removes_key() {
        let kv = InMemoryKv::new();
        kv.put("k", b"v").unwrap();
        kv.delete("k").unwrap();
        assert_eq!(kv.get("k").unwrap(), None);
    }

    #[test]
    fn memory_delete_absent_succeeds() {
        let kv = InMemoryKv::new();
        assert!(kv.delete("never-written").is_ok());
    }

    #[test]
    fn memory_list_filters_by_prefix() {
        let kv = InMemoryKv::with_entries([
            ("user:2", b"b".to_vec()),
            ("user:1", b"a".to_vec()),
            ("users", b"[]".to_vec()),
            ("todo:1", b"t".to_vec()),
        ]);

        let keys = kv.list("user:").unwrap();
        assert_eq!(keys, vec!["user:1".to_string(), "user:2".to_string()]);
    }

    #[test]
    fn memory_list_empty_prefix_returns_all() {
        let kv = InMemoryKv::with_entries([("a", b"1".to_vec()), ("b", b"2".to_vec())]);
        assert_eq!(kv.list("").unwrap().len(), 2);
    }

    #[test]
    fn memory_snapshot_and_clear() {
        let kv = InMemoryKv::new();
        kv.put("a", b"1").unwrap();
        assert_eq!(kv.snapshot().get("a"), Some(&b"1".to_vec()));

        kv.clear();
        assert!(kv.is_empty());
    }
}
