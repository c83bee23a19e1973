//! Per-call store context.

use crate::error::CoreResult;
use crate::observer::{NoopObserver, StoreEvent, StoreObserver};
use kvrec_storage::KvStore;

static NOOP: NoopObserver = NoopObserver;

/// The store handle and observer threaded through every engine call.
///
/// A context is cheap to build and borrows both parts, so callers create
/// one per operation.
#[derive(Clone, Copy)]
pub struct StoreContext<'a> {
    kv: &'a dyn KvStore,
    observer: &'a dyn StoreObserver,
}

impl<'a> StoreContext<'a> {
    /// Creates a context.
    pub fn new(kv: &'a dyn KvStore, observer: &'a dyn StoreObserver) -> Self {
        Self { kv, observer }
    }

    /// Creates a context whose events go nowhere.
    pub fn unobserved(kv: &'a dyn KvStore) -> Self {
        Self::new(kv, &NOOP)
    }

    /// Returns the store handle.
    #[must_use]
    pub fn kv(&self) -> &'a dyn KvStore {
        self.kv
    }

    /// Reports an event to the observer.
    pub fn emit(&self, event: StoreEvent<'_>) {
        self.observer.on_event(&event);
    }

    pub(crate) fn read(&self, collection: &str, key: &str) -> CoreResult<Option<Vec<u8>>> {
        let value = self.kv.get(key)?;
        match &value {
            Some(bytes) => self.emit(StoreEvent::Read {
                collection,
                key,
                bytes: bytes.len(),
            }),
            None => self.emit(StoreEvent::Miss { collection, key }),
        }
        Ok(value)
    }

    pub(crate) fn write(&self, collection: &str, key: &str, bytes: &[u8]) -> CoreResult<()> {
        self.kv.put(key, bytes)?;
        self.emit(StoreEvent::Write {
            collection,
            key,
            bytes: bytes.len(),
        });
        Ok(())
    }

    pub(crate) fn remove(&self, collection: &str, key: &str) -> CoreResult<()> {
        self.kv.delete(key)?;
        self.emit(StoreEvent::Delete { collection, key });
        Ok(())
    }

    pub(crate) fn list_keys(&self, collection: &str, prefix: &str) -> CoreResult<Vec<String>> {
        let keys = self.kv.list(prefix)?;
        self.emit(StoreEvent::Scan {
            collection,
            prefix,
            keys: keys.len(),
        });
        Ok(keys)
    }
}

impl std::fmt::Debug for StoreContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StoreStats;
    use kvrec_storage::{InMemoryKv, StorageError};

    #[test]
    fn events_follow_store_calls() {
        let kv = InMemoryKv::new();
        let stats = StoreStats::new();
        let ctx = StoreContext::new(&kv, &stats);

        assert_eq!(ctx.read("items", "items").unwrap(), None);
        ctx.write("items", "items", b"[]").unwrap();
        assert_eq!(ctx.read("items", "items").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(ctx.list_keys("users", "users:").unwrap(), Vec::<String>::new());
        ctx.remove("items", "items").unwrap();

        let snap = stats.snapshot();
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.reads, 1);
        assert_eq!(snap.bytes_read, 2);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.scans, 1);
        assert_eq!(snap.deletes, 1);
    }

    #[test]
    fn failed_write_emits_nothing() {
        let kv = InMemoryKv::new();
        let stats = StoreStats::new();
        let ctx = StoreContext::new(&kv, &stats);

        let err = ctx.write("items", "", b"[]").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Storage(StorageError::InvalidKey { .. })
        ));
        assert_eq!(stats.writes(), 0);
    }

    #[test]
    fn unobserved_context_works() {
        let kv = InMemoryKv::new();
        let ctx = StoreContext::unobserved(&kv);
        ctx.write("todos", "todos", b"[]").unwrap();
        assert_eq!(ctx.kv().get("todos").unwrap(), Some(b"[]".to_vec()));
    }
}
