//! Test fixtures and database helpers.
//!
//! Provides test databases over memory or a temporary directory, a store
//! wrapper that fails on demand, and helpers that write raw (possibly
//! corrupt) payloads straight into a store.

use kvrec_core::{Config, Database, Layout};
use kvrec_storage::{FileKv, InMemoryKv, KvStore, StorageError, StorageResult};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates an in-memory test database using `layout` everywhere.
    pub fn memory(layout: Layout) -> Self {
        Self::memory_with(&Config::new().with_layout(layout))
    }

    /// Creates an in-memory test database with a custom configuration.
    pub fn memory_with(config: &Config) -> Self {
        let db = Database::open(Arc::new(InMemoryKv::new()), config)
            .expect("Failed to open in-memory database");
        Self {
            db,
            _temp_dir: None,
        }
    }

    /// Creates a file-backed test database using `layout` everywhere.
    pub fn file(layout: Layout) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_dir(temp_dir.path(), &Config::new().with_layout(layout))
            .expect("Failed to open file database");
        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Reopens a file-based database over the same directory.
    ///
    /// Returns `None` for in-memory databases.
    pub fn reopen(&self, config: &Config) -> Option<Database> {
        let path = self.path()?;
        Some(Database::open_dir(path, config).expect("Failed to reopen file database"))
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use kvrec_core::{Layout, TodoFields};
/// use kvrec_testkit::with_temp_db;
///
/// with_temp_db(Layout::Blob, |db| {
///     let todo = db
///         .todos()
///         .create(TodoFields { title: "t".into(), completed: false })
///         .unwrap();
///     assert_eq!(db.todos().list().unwrap(), vec![todo]);
/// });
/// ```
pub fn with_temp_db<F, R>(layout: Layout, f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory(layout);
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(layout: Layout, f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file(layout);
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, path)
}

/// A store operation that [`FaultyKv`] can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `delete`
    Delete,
    /// `list`
    List,
}

/// A store wrapper that fails selected operations on demand.
///
/// Failures are reported as `StorageError::Unavailable`. Every call is
/// counted, failed or not, so tests can assert that nothing was retried.
#[derive(Debug, Default)]
pub struct FaultyKv<S = InMemoryKv> {
    inner: S,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    fail_list: AtomicBool,
    calls: AtomicUsize,
}

impl FaultyKv {
    /// Creates a healthy wrapper around an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: KvStore> FaultyKv<S> {
    /// Wraps an existing store.
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            fail_get: AtomicBool::new(false),
            fail_put: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Makes every subsequent call of `op` fail.
    pub fn fail(&self, op: Fault) {
        self.flag(op).store(true, Ordering::SeqCst);
    }

    /// Stops failing `op`.
    pub fn heal(&self, op: Fault) {
        self.flag(op).store(false, Ordering::SeqCst);
    }

    /// Returns the number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn flag(&self, op: Fault) -> &AtomicBool {
        match op {
            Fault::Get => &self.fail_get,
            Fault::Put => &self.fail_put,
            Fault::Delete => &self.fail_delete,
            Fault::List => &self.fail_list,
        }
    }

    fn check(&self, op: Fault) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.flag(op).load(Ordering::SeqCst) {
            Err(StorageError::unavailable(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

impl<S: KvStore> KvStore for FaultyKv<S> {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.check(Fault::Get)?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.check(Fault::Put)?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.check(Fault::Delete)?;
        self.inner.delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.check(Fault::List)?;
        self.inner.list(prefix)
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use kvrec_core::{keys, ItemFields};
    use serde_json::Value;

    /// Writes `elements` as the blob of a blob-list collection.
    pub fn seed_blob(kv: &dyn KvStore, namespace: &str, elements: &[Value]) {
        let bytes = serde_json::to_vec(elements).expect("Failed to encode blob");
        kv.put(&keys::blob_key(namespace), &bytes)
            .expect("Failed to seed blob");
    }

    /// Writes raw bytes as one record of a per-record collection.
    pub fn seed_record(kv: &dyn KvStore, namespace: &str, id: &str, payload: &[u8]) {
        kv.put(&keys::record_key(namespace, id), payload)
            .expect("Failed to seed record");
    }

    /// Elements that no collection schema accepts.
    pub fn corrupt_elements() -> Vec<Value> {
        vec![
            Value::String("not an object".into()),
            Value::Null,
            serde_json::json!({"text": "no id"}),
            serde_json::json!({"id": 7, "text": "numeric id"}),
            serde_json::json!({"id": "wrong-types", "text": 1, "title": 2, "name": []}),
        ]
    }

    /// Creates a database with `count` items already stored.
    pub fn populated_database(layout: Layout, count: usize) -> TestDatabase {
        let db = TestDatabase::memory(layout);
        for i in 0..count {
            db.items()
                .create(ItemFields {
                    text: format!("item {i}"),
                })
                .expect("Failed to create item");
        }
        db
    }
}
