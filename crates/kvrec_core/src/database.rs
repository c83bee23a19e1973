//! Database facade.

use crate::config::{Config, Layout};
use crate::error::CoreResult;
use crate::observer::{Observers, StoreObserver, TracingObserver};
use crate::record::{Item, Record, Todo, User};
use crate::stats::StoreStats;
use crate::store::{Collection, StoreContext};
use kvrec_storage::{FileKv, InMemoryKv, KvStore};
use std::path::Path;
use std::sync::Arc;

/// The main database handle.
///
/// `Database` owns the store handle, the observers and the three typed
/// collections. Each call builds a fresh [`StoreContext`] from the handle
/// it was opened with; there is no shared global store and no cache, so
/// every operation reads the store again.
///
/// Events go to a [`TracingObserver`], the database's [`StoreStats`] and
/// any observer added with [`Database::with_observer`].
///
/// ```rust
/// use kvrec_core::{Database, UserFields};
///
/// let db = Database::open_in_memory();
/// let user = db
///     .users()
///     .create(UserFields { name: "Ada".into(), email: "ada@example.com".into() })
///     .unwrap();
/// assert_eq!(db.users().get(&user.id).unwrap(), Some(user));
/// ```
pub struct Database {
    kv: Arc<dyn KvStore>,
    observers: Observers,
    stats: Arc<StoreStats>,
    items: Collection<Item>,
    todos: Collection<Todo>,
    users: Collection<User>,
}

impl Database {
    /// Opens a database over an existing store handle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the configuration is invalid.
    pub fn open(kv: Arc<dyn KvStore>, config: &Config) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::build(kv, config))
    }

    /// Opens a database backed by files in `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the
    /// configuration is invalid.
    pub fn open_dir(path: &Path, config: &Config) -> CoreResult<Self> {
        config.validate()?;
        let kv = FileKv::open(path)?;
        tracing::info!(path = %path.display(), "opened file store");
        Ok(Self::build(Arc::new(kv), config))
    }

    /// Opens an empty in-memory database with the default configuration.
    pub fn open_in_memory() -> Self {
        Self::build(Arc::new(InMemoryKv::new()), &Config::default())
    }

    fn build(kv: Arc<dyn KvStore>, config: &Config) -> Self {
        let stats = Arc::new(StoreStats::new());
        let observers = Observers::new()
            .with(Arc::new(TracingObserver))
            .with(stats.clone());

        for (name, collection) in config.collections() {
            tracing::debug!(
                collection = name,
                layout = ?collection.layout,
                namespace = collection.namespace_or(name),
                "configured collection"
            );
        }

        Self {
            kv,
            observers,
            stats,
            items: Collection::new(&config.items),
            todos: Collection::new(&config.todos),
            users: Collection::new(&config.users),
        }
    }

    /// Adds an observer that receives every subsequent event.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observers = std::mem::take(&mut self.observers).with(observer);
        self
    }

    /// Returns a context for calling collections directly.
    pub fn context(&self) -> StoreContext<'_> {
        StoreContext::new(self.kv.as_ref(), &self.observers)
    }

    /// Returns the store handle.
    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    /// Returns the store statistics.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Returns the `items` collection.
    pub fn items(&self) -> CollectionHandle<'_, Item> {
        CollectionHandle::new(self, &self.items)
    }

    /// Returns the `todos` collection.
    pub fn todos(&self) -> CollectionHandle<'_, Todo> {
        CollectionHandle::new(self, &self.todos)
    }

    /// Returns the `users` collection.
    pub fn users(&self) -> CollectionHandle<'_, User> {
        CollectionHandle::new(self, &self.users)
    }

    /// Returns `(collection, layout)` for every collection.
    pub fn layouts(&self) -> [(&'static str, Layout); 3] {
        [
            (self.items.name(), self.items.layout()),
            (self.todos.name(), self.todos.layout()),
            (self.users.name(), self.users.layout()),
        ]
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("items", &self.items)
            .field("todos", &self.todos)
            .field("users", &self.users)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// A collection bound to its database.
///
/// Supplies the [`StoreContext`] so callers don't have to.
pub struct CollectionHandle<'a, R: Record> {
    db: &'a Database,
    collection: &'a Collection<R>,
}

impl<'a, R: Record> CollectionHandle<'a, R> {
    fn new(db: &'a Database, collection: &'a Collection<R>) -> Self {
        Self { db, collection }
    }

    /// Returns the underlying collection.
    pub fn collection(&self) -> &'a Collection<R> {
        self.collection
    }

    /// Lists all readable records.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store fails.
    pub fn list(&self) -> CoreResult<Vec<R>> {
        self.collection.list(&self.db.context())
    }

    /// Gets a record by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store fails.
    pub fn get(&self, id: &str) -> CoreResult<Option<R>> {
        self.collection.get(&self.db.context(), id)
    }

    /// Creates a record with a generated id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store fails.
    pub fn create(&self, fields: R::Fields) -> CoreResult<R> {
        self.collection.create(&self.db.context(), fields)
    }

    /// Applies a partial update. Returns `None` if the record is absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store fails.
    pub fn update(&self, id: &str, patch: R::Patch) -> CoreResult<Option<R>> {
        self.collection.update(&self.db.context(), id, patch)
    }

    /// Deletes a record. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store fails.
    pub fn delete(&self, id: &str) -> CoreResult<bool> {
        self.collection.delete(&self.db.context(), id)
    }
}

impl<R: Record> Clone for CollectionHandle<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Record> Copy for CollectionHandle<'_, R> {}

impl<R: Record> std::fmt::Debug for CollectionHandle<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.collection, f)
    }
}
