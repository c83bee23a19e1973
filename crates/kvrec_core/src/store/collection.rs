//! Typed collection handle.

use super::{BlobListStore, CollectionStore, PerRecordStore, StoreContext};
use crate::config::{CollectionConfig, Layout};
use crate::error::CoreResult;
use crate::keys::KeyScheme;
use crate::record::Record;

/// A typed collection of records.
///
/// `Collection<R>` owns the layout implementation chosen from its
/// [`CollectionConfig`] at construction. The layout never changes
/// afterwards; every call is forwarded to the same store.
///
/// # Example
///
/// ```rust
/// use kvrec_core::{Collection, CollectionConfig, Item, ItemFields, StoreContext};
/// use kvrec_storage::InMemoryKv;
///
/// let kv = InMemoryKv::new();
/// let ctx = StoreContext::unobserved(&kv);
/// let items: Collection<Item> = Collection::new(&CollectionConfig::blob());
///
/// let item = items.create(&ctx, ItemFields { text: "hello".into() }).unwrap();
/// assert_eq!(items.get(&ctx, &item.id).unwrap(), Some(item));
/// ```
pub struct Collection<R: Record> {
    store: Box<dyn CollectionStore<R>>,
}

impl<R: Record> Collection<R> {
    /// Creates a collection with the configured layout.
    pub fn new(config: &CollectionConfig) -> Self {
        let namespace = config.namespace_or(R::schema().collection).to_owned();
        let store: Box<dyn CollectionStore<R>> = match config.layout {
            Layout::Blob => Box::new(BlobListStore::<R>::new(namespace, config.id_strategy)),
            Layout::PerRecord => Box::new(PerRecordStore::<R>::new(namespace, config.id_strategy)),
        };
        Self { store }
    }

    /// Wraps a custom store implementation.
    pub fn from_store(store: Box<dyn CollectionStore<R>>) -> Self {
        Self { store }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &'static str {
        R::schema().collection
    }

    /// Returns the storage layout.
    pub fn layout(&self) -> Layout {
        self.store.layout()
    }

    /// Returns the key scheme in use.
    pub fn keys(&self) -> &KeyScheme {
        self.store.keys()
    }

    /// Lists all readable records.
    pub fn list(&self, ctx: &StoreContext<'_>) -> CoreResult<Vec<R>> {
        self.store.list(ctx)
    }

    /// Gets a record by id.
    pub fn get(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<Option<R>> {
        self.store.get(ctx, id)
    }

    /// Creates a record with a generated id.
    pub fn create(&self, ctx: &StoreContext<'_>, fields: R::Fields) -> CoreResult<R> {
        self.store.create(ctx, fields)
    }

    /// Applies a partial update. Returns `None` if the record is absent.
    pub fn update(
        &self,
        ctx: &StoreContext<'_>,
        id: &str,
        patch: R::Patch,
    ) -> CoreResult<Option<R>> {
        self.store.update(ctx, id, patch)
    }

    /// Deletes a record. Returns `false` if it did not exist.
    pub fn delete(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<bool> {
        self.store.delete(ctx, id)
    }
}

impl<R: Record> std::fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name())
            .field("layout", &self.layout())
            .finish()
    }
}
