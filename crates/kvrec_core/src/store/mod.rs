//! The collection engine.
//!
//! [`CollectionStore`] is the CRUD contract every layout implements:
//!
//! - [`BlobListStore`]: the whole collection is one JSON array under a
//!   single key. Every mutation is a read-modify-write of that key.
//! - [`PerRecordStore`]: each record lives under `<namespace>:<id>`.
//!   Mutations touch only their own key.
//!
//! Neither layout locks. Two writers racing on the same blob (or the same
//! per-record key) can lose an update; the last `put` wins.
//!
//! Stored payloads that fail validation are treated as absent on every
//! read path and reported to the observer as [`StoreEvent::Skipped`].
//!
//! [`StoreEvent::Skipped`]: crate::StoreEvent::Skipped

mod blob;
mod collection;
mod context;
mod per_record;

pub use blob::BlobListStore;
pub use collection::Collection;
pub use context::StoreContext;
pub use per_record::PerRecordStore;

use crate::config::Layout;
use crate::error::CoreResult;
use crate::keys::KeyScheme;
use crate::record::Record;

/// CRUD operations over one collection.
///
/// Every call receives the store handle through a [`StoreContext`]; an
/// implementation holds only its key scheme and id generator.
pub trait CollectionStore<R: Record>: Send + Sync {
    /// Returns the storage layout.
    fn layout(&self) -> Layout;

    /// Returns the key scheme of the collection's namespace.
    fn keys(&self) -> &KeyScheme;

    /// Returns every readable record.
    ///
    /// An absent or unreadable collection is empty, never an error.
    fn list(&self, ctx: &StoreContext<'_>) -> CoreResult<Vec<R>>;

    /// Returns the record with `id`, or `None` if it is absent or its
    /// stored payload is invalid.
    fn get(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<Option<R>>;

    /// Assigns a fresh id, stores the record and returns it.
    fn create(&self, ctx: &StoreContext<'_>, fields: R::Fields) -> CoreResult<R>;

    /// Merges `patch` into the record with `id`.
    ///
    /// Returns `None` if there is no such record. The id is never changed.
    fn update(&self, ctx: &StoreContext<'_>, id: &str, patch: R::Patch) -> CoreResult<Option<R>>;

    /// Removes the record with `id`. Returns `false` if nothing was stored.
    fn delete(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<bool>;
}
