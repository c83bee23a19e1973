//! # kvrec Core
//!
//! Typed record collections persisted in a flat key-value store.
//!
//! This crate provides:
//! - Record types and schemas for the `items`, `todos` and `users` collections
//! - A JSON record codec that validates stored payloads
//! - The key scheme mapping collections and ids onto store keys
//! - The collection engine, in two storage layouts:
//!   - **blob-list**: the whole collection is one JSON array under one key
//!   - **per-record**: each record lives under `<namespace>:<id>`
//! - Observer hooks for counters and structured logging
//! - A request adapter that validates raw input and dispatches operations
//!
//! ## Consistency
//!
//! The engine relies on nothing but single-key `get`/`put`/`delete` and
//! prefix listing. It takes no locks and performs no compare-and-swap.
//! Concurrent mutations of one blob-list collection, or of one record in
//! the per-record layout, can lose updates (last writer wins).
//!
//! ## Example
//!
//! ```rust
//! use kvrec_core::{Config, Database, ItemFields, ItemPatch};
//! use kvrec_storage::InMemoryKv;
//! use std::sync::Arc;
//!
//! let db = Database::open(Arc::new(InMemoryKv::new()), &Config::default()).unwrap();
//!
//! let item = db.items().create(ItemFields { text: "buy milk".into() }).unwrap();
//! let updated = db
//!     .items()
//!     .update(&item.id, ItemPatch { text: Some("buy bread".into()) })
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(updated.text, "buy bread");
//! assert!(db.items().delete(&item.id).unwrap());
//! assert!(db.items().list().unwrap().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
mod config;
mod database;
mod error;
mod id;
pub mod keys;
mod observer;
pub mod record;
mod stats;
pub mod store;

pub use adapter::{CollectionName, Operation, Request, RequestAdapter, Response};
pub use config::{AdapterConfig, CollectionConfig, Config, Layout, NotFoundPolicy};
pub use database::{CollectionHandle, Database};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use id::{IdGenerator, IdStrategy};
pub use keys::KeyScheme;
pub use observer::{NoopObserver, Observers, StoreEvent, StoreObserver, TracingObserver};
pub use record::{
    FieldDef, FieldType, Item, ItemFields, ItemPatch, Record, Scalar, Schema, Todo, TodoFields,
    TodoPatch, User, UserFields, UserPatch, ValidationError, Violation,
};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::{BlobListStore, Collection, CollectionStore, PerRecordStore, StoreContext};

/// Current version of kvrec.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
