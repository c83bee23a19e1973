//! # kvrec Storage
//!
//! The key-value store interface that kvrec collections are persisted in,
//! plus two backends.
//!
//! Stores are **flat string-keyed byte stores**. They do not interpret
//! the values they hold and offer only four primitives:
//!
//! - `get` a single key
//! - `put` a single key
//! - `delete` a single key
//! - `list` the keys under a prefix
//!
//! There is no multi-key atomicity. Each primitive is atomic on its own
//! key and that is the only guarantee callers can build on.
//!
//! ## Available Backends
//!
//! - [`InMemoryKv`] - For testing and ephemeral storage
//! - [`FileKv`] - One file per key inside a directory
//!
//! ## Example
//!
//! ```rust
//! use kvrec_storage::{InMemoryKv, KvStore};
//!
//! let kv = InMemoryKv::new();
//! kv.put("user:1", br#"{"id":"1"}"#).unwrap();
//! assert_eq!(kv.list("user:").unwrap(), vec!["user:1".to_string()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KvStore;
pub use error::{StorageError, StorageResult};
pub use file::{FileKv, MAX_KEY_LEN};
pub use memory::InMemoryKv;
