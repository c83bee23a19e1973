//! # kvrec Testkit
//!
//! Test utilities for kvrec.
//!
//! This crate provides:
//! - Test databases over memory and temporary directories
//! - A fault-injecting store and helpers that seed corrupt data
//! - Property-based test generators using proptest
//! - An in-memory reference model for operation-sequence tests
//! - Concurrency helpers that measure lost updates
//!
//! ## Usage
//!
//! ```rust
//! use kvrec_core::{ItemFields, Layout};
//! use kvrec_testkit::prelude::*;
//!
//! with_temp_db(Layout::PerRecord, |db| {
//!     let item = db.items().create(ItemFields { text: "x".into() }).unwrap();
//!     assert!(db.items().get(&item.id).unwrap().is_some());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use stress::*;
