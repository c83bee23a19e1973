//! Record types, schemas and the record codec.
//!
//! Each collection has one statically-typed record struct plus an input
//! struct for create (`*Fields`) and one for partial update (`*Patch`).

pub mod codec;
mod models;
mod schema;

pub use models::{
    Item, ItemFields, ItemPatch, Todo, TodoFields, TodoPatch, User, UserFields, UserPatch,
};
pub use schema::{
    json_type_name, FieldDef, FieldType, Scalar, Schema, ValidationError, Violation, ID_FIELD,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for types that can be stored in a collection.
///
/// Implementors must provide:
/// - `schema()`: the field schema stored payloads are validated against
/// - `id()`: the stable, immutable record identifier
/// - `from_fields()`: builds a record from an engine-assigned id and
///   validated create input
/// - `apply()`: merges a partial update, never touching the id
///
/// Serialization uses serde; the struct's field declaration order fixes
/// the JSON key order, so encoding is deterministic.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Create input: every field except `id`.
    type Fields: DeserializeOwned + Debug + Send;

    /// Partial update input: every field optional.
    type Patch: DeserializeOwned + Debug + Default + Send;

    /// Returns the collection schema.
    fn schema() -> &'static Schema;

    /// Returns the record's id.
    fn id(&self) -> &str;

    /// Builds a record from a freshly generated id and create input.
    fn from_fields(id: String, fields: Self::Fields) -> Self;

    /// Applies a partial update in place.
    fn apply(&mut self, patch: Self::Patch);
}
