//! Record codec.
//!
//! Records are stored as compact JSON. Encoding is deterministic because
//! serde emits struct fields in declaration order. Decoding parses,
//! validates against the collection schema and only then deserializes,
//! so a value that decodes is always a complete, well-typed record.

use super::schema::ValidationError;
use super::Record;
use crate::error::CoreResult;
use serde_json::Value;

/// Encodes a record to JSON bytes.
///
/// # Errors
///
/// Returns `CoreError::Encode` if serialization fails.
pub fn encode<R: Record>(record: &R) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

/// Converts a record to a JSON value.
///
/// # Errors
///
/// Returns `CoreError::Encode` if serialization fails.
pub fn to_value<R: Record>(record: &R) -> CoreResult<Value> {
    Ok(serde_json::to_value(record)?)
}

/// Encodes an array of raw elements, as stored by the blob-list layout.
///
/// # Errors
///
/// Returns `CoreError::Encode` if serialization fails.
pub fn encode_list(elements: &[Value]) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(elements)?)
}

/// Decodes and validates a record from JSON bytes.
///
/// # Errors
///
/// Returns a `ValidationError` if the bytes are not JSON, or a required
/// field is missing or mistyped.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, ValidationError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ValidationError::malformed(R::schema().collection, e.to_string()))?;
    decode_value(value)
}

/// Validates and decodes a record from an already-parsed JSON value.
///
/// # Errors
///
/// Returns a `ValidationError` if a required field is missing or mistyped.
pub fn decode_value<R: Record>(value: Value) -> Result<R, ValidationError> {
    let schema = R::schema();
    schema.validate_record(&value)?;
    serde_json::from_value(value)
        .map_err(|e| ValidationError::malformed(schema.collection, e.to_string()))
}
