//! Blob-list layout.

use super::{CollectionStore, StoreContext};
use crate::config::Layout;
use crate::error::CoreResult;
use crate::id::{IdGenerator, IdStrategy};
use crate::keys::KeyScheme;
use crate::observer::StoreEvent;
use crate::record::{codec, json_type_name, Record, ID_FIELD};
use serde_json::Value;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Stores a whole collection as one JSON array under a single key.
///
/// Mutations rewrite the raw array: elements that fail validation stay in
/// the stored blob untouched and are only hidden from readers. A blob
/// that is not a JSON array reads as empty and is replaced by the next
/// write.
///
/// # Lost updates
///
/// `create`, `update` and `delete` each read the blob, modify it in memory
/// and write it back. Two of them running concurrently on the same
/// collection can interleave so that one write silently discards the
/// other's change. Nothing here detects or prevents that.
pub struct BlobListStore<R> {
    keys: KeyScheme,
    ids: IdGenerator,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> BlobListStore<R> {
    /// Creates a store whose blob lives at `namespace`.
    pub fn new(namespace: impl Into<String>, id_strategy: IdStrategy) -> Self {
        Self {
            keys: KeyScheme::new(namespace),
            ids: IdGenerator::new(id_strategy),
            _marker: PhantomData,
        }
    }

    fn collection() -> &'static str {
        R::schema().collection
    }

    /// Reads the raw array. Absent or non-array blobs are empty.
    fn load(&self, ctx: &StoreContext<'_>) -> CoreResult<Vec<Value>> {
        let key = self.keys.blob_key();
        let Some(bytes) = ctx.read(Self::collection(), key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(elements)) => Ok(elements),
            Ok(other) => {
                let reason = format!("expected an array, found {}", json_type_name(&other));
                ctx.emit(StoreEvent::MalformedBlob {
                    collection: Self::collection(),
                    key,
                    reason: &reason,
                });
                Ok(Vec::new())
            }
            Err(e) => {
                let reason = e.to_string();
                ctx.emit(StoreEvent::MalformedBlob {
                    collection: Self::collection(),
                    key,
                    reason: &reason,
                });
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, ctx: &StoreContext<'_>, elements: &[Value]) -> CoreResult<()> {
        let bytes = codec::encode_list(elements)?;
        ctx.write(Self::collection(), self.keys.blob_key(), &bytes)
    }

    /// Decodes one element, reporting it if invalid.
    fn decode(&self, ctx: &StoreContext<'_>, element: &Value) -> Option<R> {
        match codec::decode_value::<R>(element.clone()) {
            Ok(record) => Some(record),
            Err(reason) => {
                ctx.emit(StoreEvent::Skipped {
                    collection: Self::collection(),
                    key: self.keys.blob_key(),
                    reason: &reason,
                });
                None
            }
        }
    }

    /// Finds the first valid element whose id is `id`.
    fn find(&self, ctx: &StoreContext<'_>, elements: &[Value], id: &str) -> Option<(usize, R)> {
        elements
            .iter()
            .enumerate()
            .filter(|(_, element)| raw_id(element) == Some(id))
            .find_map(|(index, element)| self.decode(ctx, element).map(|record| (index, record)))
    }
}

impl<R: Record> CollectionStore<R> for BlobListStore<R> {
    fn layout(&self) -> Layout {
        Layout::Blob
    }

    fn keys(&self) -> &KeyScheme {
        &self.keys
    }

    fn list(&self, ctx: &StoreContext<'_>) -> CoreResult<Vec<R>> {
        let elements = self.load(ctx)?;
        Ok(elements
            .iter()
            .filter_map(|element| self.decode(ctx, element))
            .collect())
    }

    fn get(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<Option<R>> {
        let elements = self.load(ctx)?;
        Ok(self.find(ctx, &elements, id).map(|(_, record)| record))
    }

    fn create(&self, ctx: &StoreContext<'_>, fields: R::Fields) -> CoreResult<R> {
        let mut elements = self.load(ctx)?;

        let taken: HashSet<&str> = elements.iter().filter_map(raw_id).collect();
        let mut id = self.ids.generate();
        while taken.contains(id.as_str()) {
            id = self.ids.generate();
        }

        let record = R::from_fields(id, fields);
        elements.push(codec::to_value(&record)?);
        self.store(ctx, &elements)?;
        Ok(record)
    }

    fn update(&self, ctx: &StoreContext<'_>, id: &str, patch: R::Patch) -> CoreResult<Option<R>> {
        let mut elements = self.load(ctx)?;
        let Some((index, mut record)) = self.find(ctx, &elements, id) else {
            return Ok(None);
        };

        record.apply(patch);
        elements[index] = codec::to_value(&record)?;
        self.store(ctx, &elements)?;
        Ok(Some(record))
    }

    fn delete(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<bool> {
        let mut elements = self.load(ctx)?;
        let before = elements.len();
        elements.retain(|element| raw_id(element) != Some(id));
        if elements.len() == before {
            return Ok(false);
        }

        self.store(ctx, &elements)?;
        Ok(true)
    }
}

impl<R> std::fmt::Debug for BlobListStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobListStore")
            .field("key", &self.keys.blob_key())
            .field("id_strategy", &self.ids.strategy())
            .finish()
    }
}

/// The `id` of a raw element, if it is a string.
fn raw_id(element: &Value) -> Option<&str> {
    element.get(ID_FIELD).and_then(Value::as_str)
}
