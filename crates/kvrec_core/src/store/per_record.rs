//! Per-record layout.

use super::{CollectionStore, StoreContext};
use crate::config::Layout;
use crate::error::CoreResult;
use crate::id::{IdGenerator, IdStrategy};
use crate::keys::KeyScheme;
use crate::observer::StoreEvent;
use crate::record::{codec, Record, ValidationError, Violation};
use std::marker::PhantomData;

/// Stores each record under its own `<namespace>:<id>` key.
///
/// Creates never read before writing, so concurrent creates cannot
/// conflict. `update` reads and rewrites one key: two concurrent updates
/// of the same id can lose one of them.
///
/// `list` returns records in the store's key order, which is not
/// creation order.
pub struct PerRecordStore<R> {
    keys: KeyScheme,
    ids: IdGenerator,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> PerRecordStore<R> {
    /// Creates a store whose keys live under `namespace`.
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

    /// Reads and decodes the record at `key`.
    ///
    /// Absent keys and invalid payloads are both `None`; the latter are
    /// reported. A payload whose id differs from the key's is invalid.
    fn load(&self, ctx: &StoreContext<'_>, key: &str, id: &str) -> CoreResult<Option<R>> {
        let Some(bytes) = ctx.read(Self::collection(), key)? else {
            return Ok(None);
        };

        let decoded = codec::decode::<R>(&bytes).and_then(|record| {
            if record.id() == id {
                Ok(record)
            } else {
                Err(ValidationError::new(
                    Self::collection(),
                    vec![Violation::IdMismatch {
                        expected: id.to_owned(),
                        found: record.id().to_owned(),
                    }],
                ))
            }
        });

        match decoded {
            Ok(record) => Ok(Some(record)),
            Err(reason) => {
                ctx.emit(StoreEvent::Skipped {
                    collection: Self::collection(),
                    key,
                    reason: &reason,
                });
                Ok(None)
            }
        }
    }

    fn save(&self, ctx: &StoreContext<'_>, record: &R) -> CoreResult<()> {
        let key = self.keys.record_key(record.id());
        let bytes = codec::encode(record)?;
        ctx.write(Self::collection(), &key, &bytes)
    }
}

impl<R: Record> CollectionStore<R> for PerRecordStore<R> {
    fn layout(&self) -> Layout {
        Layout::PerRecord
    }

    fn keys(&self) -> &KeyScheme {
        &self.keys
    }

    fn list(&self, ctx: &StoreContext<'_>) -> CoreResult<Vec<R>> {
        let keys = ctx.list_keys(Self::collection(), self.keys.scan_prefix())?;

        let mut records = Vec::with_capacity(keys.len());
        for key in &keys {
            let Some(id) = self.keys.id_from_key(key) else {
                continue;
            };
            // A key deleted between the scan and this read is simply absent.
            if let Some(record) = self.load(ctx, key, id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn get(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<Option<R>> {
        self.load(ctx, &self.keys.record_key(id), id)
    }

    fn create(&self, ctx: &StoreContext<'_>, fields: R::Fields) -> CoreResult<R> {
        let record = R::from_fields(self.ids.generate(), fields);
        self.save(ctx, &record)?;
        Ok(record)
    }

    fn update(&self, ctx: &StoreContext<'_>, id: &str, patch: R::Patch) -> CoreResult<Option<R>> {
        let Some(mut record) = self.get(ctx, id)? else {
            return Ok(None);
        };

        record.apply(patch);
        self.save(ctx, &record)?;
        Ok(Some(record))
    }

    fn delete(&self, ctx: &StoreContext<'_>, id: &str) -> CoreResult<bool> {
        let key = self.keys.record_key(id);
        if ctx.read(Self::collection(), &key)?.is_none() {
            return Ok(false);
        }

        ctx.remove(Self::collection(), &key)?;
        Ok(true)
    }
}

impl<R> std::fmt::Debug for PerRecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerRecordStore")
            .field("prefix", &self.keys.scan_prefix())
            .field("id_strategy", &self.ids.strategy())
            .finish()
    }
}
