//! Reference model for operation-sequence tests.
//!
//! [`ItemModel`] tracks what the `items` collection should contain after
//! a sequence of operations. [`check_item_ops`] replays a sequence on a
//! real database and the model side by side and panics on divergence.

use crate::generators::ItemOp;
use kvrec_core::{Database, Item, Record};
use std::collections::BTreeMap;

/// Unknown id used when an operation refers to an empty collection.
pub const UNKNOWN_ID: &str = "no-such-id";

/// Expected contents of the `items` collection.
#[derive(Debug, Default, Clone)]
pub struct ItemModel {
    records: BTreeMap<String, Item>,
    created: Vec<String>,
}

impl ItemModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a created item.
    pub fn insert(&mut self, item: Item) {
        self.created.push(item.id.clone());
        self.records.insert(item.id.clone(), item);
    }

    /// Returns the n-th created id (modulo count), live or deleted.
    pub fn pick(&self, n: usize) -> String {
        if self.created.is_empty() {
            UNKNOWN_ID.to_owned()
        } else {
            self.created[n % self.created.len()].clone()
        }
    }

    /// Returns the expected record.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.records.get(id)
    }

    /// Applies an update, returning the expected result.
    pub fn update(&mut self, id: &str, patch: <Item as Record>::Patch) -> Option<Item> {
        let item = self.records.get_mut(id)?;
        item.apply(patch);
        Some(item.clone())
    }

    /// Applies a delete, returning whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }

    /// Returns the expected records sorted by id.
    pub fn sorted(&self) -> Vec<Item> {
        self.records.values().cloned().collect()
    }
}

/// Replays `ops` on `db` and on a fresh model, asserting they agree.
///
/// Listing order is layout-specific, so lists are compared sorted by id.
///
/// # Panics
///
/// Panics on the first divergence or store error.
pub fn check_item_ops(db: &Database, ops: &[ItemOp]) -> ItemModel {
    let mut model = ItemModel::new();
    let items = db.items();

    for (step, op) in ops.iter().enumerate() {
        match op {
            ItemOp::Create(fields) => {
                let item = items.create(fields.clone()).expect("create failed");
                assert_eq!(item.text, fields.text, "step {step}: create");
                assert!(model.get(&item.id).is_none(), "step {step}: id reused");
                model.insert(item);
            }
            ItemOp::Get(n) => {
                let id = model.pick(*n);
                let got = items.get(&id).expect("get failed");
                assert_eq!(got.as_ref(), model.get(&id), "step {step}: get {id}");
            }
            ItemOp::Update(n, patch) => {
                let id = model.pick(*n);
                let got = items.update(&id, patch.clone()).expect("update failed");
                let expected = model.update(&id, patch.clone());
                assert_eq!(got, expected, "step {step}: update {id}");
            }
            ItemOp::Delete(n) => {
                let id = model.pick(*n);
                let got = items.delete(&id).expect("delete failed");
                assert_eq!(got, model.delete(&id), "step {step}: delete {id}");
            }
            ItemOp::List => {
                let mut listed = items.list().expect("list failed");
                listed.sort_by(|a, b| a.id.cmp(&b.id));
                assert_eq!(listed, model.sorted(), "step {step}: list");
            }
        }
    }

    let mut listed = items.list().expect("list failed");
    listed.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(listed, model.sorted(), "final list");
    model
}
