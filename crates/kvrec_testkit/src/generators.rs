//! Property-based test generators using proptest.
//!
//! Provides strategies for record input, patches, layouts and whole
//! operation sequences.

use kvrec_core::{IdStrategy, ItemFields, ItemPatch, Layout, TodoFields, TodoPatch, UserFields};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for free text, including quotes, colons and non-ASCII.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z ]{0,24}").expect("Invalid regex"),
        prop::string::string_regex(r#"[\PC"':\\]{0,16}"#).expect("Invalid regex"),
    ]
}

/// Strategy for storage layouts.
pub fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop_oneof![Just(Layout::Blob), Just(Layout::PerRecord)]
}

/// Strategy for id strategies.
pub fn id_strategy_strategy() -> impl Strategy<Value = IdStrategy> {
    prop_oneof![
        Just(IdStrategy::TimestampMillis),
        Just(IdStrategy::RandomBase36),
        Just(IdStrategy::Uuid),
    ]
}

/// Strategy for item create input.
pub fn item_fields_strategy() -> impl Strategy<Value = ItemFields> {
    text_strategy().prop_map(|text| ItemFields { text })
}

/// Strategy for item patches.
pub fn item_patch_strategy() -> impl Strategy<Value = ItemPatch> {
    proptest::option::of(text_strategy()).prop_map(|text| ItemPatch { text })
}

/// Strategy for todo create input.
pub fn todo_fields_strategy() -> impl Strategy<Value = TodoFields> {
    (text_strategy(), any::<bool>()).prop_map(|(title, completed)| TodoFields { title, completed })
}

/// Strategy for todo patches.
pub fn todo_patch_strategy() -> impl Strategy<Value = TodoPatch> {
    (
        proptest::option::of(text_strategy()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(title, completed)| TodoPatch { title, completed })
}

/// Strategy for user create input.
pub fn user_fields_strategy() -> impl Strategy<Value = UserFields> {
    (text_strategy(), text_strategy()).prop_map(|(name, email)| UserFields { name, email })
}

/// Strategy for JSON values that are not valid items.
///
/// Each value lacks a string `id` or a string `text`.
pub fn invalid_item_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::from),
        text_strategy().prop_map(Value::String),
        text_strategy().prop_map(|text| json!({ "text": text })),
        text_strategy().prop_map(|id| json!({ "id": id })),
        (text_strategy(), any::<bool>()).prop_map(|(id, text)| json!({ "id": id, "text": text })),
        (any::<u32>(), text_strategy()).prop_map(|(id, text)| json!({ "id": id, "text": text })),
    ]
}

/// One step of an operation-sequence test on the `items` collection.
///
/// Ids are referred to by index into the ids created so far, so that
/// sequences hit existing records most of the time.
#[derive(Debug, Clone)]
pub enum ItemOp {
    /// Create an item.
    Create(ItemFields),
    /// Get the n-th created id (modulo count), or an unknown id if none.
    Get(usize),
    /// Update the n-th created id.
    Update(usize, ItemPatch),
    /// Delete the n-th created id.
    Delete(usize),
    /// List the collection.
    List,
}

/// Strategy for a single item operation.
pub fn item_op_strategy() -> impl Strategy<Value = ItemOp> {
    prop_oneof![
        3 => item_fields_strategy().prop_map(ItemOp::Create),
        2 => any::<usize>().prop_map(ItemOp::Get),
        2 => (any::<usize>(), item_patch_strategy()).prop_map(|(n, p)| ItemOp::Update(n, p)),
        1 => any::<usize>().prop_map(ItemOp::Delete),
        1 => Just(ItemOp::List),
    ]
}

/// Strategy for a sequence of item operations.
pub fn item_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<ItemOp>> {
    prop::collection::vec(item_op_strategy(), 1..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvrec_core::{record::codec, Item};

    proptest! {
        #[test]
        fn invalid_items_never_decode(value in invalid_item_strategy()) {
            prop_assert!(codec::decode_value::<Item>(value).is_err());
        }

        #[test]
        fn op_sequences_are_bounded(ops in item_ops_strategy(20)) {
            prop_assert!(!ops.is_empty());
            prop_assert!(ops.len() < 20);
        }
    }
}
