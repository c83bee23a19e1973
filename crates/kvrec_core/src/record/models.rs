//! The three record collections.

use super::schema::{FieldDef, FieldType, Scalar, Schema};
use super::Record;
use serde::{Deserialize, Serialize};

static ITEM_SCHEMA: Schema = Schema {
    collection: "items",
    fields: &[FieldDef::required("text", FieldType::String)],
};

static TODO_SCHEMA: Schema = Schema {
    collection: "todos",
    fields: &[
        FieldDef::required("title", FieldType::String),
        FieldDef::defaulted("completed", FieldType::Bool, Scalar::Bool(false)),
    ],
};

static USER_SCHEMA: Schema = Schema {
    collection: "users",
    fields: &[
        FieldDef::required("name", FieldType::String),
        FieldDef::required("email", FieldType::String),
    ],
};

/// A free-text item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Record id.
    pub id: String,
    /// Item text.
    pub text: String,
}

/// Create input for [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemFields {
    /// Item text.
    pub text: String,
}

/// Partial update for [`Item`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemPatch {
    /// New text, if changing.
    pub text: Option<String>,
}

impl Record for Item {
    type Fields = ItemFields;
    type Patch = ItemPatch;

    fn schema() -> &'static Schema {
        &ITEM_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_fields(id: String, fields: ItemFields) -> Self {
        Self {
            id,
            text: fields.text,
        }
    }

    fn apply(&mut self, patch: ItemPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
    }
}

/// A todo entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Record id.
    pub id: String,
    /// Todo title.
    pub title: String,
    /// Whether the todo is done.
    pub completed: bool,
}

/// Create input for [`Todo`]. `completed` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoFields {
    /// Todo title.
    pub title: String,
    /// Initial completion state.
    #[serde(default)]
    pub completed: bool,
}

/// Partial update for [`Todo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New completion state, if changing.
    pub completed: Option<bool>,
}

impl Record for Todo {
    type Fields = TodoFields;
    type Patch = TodoPatch;

    fn schema() -> &'static Schema {
        &TODO_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_fields(id: String, fields: TodoFields) -> Self {
        Self {
            id,
            title: fields.title,
            completed: fields.completed,
        }
    }

    fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Create input for [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserFields {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Partial update for [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New email, if changing.
    pub email: Option<String>,
}

impl Record for User {
    type Fields = UserFields;
    type Patch = UserPatch;

    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_fields(id: String, fields: UserFields) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_patch_changes_only_given_fields() {
        let mut todo = Todo::from_fields(
            "t1".into(),
            TodoFields {
                title: "write".into(),
                completed: false,
            },
        );

        todo.apply(TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        });

        assert_eq!(todo.id, "t1");
        assert_eq!(todo.title, "write");
        assert!(todo.completed);
    }

    #[test]
    fn empty_patch_is_identity() {
        let mut user = User::from_fields(
            "u1".into(),
            UserFields {
                name: "Alice".into(),
                email: "alice@example.com".into(),
            },
        );
        let before = user.clone();
        user.apply(UserPatch::default());
        assert_eq!(user, before);
    }

    #[test]
    fn schemas_name_their_collections() {
        assert_eq!(Item::schema().collection, "items");
        assert_eq!(Todo::schema().collection, "todos");
        assert_eq!(User::schema().collection, "users");
    }

    #[test]
    fn todo_fields_completed_defaults_false() {
        let fields: TodoFields = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(!fields.completed);
    }
}
