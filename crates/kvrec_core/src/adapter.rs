//! Request adapter.
//!
//! Sits between a query/mutation protocol and the collection engine. It
//! turns already-parsed arguments into a typed [`Request`], validates
//! create and update input against the collection schema, dispatches to
//! the [`Database`] and decides how a missing record is surfaced:
//!
//! | operation | record missing                                  |
//! |-----------|-------------------------------------------------|
//! | `list`    | n/a                                             |
//! | `get`     | `null`, or `NotFound` with [`NotFoundPolicy::Error`] |
//! | `update`  | `null`, or `NotFound` with [`NotFoundPolicy::Error`] |
//! | `delete`  | `false`                                         |
//!
//! Nothing is retried. Storage failures propagate as they are.

use crate::config::{AdapterConfig, NotFoundPolicy};
use crate::database::{CollectionHandle, Database};
use crate::error::{CoreError, CoreResult};
use crate::record::{
    codec, json_type_name, Item, Record, Schema, Todo, User, ValidationError, ID_FIELD,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Argument name holding a nested input object.
const INPUT_ARG: &str = "input";

/// A collection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List every record.
    List,
    /// Fetch one record by id.
    Get,
    /// Create a record.
    Create,
    /// Partially update a record.
    Update,
    /// Delete a record.
    Delete,
}

impl Operation {
    /// All operations.
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    /// Returns the lowercase operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns true if the operation addresses one id.
    #[must_use]
    pub const fn needs_id(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::invalid_request(format!("unknown operation: {s}")))
    }
}

/// One of the configured collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    /// `items { text }`
    Items,
    /// `todos { title, completed }`
    Todos,
    /// `users { name, email }`
    Users,
}

impl CollectionName {
    /// All collections.
    pub const ALL: [Self; 3] = [Self::Items, Self::Todos, Self::Users];

    /// Returns the collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Todos => "todos",
            Self::Users => "users",
        }
    }

    /// Returns the single-record query name (`item`, `todo`, `user`).
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Items => "item",
            Self::Todos => "todo",
            Self::Users => "user",
        }
    }

    /// Returns the collection's field schema.
    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Items => Item::schema(),
            Self::Todos => Todo::schema(),
            Self::Users => User::schema(),
        }
    }

    /// Type names used in operation names, singular and plural.
    const fn type_names(self) -> (&'static str, &'static str) {
        match self {
            Self::Items => ("Item", "Items"),
            Self::Todos => ("Todo", "Todos"),
            Self::Users => ("User", "Users"),
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::invalid_request(format!("unknown collection: {s}")))
    }
}

/// A parsed request for one collection operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// What to do.
    pub operation: Operation,
    /// Which collection.
    pub collection: CollectionName,
    /// Target id, for `get`, `update` and `delete`.
    pub id: Option<String>,
    /// Raw input fields, for `create` and `update`.
    pub fields: Map<String, Value>,
}

impl Request {
    fn new(operation: Operation, collection: CollectionName) -> Self {
        Self {
            operation,
            collection,
            id: None,
            fields: Map::new(),
        }
    }

    /// A `list` request.
    #[must_use]
    pub fn list(collection: CollectionName) -> Self {
        Self::new(Operation::List, collection)
    }

    /// A `get` request.
    #[must_use]
    pub fn get(collection: CollectionName, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(Operation::Get, collection)
        }
    }

    /// A `create` request.
    #[must_use]
    pub fn create(collection: CollectionName, fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::new(Operation::Create, collection)
        }
    }

    /// An `update` request.
    #[must_use]
    pub fn update(
        collection: CollectionName,
        id: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            fields,
            ..Self::new(Operation::Update, collection)
        }
    }

    /// A `delete` request.
    #[must_use]
    pub fn delete(collection: CollectionName, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(Operation::Delete, collection)
        }
    }

    /// Parses a query/mutation call such as `createTodo(title: "x")`.
    ///
    /// Accepted names, shown for `todos`:
    ///
    /// - `todos`, `listTodos`
    /// - `todo`, `getTodo`
    /// - `createTodo`, `updateTodo`, `deleteTodo`
    ///
    /// `args` must be an object (or null for no arguments). `id` may be a
    /// string or a number. Every other argument is an input field; an
    /// object under `input` is flattened into the fields.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRequest` for an unknown name, malformed
    /// arguments or a missing id.
    pub fn from_operation_name(name: &str, args: &Value) -> CoreResult<Self> {
        let (operation, collection) = parse_operation_name(name)
            .ok_or_else(|| CoreError::invalid_request(format!("unknown operation: {name}")))?;

        let args = match args {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(CoreError::invalid_request(format!(
                    "{name}: arguments must be an object, found {}",
                    json_type_name(other)
                )))
            }
        };

        let mut request = Self::new(operation, collection);
        for (arg, value) in args {
            if arg == ID_FIELD {
                request.id = parse_id(name, value)?;
            } else if arg == INPUT_ARG {
                match value {
                    Value::Object(input) => request.fields.extend(input),
                    Value::Null => {}
                    _ => {
                        return Err(CoreError::invalid_request(format!(
                            "{name}: `input` must be an object"
                        )))
                    }
                }
            } else {
                request.fields.insert(arg, value);
            }
        }

        if operation.needs_id() && request.id.is_none() {
            return Err(CoreError::invalid_request(format!("{name}: missing `id`")));
        }
        if matches!(operation, Operation::Create | Operation::Update) {
            request.fields.remove(ID_FIELD);
        } else {
            request.fields.clear();
        }
        Ok(request)
    }

    fn require_id(&self) -> CoreResult<&str> {
        match self.id.as_deref() {
            Some("") => Err(CoreError::invalid_request(format!(
                "{} {}: empty `id`",
                self.operation, self.collection
            ))),
            Some(id) => Ok(id),
            None => Err(CoreError::invalid_request(format!(
                "{} {}: missing `id`",
                self.operation, self.collection
            ))),
        }
    }
}

fn parse_operation_name(name: &str) -> Option<(Operation, CollectionName)> {
    for collection in CollectionName::ALL {
        let (one, many) = collection.type_names();
        let operation = if name == collection.as_str() || name.strip_prefix("list") == Some(many) {
            Operation::List
        } else if name == collection.singular() || name.strip_prefix("get") == Some(one) {
            Operation::Get
        } else if name.strip_prefix("create") == Some(one) {
            Operation::Create
        } else if name.strip_prefix("update") == Some(one) {
            Operation::Update
        } else if name.strip_prefix("delete") == Some(one) {
            Operation::Delete
        } else {
            continue;
        };
        return Some((operation, collection));
    }
    None
}

fn parse_id(name: &str, value: Value) -> CoreResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(CoreError::invalid_request(format!(
            "{name}: `id` must be a string, found {}",
            json_type_name(&other)
        ))),
    }
}

/// The result of an operation, in protocol shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `list`: every readable record.
    Records(Vec<Value>),
    /// `get`, `create`, `update`: the record, or null if it is missing.
    Record(Option<Value>),
    /// `delete`: whether anything was removed.
    Deleted(bool),
}

impl Response {
    /// Converts the response into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Records(records) => Value::Array(records),
            Self::Record(record) => record.unwrap_or(Value::Null),
            Self::Deleted(deleted) => Value::Bool(deleted),
        }
    }
}

/// Executes [`Request`]s against a [`Database`].
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    db: Arc<Database>,
    config: AdapterConfig,
}

impl RequestAdapter {
    /// Creates an adapter.
    pub fn new(db: Arc<Database>, config: AdapterConfig) -> Self {
        Self { db, config }
    }

    /// Returns the database.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Returns the adapter configuration.
    pub fn config(&self) -> AdapterConfig {
        self.config
    }

    /// Executes a request.
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidRequest` if the id is missing
    /// - `CoreError::Validation` if create/update input is invalid
    /// - `CoreError::NotFound` if the record is missing and the policy says so
    /// - `CoreError::Storage` if the store fails
    pub fn execute(&self, request: &Request) -> CoreResult<Response> {
        tracing::debug!(
            operation = %request.operation,
            collection = %request.collection,
            id = request.id.as_deref(),
            "executing request"
        );

        let result = match request.collection {
            CollectionName::Items => self.dispatch(self.db.items(), request),
            CollectionName::Todos => self.dispatch(self.db.todos(), request),
            CollectionName::Users => self.dispatch(self.db.users(), request),
        };

        if let Err(e) = &result {
            tracing::debug!(
                operation = %request.operation,
                collection = %request.collection,
                kind = e.kind().as_str(),
                error = %e,
                "request failed"
            );
        }
        result
    }

    /// Parses and executes a named call, returning the protocol value.
    ///
    /// # Errors
    ///
    /// See [`Request::from_operation_name`] and [`RequestAdapter::execute`].
    pub fn execute_named(&self, name: &str, args: &Value) -> CoreResult<Value> {
        let request = Request::from_operation_name(name, args)?;
        self.execute(&request).map(Response::into_value)
    }

    fn dispatch<R: Record>(
        &self,
        handle: CollectionHandle<'_, R>,
        request: &Request,
    ) -> CoreResult<Response> {
        let schema = R::schema();
        match request.operation {
            Operation::List => {
                let records = handle.list()?;
                let values = records
                    .iter()
                    .map(codec::to_value)
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(Response::Records(values))
            }
            Operation::Get => {
                let id = request.require_id()?;
                match handle.get(id)? {
                    Some(record) => Ok(Response::Record(Some(codec::to_value(&record)?))),
                    None => missing(self.config.get_not_found, schema, id),
                }
            }
            Operation::Create => {
                let fields = schema.validate_create(&request.fields)?;
                let record = handle.create(from_fields(schema, fields)?)?;
                Ok(Response::Record(Some(codec::to_value(&record)?)))
            }
            Operation::Update => {
                let id = request.require_id()?;
                let patch = schema.validate_patch(&request.fields)?;
                match handle.update(id, from_fields(schema, patch)?)? {
                    Some(record) => Ok(Response::Record(Some(codec::to_value(&record)?))),
                    None => missing(self.config.update_not_found, schema, id),
                }
            }
            Operation::Delete => {
                let id = request.require_id()?;
                Ok(Response::Deleted(handle.delete(id)?))
            }
        }
    }
}

fn missing(policy: NotFoundPolicy, schema: &Schema, id: &str) -> CoreResult<Response> {
    match policy {
        NotFoundPolicy::Null => Ok(Response::Record(None)),
        NotFoundPolicy::Error => Err(CoreError::not_found(schema.collection, id)),
    }
}

/// Deserializes validated input into a typed fields or patch struct.
fn from_fields<T: DeserializeOwned>(
    schema: &Schema,
    fields: Map<String, Value>,
) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ValidationError::malformed(schema.collection, e.to_string()))
}
