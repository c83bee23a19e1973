//! Collection schemas and field validation.
//!
//! Validation is a set of pure functions from raw JSON to either a
//! normalized value or a [`ValidationError`] listing every violation.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Name of the id field present on every record.
pub const ID_FIELD: &str = "id";

/// Primitive type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON boolean.
    Bool,
    /// JSON number.
    Number,
}

impl FieldType {
    /// Returns true if `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Number => value.is_number(),
        }
    }

    /// Interprets command-line text as a value of this type.
    ///
    /// Strings are taken verbatim, so `123` or `null` stay text. Text that
    /// does not parse as a bool or number is kept as a string and left
    /// for validation to reject.
    #[must_use]
    pub fn parse_text(self, text: &str) -> Value {
        let parsed = match self {
            Self::String => None,
            Self::Bool => text.parse::<bool>().ok().map(Value::Bool),
            Self::Number => text.parse::<serde_json::Number>().ok().map(Value::Number),
        };
        parsed.unwrap_or_else(|| Value::String(text.to_owned()))
    }

    /// Returns the type name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constant default value for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// String default.
    String(&'static str),
    /// Boolean default.
    Bool(bool),
    /// Numeric default.
    Number(f64),
}

impl Scalar {
    /// Converts the default to a JSON value.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::String(s) => Value::String(s.to_owned()),
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    /// Field name.
    pub name: &'static str,
    /// Field type.
    pub ty: FieldType,
    /// Whether a stored record must carry the field.
    pub required: bool,
    /// Value used on create when the input omits the field.
    pub default: Option<Scalar>,
}

impl FieldDef {
    /// A required field with no default.
    #[must_use]
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
        }
    }

    /// A required field filled from `default` on create when omitted.
    #[must_use]
    pub const fn defaulted(name: &'static str, ty: FieldType, default: Scalar) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: Some(default),
        }
    }
}

/// The field schema of one collection.
///
/// The `id` field is implicit: every record carries a string `id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schema {
    /// Collection name, used in error messages.
    pub collection: &'static str,
    /// Declared fields other than `id`.
    pub fields: &'static [FieldDef],
}

impl Schema {
    /// Looks up a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks a stored record.
    ///
    /// The value must be an object with a string `id` and every required
    /// field present and well-typed. Extra fields are tolerated on read.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate_record(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(obj) = value.as_object() else {
            return Err(self.error(vec![Violation::NotAnObject {
                found: json_type_name(value),
            }]));
        };

        let mut violations = Vec::new();
        match obj.get(ID_FIELD) {
            None | Some(Value::Null) => violations.push(Violation::MissingField {
                field: ID_FIELD.into(),
            }),
            Some(v) if !v.is_string() => violations.push(Violation::TypeMismatch {
                field: ID_FIELD.into(),
                expected: FieldType::String,
                found: json_type_name(v),
            }),
            Some(_) => {}
        }

        for def in self.fields {
            match obj.get(def.name) {
                None | Some(Value::Null) if def.required => {
                    violations.push(Violation::MissingField {
                        field: def.name.into(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(v) if !def.ty.matches(v) => violations.push(Violation::TypeMismatch {
                    field: def.name.into(),
                    expected: def.ty,
                    found: json_type_name(v),
                }),
                Some(_) => {}
            }
        }

        self.finish(violations)
    }

    /// Validates create input and returns the normalized field map.
    ///
    /// - `id` is ignored (the engine assigns it)
    /// - `null` counts as absent
    /// - absent fields with a default receive it
    /// - undeclared fields are rejected
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate_create(
        &self,
        input: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let mut violations = self.check_input(input);
        let mut out = Map::new();

        for def in self.fields {
            match input.get(def.name) {
                Some(v) if !v.is_null() => {
                    if def.ty.matches(v) {
                        out.insert(def.name.to_owned(), v.clone());
                    }
                }
                _ => match def.default {
                    Some(default) => {
                        out.insert(def.name.to_owned(), default.to_value());
                    }
                    None if def.required => violations.push(Violation::MissingField {
                        field: def.name.into(),
                    }),
                    None => {}
                },
            }
        }

        self.finish(violations).map(|()| out)
    }

    /// Validates partial update input and returns the fields to change.
    ///
    /// Only provided, non-null fields are returned. `id` is ignored so it
    /// can never be replaced.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate_patch(
        &self,
        input: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let violations = self.check_input(input);
        let out = input
            .iter()
            .filter(|(name, value)| {
                !value.is_null() && self.field(name).is_some_and(|def| def.ty.matches(value))
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        self.finish(violations).map(|()| out)
    }

    /// Unknown fields and type mismatches shared by create and patch.
    fn check_input(&self, input: &Map<String, Value>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (name, value) in input {
            if name == ID_FIELD {
                continue;
            }
            match self.field(name) {
                None => violations.push(Violation::UnknownField { field: name.clone() }),
                Some(def) if !value.is_null() && !def.ty.matches(value) => {
                    violations.push(Violation::TypeMismatch {
                        field: name.clone(),
                        expected: def.ty,
                        found: json_type_name(value),
                    });
                }
                Some(_) => {}
            }
        }
        violations
    }

    fn finish(&self, violations: Vec<Violation>) -> Result<(), ValidationError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.error(violations))
        }
    }

    /// Creates an error for this collection.
    #[must_use]
    pub fn error(&self, violations: Vec<Violation>) -> ValidationError {
        ValidationError::new(self.collection, violations)
    }
}

/// One reason a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// The value is not a JSON object.
    #[error("expected an object, found {found}")]
    NotAnObject {
        /// JSON type actually found.
        found: &'static str,
    },

    /// A required field is absent or null.
    #[error("missing field `{field}`")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A field has the wrong primitive type.
    #[error("field `{field}` must be {expected}, found {found}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Declared type.
        expected: FieldType,
        /// JSON type actually found.
        found: &'static str,
    },

    /// The input names a field the collection does not declare.
    #[error("unknown field `{field}`")]
    UnknownField {
        /// Field name.
        field: String,
    },

    /// A per-record payload carries an id that differs from its key.
    #[error("stored id `{found}` does not match key id `{expected}`")]
    IdMismatch {
        /// Id taken from the key.
        expected: String,
        /// Id found in the payload.
        found: String,
    },

    /// The bytes are not parseable JSON of the expected shape.
    #[error("malformed payload: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },
}

/// A record or input failed validation against its collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {collection} record: {}", join_violations(.violations))]
pub struct ValidationError {
    /// Collection the value was validated against.
    pub collection: String,
    /// Every violation found, in field order.
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(collection: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            collection: collection.into(),
            violations,
        }
    }

    /// Creates an error for an unparseable payload.
    pub fn malformed(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            collection,
            vec![Violation::Malformed {
                message: message.into(),
            }],
        )
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returns the JSON type name of a value.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TASKS: Schema = Schema {
        collection: "tasks",
        fields: &[
            FieldDef::required("title", FieldType::String),
            FieldDef::defaulted("done", FieldType::Bool, Scalar::Bool(false)),
            FieldDef {
                name: "weight",
                ty: FieldType::Number,
                required: false,
                default: None,
            },
        ],
    };

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn record_valid() {
        let v = json!({"id": "1", "title": "a", "done": true});
        assert!(TASKS.validate_record(&v).is_ok());
    }

    #[test]
    fn record_tolerates_extra_fields() {
        let v = json!({"id": "1", "title": "a", "done": false, "legacy": 3});
        assert!(TASKS.validate_record(&v).is_ok());
    }

    #[test]
    fn record_reports_every_violation() {
        let v = json!({"id": 7, "done": "yes"});
        let err = TASKS.validate_record(&v).unwrap_err();

        assert_eq!(err.collection, "tasks");
        assert_eq!(err.violations.len(), 3);
        assert!(err.violations.contains(&Violation::MissingField {
            field: "title".into()
        }));
        assert!(err.violations.contains(&Violation::TypeMismatch {
            field: "done".into(),
            expected: FieldType::Bool,
            found: "string",
        }));
    }

    #[test]
    fn record_not_an_object() {
        let err = TASKS.validate_record(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::NotAnObject { found: "array" }]
        );
    }

    #[test]
    fn record_null_required_field_is_missing() {
        let v = json!({"id": "1", "title": null, "done": false});
        let err = TASKS.validate_record(&v).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingField {
                field: "title".into()
            }]
        );
    }

    #[test]
    fn create_applies_defaults_and_drops_id() {
        let out = TASKS
            .validate_create(&map(json!({"id": "forged", "title": "write docs"})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"title": "write docs", "done": false}));
    }

    #[test]
    fn create_missing_required() {
        let err = TASKS.validate_create(&map(json!({"done": true}))).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingField {
                field: "title".into()
            }]
        );
    }

    #[test]
    fn create_rejects_unknown_and_mistyped() {
        let err = TASKS
            .validate_create(&map(json!({"title": 1, "color": "red"})))
            .unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert!(err.to_string().contains("unknown field `color`"));
        assert!(err.to_string().contains("field `title` must be string"));
    }

    #[test]
    fn create_optional_field_kept_when_present() {
        let out = TASKS
            .validate_create(&map(json!({"title": "t", "weight": 2.5})))
            .unwrap();
        assert_eq!(out.get("weight"), Some(&json!(2.5)));
    }

    #[test]
    fn patch_keeps_only_provided_fields() {
        let out = TASKS
            .validate_patch(&map(json!({"done": true, "title": null, "id": "x"})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"done": true}));
    }

    #[test]
    fn patch_empty_is_valid() {
        assert!(TASKS.validate_patch(&Map::new()).unwrap().is_empty());
    }

    #[test]
    fn patch_rejects_mistyped() {
        let err = TASKS.validate_patch(&map(json!({"done": 1}))).unwrap_err();
        assert!(matches!(
            err.violations[0],
            Violation::TypeMismatch { expected: FieldType::Bool, .. }
        ));
    }

    #[test]
    fn scalar_to_value() {
        assert_eq!(Scalar::Bool(true).to_value(), json!(true));
        assert_eq!(Scalar::String("x").to_value(), json!("x"));
        assert_eq!(Scalar::Number(1.5).to_value(), json!(1.5));
    }

    static READINGS: Schema = Schema {
        collection: "readings",
        fields: &[
            FieldDef::required("value", FieldType::Number),
            FieldDef::defaulted("unit", FieldType::String, Scalar::String("celsius")),
            FieldDef::defaulted("scale", FieldType::Number, Scalar::Number(1.0)),
        ],
    };

    #[test]
    fn numeric_schema_defaults_and_types() {
        let out = READINGS
            .validate_create(&map(json!({"value": 21.5})))
            .unwrap();
        assert_eq!(
            Value::Object(out.clone()),
            json!({"value": 21.5, "unit": "celsius", "scale": 1.0})
        );

        let mut record = out;
        record.insert("id".into(), json!("r1"));
        assert!(READINGS.validate_record(&Value::Object(record)).is_ok());

        let err = READINGS
            .validate_create(&map(json!({"value": "warm"})))
            .unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::TypeMismatch {
                field: "value".into(),
                expected: FieldType::Number,
                found: "string",
            }]
        );
    }

    #[test]
    fn parse_text_follows_field_type() {
        assert_eq!(FieldType::String.parse_text("123"), json!("123"));
        assert_eq!(FieldType::String.parse_text("null"), json!("null"));
        assert_eq!(FieldType::String.parse_text("true"), json!("true"));
        assert_eq!(FieldType::Bool.parse_text("true"), json!(true));
        assert_eq!(FieldType::Bool.parse_text("false"), json!(false));
        assert_eq!(FieldType::Bool.parse_text("yes"), json!("yes"));
        assert_eq!(FieldType::Number.parse_text("-2.5"), json!(-2.5));
        assert_eq!(FieldType::Number.parse_text("7"), json!(7));
        assert_eq!(FieldType::Number.parse_text("seven"), json!("seven"));
    }
}
