//! Collection and adapter configuration.

use crate::error::{CoreError, CoreResult};
use crate::id::IdStrategy;
use crate::keys::SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage layout of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// The whole collection is one JSON array under one key.
    Blob,
    /// Each record is stored under its own `<namespace>:<id>` key.
    PerRecord,
}

/// Configuration of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Storage layout, fixed for the lifetime of the handle.
    pub layout: Layout,

    /// Key namespace. Defaults to the collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// How ids are generated on create.
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl CollectionConfig {
    /// A blob-list collection.
    #[must_use]
    pub const fn blob() -> Self {
        Self {
            layout: Layout::Blob,
            namespace: None,
            id_strategy: IdStrategy::RandomBase36,
        }
    }

    /// A per-record collection.
    #[must_use]
    pub const fn per_record() -> Self {
        Self {
            layout: Layout::PerRecord,
            namespace: None,
            id_strategy: IdStrategy::RandomBase36,
        }
    }

    /// Sets the key namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the id strategy.
    #[must_use]
    pub const fn id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Returns the namespace, falling back to `collection`.
    #[must_use]
    pub fn namespace_or<'a>(&'a self, collection: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(collection)
    }
}

/// How the request adapter surfaces a missing record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Return a null record.
    #[default]
    Null,
    /// Return a not found error.
    Error,
}

/// Request adapter configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// Surfacing of a `get` for an unknown id.
    pub get_not_found: NotFoundPolicy,
    /// Surfacing of an `update` for an unknown id.
    pub update_not_found: NotFoundPolicy,
}

/// Configuration for opening a [`crate::Database`].
///
/// Can be built in code or loaded from JSON:
///
/// ```json
/// {
///   "items": { "layout": "blob" },
///   "todos": { "layout": "blob", "id_strategy": "timestamp_millis" },
///   "users": { "layout": "per_record", "namespace": "user" },
///   "adapter": { "update_not_found": "error" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The `items` collection.
    pub items: CollectionConfig,
    /// The `todos` collection.
    pub todos: CollectionConfig,
    /// The `users` collection.
    pub users: CollectionConfig,
    /// Request adapter behavior.
    pub adapter: AdapterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items: CollectionConfig::blob(),
            todos: CollectionConfig::blob(),
            users: CollectionConfig::per_record(),
            adapter: AdapterConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `items` collection configuration.
    #[must_use]
    pub fn items(mut self, config: CollectionConfig) -> Self {
        self.items = config;
        self
    }

    /// Sets the `todos` collection configuration.
    #[must_use]
    pub fn todos(mut self, config: CollectionConfig) -> Self {
        self.todos = config;
        self
    }

    /// Sets the `users` collection configuration.
    #[must_use]
    pub fn users(mut self, config: CollectionConfig) -> Self {
        self.users = config;
        self
    }

    /// Sets the adapter configuration.
    #[must_use]
    pub const fn adapter(mut self, config: AdapterConfig) -> Self {
        self.adapter = config;
        self
    }

    /// Uses `layout` for every collection.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.items.layout = layout;
        self.todos.layout = layout;
        self.users.layout = layout;
        self
    }

    /// Parses a JSON configuration and validates it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the JSON is malformed or invalid.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CoreError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file and validates it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the file cannot be read or is invalid.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Returns `(collection, config)` for every collection.
    pub fn collections(&self) -> [(&'static str, &CollectionConfig); 3] {
        [
            ("items", &self.items),
            ("todos", &self.todos),
            ("users", &self.users),
        ]
    }

    /// Checks that namespaces are usable and do not collide.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` describing the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        let collections = self.collections();
        for (name, config) in &collections {
            let namespace = config.namespace_or(name);
            if namespace.is_empty() {
                return Err(CoreError::config(format!("{name}: empty namespace")));
            }
            if namespace.contains(SEPARATOR) {
                return Err(CoreError::config(format!(
                    "{name}: namespace {namespace:?} contains '{SEPARATOR}'"
                )));
            }
        }

        for (i, (a, ca)) in collections.iter().enumerate() {
            for (b, cb) in &collections[i + 1..] {
                if ca.namespace_or(a) == cb.namespace_or(b) {
                    return Err(CoreError::config(format!(
                        "{a} and {b} share namespace {:?}",
                        ca.namespace_or(a)
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.items.layout, Layout::Blob);
        assert_eq!(config.todos.layout, Layout::Blob);
        assert_eq!(config.users.layout, Layout::PerRecord);
        assert_eq!(config.adapter.update_not_found, NotFoundPolicy::Null);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .users(CollectionConfig::per_record().namespace("user"))
            .todos(CollectionConfig::blob().id_strategy(IdStrategy::TimestampMillis))
            .adapter(AdapterConfig {
                update_not_found: NotFoundPolicy::Error,
                ..AdapterConfig::default()
            });

        assert_eq!(config.users.namespace_or("users"), "user");
        assert_eq!(config.todos.id_strategy, IdStrategy::TimestampMillis);
        assert_eq!(config.adapter.update_not_found, NotFoundPolicy::Error);
    }

    #[test]
    fn with_layout_applies_everywhere() {
        let config = Config::new().with_layout(Layout::PerRecord);
        assert!(config
            .collections()
            .iter()
            .all(|(_, c)| c.layout == Layout::PerRecord));
    }

    #[test]
    fn from_json_partial() {
        let config = Config::from_json_str(
            r#"{"users": {"layout": "blob", "namespace": "people"},
                "adapter": {"get_not_found": "error"}}"#,
        )
        .unwrap();

        assert_eq!(config.users.layout, Layout::Blob);
        assert_eq!(config.users.namespace.as_deref(), Some("people"));
        assert_eq!(config.items, CollectionConfig::blob());
        assert_eq!(config.adapter.get_not_found, NotFoundPolicy::Error);
        assert_eq!(config.adapter.update_not_found, NotFoundPolicy::Null);
    }

    #[test]
    fn from_json_requires_layout() {
        let err = Config::from_json_str(r#"{"items": {"namespace": "x"}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn from_json_rejects_unknown_keys() {
        assert!(Config::from_json_str(r#"{"widgets": {}}"#).is_err());
    }

    #[test]
    fn validate_rejects_separator_in_namespace() {
        let config = Config::new().items(CollectionConfig::blob().namespace("a:b"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_shared_namespace() {
        let config = Config::new().todos(CollectionConfig::blob().namespace("items"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("share namespace"));
    }

    #[test]
    fn from_json_file_missing() {
        let err = Config::from_json_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn json_roundtrip() {
        let config = Config::new().users(CollectionConfig::per_record().namespace("user"));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json_str(&json).unwrap(), config);
    }
}
