//! Key scheme.
//!
//! Maps collections and record ids onto the store's flat key space:
//!
//! ```text
//! blob-list layout:   <namespace>            e.g. "todos"
//! per-record layout:  <namespace>:<id>       e.g. "user:k3j9x0"
//! scan prefix:        <namespace>:
//! ```

/// Separator between namespace and id in per-record keys.
pub const SEPARATOR: char = ':';

/// Returns the single key holding a blob-list collection.
#[must_use]
pub fn blob_key(collection: &str) -> String {
    collection.to_owned()
}

/// Returns the key of one record in the per-record layout.
#[must_use]
pub fn record_key(collection: &str, id: &str) -> String {
    format!("{collection}{SEPARATOR}{id}")
}

/// Returns the prefix enumerating a per-record collection.
#[must_use]
pub fn scan_prefix(collection: &str) -> String {
    format!("{collection}{SEPARATOR}")
}

/// Key scheme bound to one collection namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScheme {
    namespace: String,
    prefix: String,
}

impl KeyScheme {
    /// Creates a key scheme for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let prefix = scan_prefix(&namespace);
        Self { namespace, prefix }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the blob-list key.
    #[must_use]
    pub fn blob_key(&self) -> &str {
        &self.namespace
    }

    /// Returns the per-record key for `id`.
    #[must_use]
    pub fn record_key(&self, id: &str) -> String {
        record_key(&self.namespace, id)
    }

    /// Returns the per-record scan prefix.
    #[must_use]
    pub fn scan_prefix(&self) -> &str {
        &self.prefix
    }

    /// Extracts the id from a per-record key.
    ///
    /// Returns `None` if the key is outside this namespace or has an
    /// empty id.
    #[must_use]
    pub fn id_from_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.prefix.as_str())
            .filter(|id| !id.is_empty())
    }
}
