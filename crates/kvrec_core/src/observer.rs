//! Observer hooks.
//!
//! The engine reports what it does to a [`StoreObserver`] instead of
//! logging inline. Observers see every event but cannot change the
//! outcome of an operation.

use crate::record::ValidationError;
use std::sync::Arc;

/// Something the engine did or noticed.
#[derive(Debug, Clone, Copy)]
pub enum StoreEvent<'a> {
    /// A key was read and held a value.
    Read {
        /// Collection name.
        collection: &'a str,
        /// Store key.
        key: &'a str,
        /// Payload size.
        bytes: usize,
    },
    /// A key was read and was absent.
    Miss {
        /// Collection name.
        collection: &'a str,
        /// Store key.
        key: &'a str,
    },
    /// A key was written.
    Write {
        /// Collection name.
        collection: &'a str,
        /// Store key.
        key: &'a str,
        /// Payload size.
        bytes: usize,
    },
    /// A key was deleted.
    Delete {
        /// Collection name.
        collection: &'a str,
        /// Store key.
        key: &'a str,
    },
    /// A key prefix was enumerated.
    Scan {
        /// Collection name.
        collection: &'a str,
        /// Prefix listed.
        prefix: &'a str,
        /// Number of keys returned.
        keys: usize,
    },
    /// A stored record failed validation and was treated as absent.
    Skipped {
        /// Collection name.
        collection: &'a str,
        /// Store key holding the record.
        key: &'a str,
        /// Why it was rejected.
        reason: &'a ValidationError,
    },
    /// A blob-list key held something other than a JSON array.
    MalformedBlob {
        /// Collection name.
        collection: &'a str,
        /// Store key.
        key: &'a str,
        /// Parser message.
        reason: &'a str,
    },
}

/// Receives engine events.
pub trait StoreObserver: Send + Sync {
    /// Called once per event, synchronously, on the calling thread.
    fn on_event(&self, event: &StoreEvent<'_>);
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn on_event(&self, _event: &StoreEvent<'_>) {}
}

/// Emits every event as a `tracing` event.
///
/// Skipped records and malformed blobs are logged at `warn`, everything
/// else at `debug` or `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_event(&self, event: &StoreEvent<'_>) {
        match *event {
            StoreEvent::Read {
                collection,
                key,
                bytes,
            } => tracing::trace!(collection, key, bytes, "read"),
            StoreEvent::Miss { collection, key } => tracing::trace!(collection, key, "miss"),
            StoreEvent::Write {
                collection,
                key,
                bytes,
            } => tracing::debug!(collection, key, bytes, "write"),
            StoreEvent::Delete { collection, key } => tracing::debug!(collection, key, "delete"),
            StoreEvent::Scan {
                collection,
                prefix,
                keys,
            } => tracing::trace!(collection, prefix, keys, "scan"),
            StoreEvent::Skipped {
                collection,
                key,
                reason,
            } => tracing::warn!(collection, key, %reason, "skipping invalid stored record"),
            StoreEvent::MalformedBlob {
                collection,
                key,
                reason,
            } => tracing::warn!(
                collection,
                key,
                reason,
                "unreadable collection blob, reading as empty"
            ),
        }
    }
}

/// Fans events out to several observers in order.
#[derive(Clone, Default)]
pub struct Observers {
    inner: Vec<Arc<dyn StoreObserver>>,
}

impl Observers {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer.
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.inner.push(observer);
        self
    }

    /// Returns the number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl StoreObserver for Observers {
    fn on_event(&self, event: &StoreEvent<'_>) {
        for observer in &self.inner {
            observer.on_event(event);
        }
    }
}
