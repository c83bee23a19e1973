//! Store statistics.
//!
//! Counts what the engine does to the store. [`StoreStats`] is a
//! [`StoreObserver`], so it is fed by the same events as logging.
//!
//! # Usage
//!
//! ```rust
//! use kvrec_core::{Config, Database, ItemFields};
//! use kvrec_storage::InMemoryKv;
//! use std::sync::Arc;
//!
//! let db = Database::open(Arc::new(InMemoryKv::new()), &Config::default()).unwrap();
//! db.items().create(ItemFields { text: "x".into() }).unwrap();
//!
//! let stats = db.stats().snapshot();
//! assert_eq!(stats.writes, 1);
//! ```

use crate::observer::{StoreEvent, StoreObserver};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// All counters are atomic and monotonically increasing. They can be read
/// while operations are in progress.
#[derive(Debug, Default)]
pub struct StoreStats {
    // Key operations
    /// Reads that found a value.
    reads: AtomicU64,
    /// Reads of absent keys.
    misses: AtomicU64,
    /// Writes.
    writes: AtomicU64,
    /// Deletes.
    deletes: AtomicU64,
    /// Prefix scans.
    scans: AtomicU64,

    // Bytes
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,

    // Data quality
    /// Stored records skipped because they failed validation.
    skipped_records: AtomicU64,
    /// Blob keys that did not hold a JSON array.
    malformed_blobs: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of reads that found a value.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of reads of absent keys.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns the number of writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of deletes.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of prefix scans.
    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    /// Returns the total bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the total bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the number of stored records skipped as invalid.
    ///
    /// A non-zero value means the store holds data this schema cannot read.
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records.load(Ordering::Relaxed)
    }

    /// Returns the number of unreadable collection blobs seen.
    pub fn malformed_blobs(&self) -> u64 {
        self.malformed_blobs.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            misses: self.misses(),
            writes: self.writes(),
            deletes: self.deletes(),
            scans: self.scans(),
            bytes_read: self.bytes_read(),
            bytes_written: self.bytes_written(),
            skipped_records: self.skipped_records(),
            malformed_blobs: self.malformed_blobs(),
        }
    }
}

impl StoreObserver for StoreStats {
    fn on_event(&self, event: &StoreEvent<'_>) {
        match *event {
            StoreEvent::Read { bytes, .. } => {
                self.reads.fetch_add(1, Ordering::Relaxed);
                self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
            }
            StoreEvent::Miss { .. } => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
            StoreEvent::Write { bytes, .. } => {
                self.writes.fetch_add(1, Ordering::Relaxed);
                self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
            }
            StoreEvent::Delete { .. } => {
                self.deletes.fetch_add(1, Ordering::Relaxed);
            }
            StoreEvent::Scan { .. } => {
                self.scans.fetch_add(1, Ordering::Relaxed);
            }
            StoreEvent::Skipped { .. } => {
                self.skipped_records.fetch_add(1, Ordering::Relaxed);
            }
            StoreEvent::MalformedBlob { .. } => {
                self.malformed_blobs.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// A point-in-time snapshot of store statistics.
///
/// Unlike `StoreStats`, this is a plain struct that can be serialized,
/// compared, or passed across threads without atomics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Reads that found a value.
    pub reads: u64,
    /// Reads of absent keys.
    pub misses: u64,
    /// Writes.
    pub writes: u64,
    /// Deletes.
    pub deletes: u64,
    /// Prefix scans.
    pub scans: u64,
    /// Total bytes read.
    pub bytes_read: u64,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Stored records skipped as invalid.
    pub skipped_records: u64,
    /// Unreadable collection blobs seen.
    pub malformed_blobs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValidationError;

    #[test]
    fn default_stats_are_zero() {
        let stats = StoreStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn counts_key_operations() {
        let stats = StoreStats::new();

        stats.on_event(&StoreEvent::Read {
            collection: "items",
            key: "items",
            bytes: 100,
        });
        stats.on_event(&StoreEvent::Read {
            collection: "items",
            key: "items",
            bytes: 50,
        });
        stats.on_event(&StoreEvent::Miss {
            collection: "users",
            key: "users:9",
        });
        stats.on_event(&StoreEvent::Write {
            collection: "items",
            key: "items",
            bytes: 200,
        });

        assert_eq!(stats.reads(), 2);
        assert_eq!(stats.bytes_read(), 150);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.writes(), 1);
        assert_eq!(stats.bytes_written(), 200);
    }

    #[test]
    fn counts_data_quality_events() {
        let stats = StoreStats::new();
        let reason = ValidationError::malformed("todos", "eof");

        stats.on_event(&StoreEvent::Skipped {
            collection: "todos",
            key: "todos",
            reason: &reason,
        });
        stats.on_event(&StoreEvent::MalformedBlob {
            collection: "todos",
            key: "todos",
            reason: "not an array",
        });

        let snap = stats.snapshot();
        assert_eq!(snap.skipped_records, 1);
        assert_eq!(snap.malformed_blobs, 1);
    }

    #[test]
    fn concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(StoreStats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let s = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    s.on_event(&StoreEvent::Write {
                        collection: "items",
                        key: "items",
                        bytes: 1,
                    });
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(stats.writes(), 1000);
        assert_eq!(stats.bytes_written(), 1000);
    }
}
