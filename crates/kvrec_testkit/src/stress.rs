//! Concurrency helpers.
//!
//! The engine takes no locks, so concurrent read-modify-write cycles on
//! one blob can overwrite each other. These helpers drive concurrent
//! creates and count how many records actually survived.

use kvrec_core::{Database, ItemFields};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a concurrent create run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Creates that returned successfully.
    pub acknowledged: usize,
    /// Creates that returned an error.
    pub failed: usize,
    /// Records present afterwards.
    pub persisted: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Acknowledged creates whose record is gone.
    pub fn lost(&self) -> usize {
        self.acknowledged.saturating_sub(self.persisted)
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Acknowledged: {}", self.acknowledged);
        println!("Failed: {}", self.failed);
        println!("Persisted: {}", self.persisted);
        println!("Lost: {}", self.lost());
        println!("Duration: {:?}", self.duration);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Creates per thread.
    pub creates_per_thread: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            creates_per_thread: 50,
        }
    }
}

/// Creates items from several threads at once against an empty `items`
/// collection, then counts what was persisted.
///
/// # Panics
///
/// Panics if a worker thread panics or the final list fails.
pub fn concurrent_creates(db: &Arc<Database>, config: &StressConfig) -> StressTestResult {
    let acknowledged = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(config.threads));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = Arc::clone(db);
            let acknowledged = Arc::clone(&acknowledged);
            let failed = Arc::clone(&failed);
            let barrier = Arc::clone(&barrier);
            let creates = config.creates_per_thread;

            thread::spawn(move || {
                barrier.wait();
                for i in 0..creates {
                    let fields = ItemFields {
                        text: format!("t{t}-{i}"),
                    };
                    match db.items().create(fields) {
                        Ok(_) => acknowledged.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Worker thread panicked");
    }

    let persisted = db.items().list().expect("Failed to list items").len();
    StressTestResult {
        acknowledged: acknowledged.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        persisted,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDatabase;
    use kvrec_core::Layout;

    fn run(layout: Layout) -> StressTestResult {
        let db = Arc::new(TestDatabase::memory(layout).db);
        concurrent_creates(
            &db,
            &StressConfig {
                threads: 4,
                creates_per_thread: 25,
            },
        )
    }

    #[test]
    fn test_per_record_creates_never_conflict() {
        let result = run(Layout::PerRecord);
        assert_eq!(result.acknowledged, 100);
        assert_eq!(result.failed, 0);
        assert_eq!(result.persisted, 100);
        assert_eq!(result.lost(), 0);
    }

    #[test]
    fn test_blob_creates_may_lose_updates() {
        let result = run(Layout::Blob);
        assert_eq!(result.acknowledged, 100);
        assert!(result.persisted >= 1);
        assert!(result.persisted <= 100);
        assert_eq!(result.persisted + result.lost(), 100);
    }
}
