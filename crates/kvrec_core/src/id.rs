//! Record id generation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// How new record ids are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Milliseconds since the Unix epoch, as a decimal string.
    TimestampMillis,
    /// A random 64-bit value rendered in base 36.
    #[default]
    RandomBase36,
    /// A random (v4) UUID in hyphenated form.
    Uuid,
}

/// Generates record ids for one collection.
///
/// Ids are never reused by the same generator:
/// - `TimestampMillis` remembers the last value it issued and moves one
///   past it when the clock has not advanced (or went backwards)
/// - `RandomBase36` and `Uuid` rely on randomness
///
/// Uniqueness across processes writing the same collection is
/// probabilistic for the random strategies and not guaranteed for
/// timestamps.
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    last_millis: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            last_millis: AtomicU64::new(0),
        }
    }

    /// Returns the strategy.
    #[must_use]
    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Generates a new id.
    #[must_use]
    pub fn generate(&self) -> String {
        match self.strategy {
            IdStrategy::TimestampMillis => self.next_millis().to_string(),
            IdStrategy::RandomBase36 => to_base36(rand::thread_rng().gen()),
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }

    fn next_millis(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_owned();
    }
    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn timestamp_ids_strictly_increase() {
        let ids = IdGenerator::new(IdStrategy::TimestampMillis);
        let mut prev: u64 = 0;
        for _ in 0..1000 {
            let id: u64 = ids.generate().parse().unwrap();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn random_ids_are_base36_and_distinct() {
        let ids = IdGenerator::new(IdStrategy::RandomBase36);
        let set: HashSet<String> = (0..1000).map(|_| ids.generate()).collect();
        assert_eq!(set.len(), 1000);
        assert!(set
            .iter()
            .all(|id| id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())));
    }

    #[test]
    fn uuid_ids_parse() {
        let id = IdGenerator::new(IdStrategy::Uuid).generate();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn default_strategy_is_random() {
        assert_eq!(IdGenerator::default().strategy(), IdStrategy::RandomBase36);
    }

    #[test]
    fn strategy_serde_names() {
        assert_eq!(
            serde_json::to_string(&IdStrategy::TimestampMillis).unwrap(),
            "\"timestamp_millis\""
        );
        let s: IdStrategy = serde_json::from_str("\"uuid\"").unwrap();
        assert_eq!(s, IdStrategy::Uuid);
    }
}
