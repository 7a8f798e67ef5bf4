//! Time and identity sources injected into the processing sessions.
//!
//! Sessions never read the wall clock or invent ids on their own, so tests
//! can step time and predict ids exactly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    /// Monotonic time since the clock was created
    fn elapsed(&self) -> Duration;
    /// Wall-clock time for history timestamps
    fn timestamp(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// Real time.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    wall_origin: DateTime<Utc>,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new(wall_origin: DateTime<Utc>) -> Self {
        Self {
            wall_origin,
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }

    fn timestamp(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}

/// Source of unique item ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub type SharedIds = Arc<dyn IdGenerator>;

/// `<prefix>-1`, `<prefix>-2`, ...
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Random v4 UUIDs.
#[derive(Default)]
pub struct UuidIds;

impl UuidIds {
    pub fn shared() -> SharedIds {
        Arc::new(Self)
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let origin = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let clock = ManualClock::new(origin);
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
        assert_eq!(clock.timestamp().to_rfc3339(), "2024-01-01T00:00:01.500+00:00");
    }

    #[test]
    fn sequential_ids_never_repeat() {
        let ids = SequentialIds::new("img");
        assert_eq!(ids.next_id(), "img-1");
        assert_eq!(ids.next_id(), "img-2");
    }

    #[test]
    fn uuid_ids_are_unique_under_rapid_creation() {
        let ids = UuidIds;
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }
}
