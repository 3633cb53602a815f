//! # Logical timestamps.
//!
//! A [`TimeSource`] is captured when a task is **enqueued**, not when a worker
//! runs it. It pairs a wall-clock instant with a global sequence number, so
//! events rendered out of order by different workers can still be sorted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Global sequence counter for timestamp ordering.
static TIME_SEQ: AtomicU64 = AtomicU64::new(0);

/// Enqueue-time timestamp of an event.
///
/// Ordered by `seq`, then by `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSource {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
}

impl TimeSource {
    /// Captures the current instant with the next sequence number.
    pub fn now() -> Self {
        Self {
            seq: TIME_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
        }
    }

    /// Builds a timestamp at a fixed instant (tests, replays).
    pub fn at(at: SystemTime) -> Self {
        Self {
            seq: TIME_SEQ.fetch_add(1, Ordering::Relaxed),
            at,
        }
    }
}

impl PartialOrd for TimeSource {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeSource {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.seq
            .cmp(&other.seq)
            .then_with(|| self.at.cmp(&other.at))
    }
}
