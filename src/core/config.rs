//! # Agent configuration.
//!
//! Provides [`AgentConfig`], the settings consumed by
//! [`AgentBuilder`](crate::AgentBuilder) when it builds an [`Agent`](crate::Agent).
//!
//! ## Sentinel values
//! - `workers = 0` → clamped to 1
//! - `queue_capacity = 0` → clamped to 1; above the channel limit → capped
//! - `drain_poll = 0s` → 1 ms

use std::time::Duration;

use crate::events::{EventFlagSet, EventKind};

/// Default number of dispatch workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Default dispatch queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 20;

/// Default polling interval used by [`Agent::drain`](crate::Agent::drain).
pub const DEFAULT_DRAIN_POLL: Duration = Duration::from_millis(1);

/// Configuration for one diagnostics agent.
///
/// ## Field semantics
/// - `workers`: number of dispatch workers (min 1)
/// - `queue_capacity`: tasks the queue buffers before `enqueue` suspends (min 1)
/// - `drain_poll`: sleep between backlog checks while draining (`0s` = 1 ms)
/// - `verbosity`: kinds enabled when the agent starts
///
/// ## Notes
/// All fields are public. Prefer the accessors below over checking sentinels
/// at call sites.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Number of long-lived dispatch workers.
    ///
    /// With `1` every task runs in FIFO order.
    pub workers: usize,

    /// Capacity of the bounded dispatch queue.
    ///
    /// Once this many tasks are pending, emission suspends the producer until
    /// a worker frees a slot.
    pub queue_capacity: usize,

    /// Interval between backlog checks in `drain`.
    pub drain_poll: Duration,

    /// Initially enabled event kinds.
    pub verbosity: EventFlagSet,
}

impl AgentConfig {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns the queue capacity clamped to `1..=Semaphore::MAX_PERMITS`.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.clamp(1, tokio::sync::Semaphore::MAX_PERMITS)
    }

    /// Returns the drain polling interval, `1ms` when unset.
    #[inline]
    pub fn drain_poll_interval(&self) -> Duration {
        if self.drain_poll == Duration::ZERO {
            DEFAULT_DRAIN_POLL
        } else {
            self.drain_poll
        }
    }

    /// Default verbosity: `fatal`, `error`, `request_complete` and `info`.
    pub fn default_verbosity() -> EventFlagSet {
        EventFlagSet::from_kinds(&[
            EventKind::FATAL,
            EventKind::ERROR,
            EventKind::REQUEST_COMPLETE,
            EventKind::INFO,
        ])
    }
}

impl Default for AgentConfig {
    /// Default configuration:
    ///
    /// - `workers = 4`
    /// - `queue_capacity = 1 << 20`
    /// - `drain_poll = 1ms`
    /// - `verbosity = fatal,error,request_complete,info`
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            drain_poll: DEFAULT_DRAIN_POLL,
            verbosity: Self::default_verbosity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.workers_clamped(), 4);
        assert_eq!(cfg.queue_capacity_clamped(), 1 << 20);
        assert_eq!(cfg.drain_poll_interval(), Duration::from_millis(1));

        assert!(cfg.verbosity.is_enabled(EventKind::FATAL));
        assert!(cfg.verbosity.is_enabled(EventKind::ERROR));
        assert!(cfg.verbosity.is_enabled(EventKind::REQUEST_COMPLETE));
        assert!(cfg.verbosity.is_enabled(EventKind::INFO));
        assert!(!cfg.verbosity.is_enabled(EventKind::DEBUG));
        assert!(!cfg.verbosity.is_enabled(EventKind::WARNING));
    }

    #[test]
    fn test_sentinels_are_clamped() {
        let cfg = AgentConfig {
            workers: 0,
            queue_capacity: 0,
            drain_poll: Duration::ZERO,
            verbosity: EventFlagSet::none(),
        };
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.drain_poll_interval(), DEFAULT_DRAIN_POLL);
    }

    #[test]
    fn test_oversized_capacity_is_capped() {
        let cfg = AgentConfig {
            queue_capacity: usize::MAX,
            ..AgentConfig::default()
        };
        assert_eq!(
            cfg.queue_capacity_clamped(),
            tokio::sync::Semaphore::MAX_PERMITS
        );
    }
}
