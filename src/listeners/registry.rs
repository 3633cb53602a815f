//! # Listener registry.
//!
//! Maps event kinds to copy-on-write listener slices. Readers clone the
//! `Arc<[Listener]>` under a read lock and iterate it without holding the lock,
//! so a concurrent add or remove replaces the slice instead of mutating it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::dispatch::task::panic_message;
use crate::events::{EventKind, EventPayload, TimeSource};
use crate::listeners::Listener;
use crate::writer::Writer;

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Listener calls skipped because the payload could not be decoded.
    pub dropped_decodes: u64,
    /// Listener calls that panicked.
    pub panicked_listeners: u64,
    /// Listener calls that completed.
    pub delivered: u64,
}

/// Ordered listeners per event kind.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<EventKind, Arc<[Listener]>>>,
    dropped_decodes: AtomicU64,
    panicked: AtomicU64,
    delivered: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `kind`.
    pub fn add_listener(&self, kind: EventKind, listener: Listener) {
        let mut map = self.listeners.write();
        let next: Arc<[Listener]> = match map.get(&kind) {
            Some(current) => current.iter().cloned().chain(Some(listener)).collect(),
            None => Arc::from(vec![listener]),
        };
        map.insert(kind, next);
    }

    /// Removes every listener for `kind`.
    pub fn remove_listeners(&self, kind: EventKind) {
        self.listeners.write().remove(&kind);
    }

    /// True if at least one listener is registered for `kind`.
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listeners
            .read()
            .get(&kind)
            .is_some_and(|l| !l.is_empty())
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, |l| l.len())
    }

    /// Stable snapshot of the listeners for `kind`.
    pub fn snapshot(&self, kind: EventKind) -> Option<Arc<[Listener]>> {
        self.listeners.read().get(&kind).cloned()
    }

    /// Invokes every listener of the current snapshot for `kind`, in order.
    ///
    /// Returns the number of listeners that completed. Decode failures and
    /// panics are counted and logged, never propagated.
    pub fn trigger(
        &self,
        writer: Option<&dyn Writer>,
        ts: TimeSource,
        kind: EventKind,
        payload: &EventPayload,
    ) -> usize {
        let Some(listeners) = self.snapshot(kind) else {
            return 0;
        };

        let mut delivered = 0;
        for (index, l) in listeners.iter().enumerate() {
            let call = std::panic::AssertUnwindSafe(|| l(writer, ts, kind, payload));
            match std::panic::catch_unwind(call) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => {
                    self.dropped_decodes.fetch_add(1, Ordering::Relaxed);
                    trace!(
                        %kind,
                        index,
                        label = err.as_label(),
                        error = %err,
                        "listener dropped undecodable payload"
                    );
                }
                Err(panic_err) => {
                    self.panicked.fetch_add(1, Ordering::Relaxed);
                    warn!(%kind, index, info = %panic_message(&*panic_err), "listener panicked");
                }
            }
        }
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Returns delivery counters.
    pub fn stats(&self) -> ListenerStats {
        ListenerStats {
            dropped_decodes: self.dropped_decodes.load(Ordering::Relaxed),
            panicked_listeners: self.panicked.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<(EventKind, usize)> = self
            .listeners
            .read()
            .iter()
            .map(|(k, l)| (*k, l.len()))
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("kinds", &kinds)
            .field("stats", &self.stats())
            .finish()
    }
}
