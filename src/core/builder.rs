use std::sync::Arc;

use crate::{
    core::{Agent, AgentConfig},
    dispatch::DispatchQueue,
    events::{EventFlagSet, EventKind},
    listeners::{Listener, ListenerRegistry},
    writer::Writer,
};

/// Builder for constructing an [`Agent`].
///
/// Without an explicit writer the agent renders through a
/// [`LogWriter`](crate::LogWriter) on stdout/stderr when the `logging` feature
/// is enabled, and renders nothing otherwise.
pub struct AgentBuilder {
    cfg: AgentConfig,
    writer: Option<Arc<dyn Writer>>,
    listeners: Vec<(EventKind, Listener)>,
}

impl AgentBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: AgentConfig) -> Self {
        Self {
            cfg,
            writer: default_writer(),
            listeners: Vec::new(),
        }
    }

    /// Sets the writer used for rendering.
    ///
    /// The writer is shared: the caller keeps ownership of its lifetime.
    pub fn with_writer(mut self, writer: Arc<dyn Writer>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Disables rendering; listeners still receive events (with no writer).
    pub fn without_writer(mut self) -> Self {
        self.writer = None;
        self
    }

    /// Overrides the initially enabled kinds.
    pub fn with_verbosity(mut self, verbosity: EventFlagSet) -> Self {
        self.cfg.verbosity = verbosity;
        self
    }

    /// Registers a listener before the agent starts.
    pub fn with_listener(mut self, kind: EventKind, listener: Listener) -> Self {
        self.listeners.push((kind, listener));
        self
    }

    /// Builds the agent and spawns its dispatch workers.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn build(self) -> Arc<Agent> {
        let queue = DispatchQueue::new(
            self.cfg.workers_clamped(),
            self.cfg.queue_capacity_clamped(),
        );

        let registry = Arc::new(ListenerRegistry::new());
        for (kind, listener) in self.listeners {
            registry.add_listener(kind, listener);
        }

        let drain_poll_interval = self.cfg.drain_poll_interval();
        Arc::new(Agent::new_internal(
            self.writer,
            self.cfg.verbosity,
            queue,
            registry,
            drain_poll_interval,
        ))
    }
}

#[cfg(feature = "logging")]
fn default_writer() -> Option<Arc<dyn Writer>> {
    Some(Arc::new(crate::writer::LogWriter::new()))
}

#[cfg(not(feature = "logging"))]
fn default_writer() -> Option<Arc<dyn Writer>> {
    None
}
