//! # Agent: emission API, flag gating and shutdown.
//!
//! The [`Agent`] owns an [`EventFlagSet`], a [`DispatchQueue`], a
//! [`ListenerRegistry`] and an optional shared [`Writer`]. Every emission method
//! checks the flag set, captures a [`TimeSource`], and enqueues up to two
//! independent tasks:
//!
//! ```text
//! agent.errorf("boom").await
//!     │
//!     ├─ is_enabled(ERROR)? ── no ──► return report
//!     │
//!     ├─ ts = TimeSource::now()
//!     ├─ write task    ─► writer.errorf_with_time_source(ts, "<label> boom")
//!     └─ trigger task  ─► registry.trigger(writer, ts, ERROR, Error{report})   (only if listeners exist)
//! ```
//!
//! ## Rules
//! - Emission never waits for rendering or listeners; it only suspends while
//!   the queue is full.
//! - Each kind is gated independently; severities do not cascade.
//! - An empty message produces no write task.
//! - Reported errors are always handed back to the caller unchanged.
//! - A failed enqueue (after close) is logged at `debug` and otherwise ignored.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::{AgentBuilder, AgentConfig};
use crate::dispatch::{DispatchQueue, QueueStats, Task};
use crate::error::DispatchError;
use crate::events::{ErrorReport, EventFlagSet, EventKind, EventPayload, RequestInfo, TimeSource};
use crate::listeners::{Listener, ListenerRegistry, ListenerStats};
use crate::writer::{Color, Writer};

/// Point-in-time counters of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentStats {
    pub queue: QueueStats,
    pub listeners: ListenerStats,
}

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

/// Process-embedded diagnostics dispatcher.
pub struct Agent {
    writer: Option<Arc<dyn Writer>>,
    events: EventFlagSet,
    queue: DispatchQueue,
    listeners: Arc<ListenerRegistry>,
    drain_poll: Duration,
}

impl Agent {
    /// Returns a builder for an agent with the given configuration.
    pub fn builder(cfg: AgentConfig) -> AgentBuilder {
        AgentBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        writer: Option<Arc<dyn Writer>>,
        events: EventFlagSet,
        queue: DispatchQueue,
        listeners: Arc<ListenerRegistry>,
        drain_poll: Duration,
    ) -> Self {
        Self {
            writer,
            events,
            queue,
            listeners,
            drain_poll,
        }
    }

    /// Shared writer used for rendering, if any.
    pub fn writer(&self) -> Option<&Arc<dyn Writer>> {
        self.writer.as_ref()
    }

    /// Underlying dispatch queue.
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// Enabled event kinds.
    pub fn events(&self) -> &EventFlagSet {
        &self.events
    }

    /// Listener registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Queue and listener counters.
    pub fn stats(&self) -> AgentStats {
        AgentStats {
            queue: self.queue.stats(),
            listeners: self.listeners.stats(),
        }
    }

    // ---- flags ----

    /// Replaces the enabled kinds with those of `events`.
    pub fn set_verbosity(&self, events: &EventFlagSet) {
        self.events.replace(events);
    }

    /// Enables emission of `kind`.
    pub fn enable_event(&self, kind: EventKind) {
        self.events.enable(kind);
    }

    /// Disables emission of `kind`; tasks already queued still run.
    pub fn disable_event(&self, kind: EventKind) {
        self.events.disable(kind);
    }

    /// True if `kind` is currently enabled.
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        self.events.is_enabled(kind)
    }

    // ---- listeners ----

    /// Appends a listener for `kind`.
    pub fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.listeners.add_listener(kind, listener);
    }

    /// Removes every listener for `kind`.
    pub fn remove_listeners(&self, kind: EventKind) {
        self.listeners.remove_listeners(kind);
    }

    /// True if at least one listener is registered for `kind`.
    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.listeners.has_listeners(kind)
    }

    // ---- emission ----

    /// Triggers the listeners of `kind` with `payload`.
    ///
    /// No-op unless `kind` is enabled and has at least one listener. This is
    /// the only emission path for request lifecycle and custom kinds.
    pub async fn on_event(&self, kind: EventKind, payload: EventPayload) {
        if self.is_enabled(kind) && self.has_listener(kind) {
            self.queue_trigger(TimeSource::now(), kind, payload).await;
        }
    }

    /// Writes an informational message.
    pub fn infof(&self, message: impl fmt::Display) -> impl Future<Output = ()> + Send + '_ {
        let message = message.to_string();
        self.emit_message(EventKind::INFO, Color::White, message)
    }

    /// Writes a debug message.
    pub fn debugf(&self, message: impl fmt::Display) -> impl Future<Output = ()> + Send + '_ {
        let message = message.to_string();
        self.emit_message(EventKind::DEBUG, Color::LightYellow, message)
    }

    /// Reports a warning built from `message` and returns it.
    pub fn warningf(
        &self,
        message: impl fmt::Display,
    ) -> impl Future<Output = ErrorReport> + Send + '_ {
        self.emit_report(EventKind::WARNING, ErrorReport::new(message.to_string()))
    }

    /// Reports an error built from `message` and returns it.
    pub fn errorf(
        &self,
        message: impl fmt::Display,
    ) -> impl Future<Output = ErrorReport> + Send + '_ {
        self.emit_report(EventKind::ERROR, ErrorReport::new(message.to_string()))
    }

    /// Reports a fatal error built from `message` and returns it.
    pub fn fatalf(
        &self,
        message: impl fmt::Display,
    ) -> impl Future<Output = ErrorReport> + Send + '_ {
        self.emit_report(EventKind::FATAL, ErrorReport::new(message.to_string()))
    }

    /// Reports the error of `result` as a warning and returns `result` unchanged.
    ///
    /// `Ok` values are passed through without emitting anything.
    pub async fn warning<T, E>(&self, result: Result<T, E>) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::WARNING, result, None).await
    }

    /// Reports the error of `result` and returns `result` unchanged.
    ///
    /// # Example
    /// ```rust,no_run
    /// # async fn demo(agent: &diagvisor::Agent) -> std::io::Result<()> {
    /// let bytes = agent.error(std::fs::read("config.toml")).await?;
    /// # let _ = bytes; Ok(())
    /// # }
    /// ```
    pub async fn error<T, E>(&self, result: Result<T, E>) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::ERROR, result, None).await
    }

    /// Reports the error of `result` as fatal and returns `result` unchanged.
    pub async fn fatal<T, E>(&self, result: Result<T, E>) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::FATAL, result, None).await
    }

    /// Like [`warning`](Self::warning); listeners also receive the request.
    pub async fn warning_with_req<T, E>(&self, result: Result<T, E>, req: &RequestInfo) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::WARNING, result, Some(req)).await
    }

    /// Like [`error`](Self::error); listeners also receive the request.
    pub async fn error_with_req<T, E>(&self, result: Result<T, E>, req: &RequestInfo) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::ERROR, result, Some(req)).await
    }

    /// Like [`fatal`](Self::fatal); listeners also receive the request.
    pub async fn fatal_with_req<T, E>(&self, result: Result<T, E>, req: &RequestInfo) -> Result<T, E>
    where
        E: std::error::Error,
    {
        self.report(EventKind::FATAL, result, Some(req)).await
    }

    // ---- shutdown ----

    /// Closes the dispatch queue.
    ///
    /// Tasks already buffered still run; the call returns once every worker
    /// has exited. Emission after close is dropped.
    pub async fn close(&self) -> Result<(), DispatchError> {
        self.queue.close().await
    }

    /// Disables every kind, waits for the backlog to be picked up, then closes.
    pub async fn drain(&self) -> Result<(), DispatchError> {
        self.events.set_none();
        while !self.queue.is_empty() {
            tokio::time::sleep(self.drain_poll).await;
        }
        self.close().await
    }

    // ---- internals ----

    async fn emit_message(&self, kind: EventKind, color: Color, message: String) {
        if !self.is_enabled(kind) {
            return;
        }
        let ts = TimeSource::now();
        let payload = self
            .has_listener(kind)
            .then(|| EventPayload::message(message.clone()));

        self.queue_write(ts, kind, color, Stream::Out, message).await;
        if let Some(payload) = payload {
            self.queue_trigger(ts, kind, payload).await;
        }
    }

    async fn emit_report(&self, kind: EventKind, report: ErrorReport) -> ErrorReport {
        self.emit_error(kind, &report, None).await;
        report
    }

    async fn report<T, E>(
        &self,
        kind: EventKind,
        result: Result<T, E>,
        req: Option<&RequestInfo>,
    ) -> Result<T, E>
    where
        E: std::error::Error,
    {
        if !self.is_enabled(kind) {
            return result;
        }
        let report = result.as_ref().err().map(|err| ErrorReport::from_error(err));
        if let Some(report) = report {
            self.emit_error(kind, &report, req).await;
        }
        result
    }

    async fn emit_error(&self, kind: EventKind, report: &ErrorReport, req: Option<&RequestInfo>) {
        if !self.is_enabled(kind) {
            return;
        }
        let ts = TimeSource::now();
        let payload = self.has_listener(kind).then(|| match req {
            Some(req) => EventPayload::error_with_request(report.clone(), req.clone()),
            None => EventPayload::error(report.clone()),
        });

        self.queue_write(ts, kind, Color::Red, Stream::Err, report.detailed())
            .await;
        if let Some(payload) = payload {
            self.queue_trigger(ts, kind, payload).await;
        }
    }

    async fn queue_write(
        &self,
        ts: TimeSource,
        kind: EventKind,
        color: Color,
        stream: Stream,
        message: String,
    ) {
        if message.is_empty() {
            return;
        }
        let Some(writer) = self.writer.clone() else {
            return;
        };

        let task = Task::from_fn("write", move || {
            let label = writer.colorize(kind.label(), color);
            match stream {
                Stream::Out => {
                    writer.printf_with_time_source(&ts, format_args!("{label} {message}"))?
                }
                Stream::Err => {
                    writer.errorf_with_time_source(&ts, format_args!("{label} {message}"))?
                }
            };
            Ok(())
        });
        self.submit(task).await;
    }

    async fn queue_trigger(&self, ts: TimeSource, kind: EventKind, payload: EventPayload) {
        let writer = self.writer.clone();
        let listeners = Arc::clone(&self.listeners);

        let task = Task::from_fn("trigger", move || {
            listeners.trigger(writer.as_deref(), ts, kind, &payload);
            Ok(())
        });
        self.submit(task).await;
    }

    async fn submit(&self, task: Task) {
        if let Err(err) = self.queue.enqueue(task).await {
            debug!(label = err.as_label(), error = %err, "diagnostic task dropped");
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("events", &self.events)
            .field("has_writer", &self.writer.is_some())
            .field("queue", &self.queue.stats())
            .field("listeners", &*self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::adapters::{error_listener, error_with_request_listener, message_listener};
    use http::{Method, Uri};
    use parking_lot::Mutex;
    use std::io;

    #[derive(Default)]
    struct Capture {
        out: Mutex<Vec<String>>,
        err: Mutex<Vec<String>>,
    }

    impl Writer for Capture {
        fn write(&self, bytes: &[u8]) -> io::Result<usize> {
            self.out.lock().push(String::from_utf8_lossy(bytes).into_owned());
            Ok(bytes.len())
        }

        fn colorize(&self, text: &str, _color: Color) -> String {
            text.to_string()
        }

        fn printf_with_time_source(&self, _ts: &TimeSource, args: fmt::Arguments<'_>) -> io::Result<usize> {
            let line = args.to_string();
            let n = line.len();
            self.out.lock().push(line);
            Ok(n)
        }

        fn errorf_with_time_source(&self, _ts: &TimeSource, args: fmt::Arguments<'_>) -> io::Result<usize> {
            let line = args.to_string();
            let n = line.len();
            self.err.lock().push(line);
            Ok(n)
        }
    }

    fn agent(verbosity: EventFlagSet) -> (Arc<Agent>, Arc<Capture>) {
        let capture = Arc::new(Capture::default());
        let cfg = AgentConfig {
            workers: 1,
            queue_capacity: 64,
            ..AgentConfig::default()
        };
        let agent = Agent::builder(cfg)
            .with_writer(capture.clone())
            .with_verbosity(verbosity)
            .build();
        (agent, capture)
    }

    #[tokio::test]
    async fn test_infof_renders_label_and_message() {
        let (agent, capture) = agent(EventFlagSet::all());
        agent.infof("hello").await;
        agent.debugf(format_args!("n = {}", 3)).await;
        agent.close().await.unwrap();

        assert_eq!(*capture.out.lock(), vec!["info hello", "debug n = 3"]);
        assert!(capture.err.lock().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_kind_and_empty_message_write_nothing() {
        let (agent, capture) = agent(EventFlagSet::from_kinds(&[EventKind::INFO]));
        agent.debugf("hidden").await;
        agent.infof("").await;
        agent.close().await.unwrap();

        assert!(capture.out.lock().is_empty());
        assert_eq!(agent.stats().queue.executed, 0);
    }

    #[tokio::test]
    async fn test_errorf_returns_report_and_renders_to_error_stream() {
        let (agent, capture) = agent(EventFlagSet::all());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        agent.add_listener(
            EventKind::ERROR,
            error_listener(move |_, _, err| s.lock().push(err.message().to_string())),
        );

        let report = agent.errorf("boom").await;
        assert_eq!(report.message(), "boom");
        agent.close().await.unwrap();

        assert_eq!(*capture.err.lock(), vec!["error boom"]);
        assert_eq!(*seen.lock(), vec!["boom".to_string()]);
    }

    #[tokio::test]
    async fn test_result_passthrough() {
        let (agent, capture) = agent(EventFlagSet::all());

        let ok: Result<u8, io::Error> = agent.error(Ok(7)).await;
        assert_eq!(ok.unwrap(), 7);

        let err = agent
            .fatal(Err::<(), _>(io::Error::other("disk gone")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
        agent.close().await.unwrap();

        assert_eq!(*capture.err.lock(), vec!["fatal disk gone"]);
    }

    #[tokio::test]
    async fn test_error_with_req_delivers_request() {
        let (agent, _capture) = agent(EventFlagSet::all());
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        agent.add_listener(
            EventKind::WARNING,
            error_with_request_listener(move |_, _, err, req| {
                *s.lock() = Some((err.message().to_string(), req.path().to_string()));
            }),
        );

        let req = RequestInfo::new(Method::POST, Uri::from_static("/upload"));
        let _ = agent
            .warning_with_req(Err::<(), _>(io::Error::other("too large")), &req)
            .await;
        agent.close().await.unwrap();

        assert_eq!(
            *seen.lock(),
            Some(("too large".to_string(), "/upload".to_string()))
        );
    }

    #[tokio::test]
    async fn test_on_event_requires_flag_and_listener() {
        let (agent, _capture) = agent(EventFlagSet::none());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        agent.add_listener(
            EventKind::INFO,
            message_listener(move |_, _, text| s.lock().push(text.to_string())),
        );

        agent.on_event(EventKind::INFO, EventPayload::message("gated")).await;
        agent.enable_event(EventKind::INFO);
        agent.on_event(EventKind::INFO, EventPayload::message("open")).await;
        agent.on_event(EventKind::DEBUG, EventPayload::message("no listener")).await;
        agent.close().await.unwrap();

        assert_eq!(*seen.lock(), vec!["open".to_string()]);
    }

    #[tokio::test]
    async fn test_drain_disables_and_closes() {
        let (agent, capture) = agent(EventFlagSet::all());
        for i in 0..10 {
            agent.infof(i).await;
        }
        agent.drain().await.unwrap();

        assert!(agent.events().is_none());
        assert!(agent.queue().is_closed());
        assert_eq!(agent.queue().len(), 0);
        assert_eq!(capture.out.lock().len(), 10);

        agent.enable_event(EventKind::INFO);
        agent.infof("after close").await;
        assert_eq!(capture.out.lock().len(), 10);
    }
}
