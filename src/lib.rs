//! # diagvisor
//!
//! **Diagvisor** is a process-embedded diagnostics dispatcher for async Rust
//! services.
//!
//! Application code emits diagnostic events (info, debug, warnings, errors,
//! fatal errors, request lifecycle, custom kinds). The agent decides whether an
//! event is enabled, renders it through a pluggable [`Writer`], and invokes the
//! listeners registered for its kind, all without blocking the caller on I/O or
//! on listener execution time.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   handler A            handler B            background job
//!       │ infof(..)          │ error(result)        │ on_event(kind, payload)
//!       ▼                    ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Agent                                                            │
//! │  - EventFlagSet      (atomic bitmask; disabled → no work at all)  │
//! │  - ListenerRegistry  (kind → ordered listeners)                   │
//! │  - Writer            (shared renderer, optional)                  │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ enqueue(write task / trigger task)
//!                                ▼      (suspends while full)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │           DispatchQueue (bounded, capacity AgentConfig::queue_capacity)
//! └───────────┬───────────────────────┬───────────────────────┬───────┘
//!             ▼                       ▼                       ▼
//!         worker 0                worker 1      ...       worker N-1
//!             │                       │                       │
//!   writer.printf/errorf     registry.trigger(..)       (panics and errors
//!   _with_time_source(..)      └─► adapters decode       are logged, never
//!                                  EventPayload          stop a worker)
//! ```
//!
//! ### Shutdown
//! ```text
//! agent.close()  ─► stop intake ─► workers finish buffered tasks ─► joined
//! agent.drain()  ─► flags = none ─► poll len() == 0 ─► close()
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                                     |
//! |-----------------|----------------------------------------------------------|-----------------------------------------------|
//! | **Emission**    | Gated, non-blocking emission API.                        | [`Agent`], [`AgentBuilder`]                   |
//! | **Flags**       | Enable/disable kinds at runtime.                         | [`EventFlagSet`], [`EventKind`]               |
//! | **Dispatch**    | Bounded queue drained by a fixed worker pool.            | [`DispatchQueue`], [`Task`]                   |
//! | **Listeners**   | Typed callbacks per event kind.                          | [`ListenerRegistry`], [`adapters`]            |
//! | **Rendering**   | Output capability and request line helpers.              | [`Writer`], [`helpers`]                       |
//! | **Errors**      | Typed errors with stable labels.                         | [`DispatchError`], [`TaskError`], [`DecodeError`] |
//! | **Configuration** | Worker count, queue capacity, default verbosity.       | [`AgentConfig`]                               |
//!
//! ## Optional features
//! - `logging` _(default)_: exports [`LogWriter`], a stdout/stderr writer with
//!   colors and timestamps, used when no writer is configured.
//!
//! ## Example
//! ```rust
//! use diagvisor::{Agent, AgentConfig, EventKind, adapters};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = Agent::builder(AgentConfig::default())
//!         .without_writer()
//!         .with_listener(
//!             EventKind::ERROR,
//!             adapters::error_listener(|_writer, _ts, err| {
//!                 eprintln!("alert: {}", err.message());
//!             }),
//!         )
//!         .build();
//!
//!     agent.infof("service starting").await;
//!     let report = agent.errorf("upstream unavailable").await;
//!     assert_eq!(report.message(), "upstream unavailable");
//!
//!     agent.drain().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod dispatch;
mod error;
mod events;
mod listeners;
mod writer;

// ---- Public re-exports ----

pub use crate::core::{Agent, AgentBuilder, AgentConfig, AgentStats, global};
pub use crate::core::{DEFAULT_DRAIN_POLL, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use dispatch::{BoxTaskFuture, DispatchQueue, QueueStats, Task};
pub use error::{DecodeError, DispatchError, ParseFlagsError, TaskError};
pub use events::{
    ErrorReport, EventFlagSet, EventKind, EventPayload, Field, RequestComplete, RequestInfo,
    TimeSource,
};
pub use listeners::{Listener, ListenerRegistry, ListenerStats, adapters, listener};
pub use writer::{BufferPool, Color, Writer, helpers};

// Built-in stdout/stderr writer.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use writer::LogWriter;
