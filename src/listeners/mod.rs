//! # Listener registry and typed adapters.
//!
//! A [`Listener`] is a generic callback `(writer, ts, kind, &payload)`. The
//! [`ListenerRegistry`] maps each [`EventKind`](crate::EventKind) to an ordered
//! list of them; the adapters in [`adapters`] turn strongly-typed callbacks into
//! that generic shape.
//!
//! ## Architecture
//! ```text
//! trigger task (on a dispatch worker)
//!     │
//!     └──► registry.trigger(writer, ts, kind, &payload)
//!             │  snapshot = Arc<[Listener]> read under the lock
//!             ├──► listener 1 ──► decode payload ──► typed callback
//!             │                    └─ DecodeError → dropped, counted
//!             ├──► listener 2 ──► panic → caught, counted
//!             └──► listener N
//! ```
//!
//! ## Rules
//! - Listeners run in registration order as of the snapshot.
//! - Registrations after the snapshot are not observed by that trigger.
//! - `remove_listeners` never affects a snapshot already taken.
//! - Decode failures and panics never reach the producer.

pub mod adapters;
mod registry;

use std::sync::Arc;

use crate::error::DecodeError;
use crate::events::{EventKind, EventPayload, TimeSource};
use crate::writer::Writer;

pub use registry::{ListenerRegistry, ListenerStats};

/// Generic listener invoked for every triggered event of its kind.
///
/// Returns `Err` only to report that it could not decode the payload.
pub type Listener = Arc<
    dyn Fn(Option<&dyn Writer>, TimeSource, EventKind, &EventPayload) -> Result<(), DecodeError>
        + Send
        + Sync,
>;

/// Wraps a closure into a [`Listener`].
///
/// ```rust
/// use diagvisor::listener;
///
/// let l = listener(|_writer, ts, kind, payload| {
///     println!("#{} {kind}: {payload:?}", ts.seq);
///     Ok(())
/// });
/// # let _ = l;
/// ```
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, EventKind, &EventPayload) -> Result<(), DecodeError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}
