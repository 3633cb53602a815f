//! Diagnostic events: kinds, flags, timestamps and payloads.
//!
//! This module groups the event **data model** shared by producers (the
//! [`Agent`](crate::Agent) emission API) and consumers (writers and listeners).
//!
//! ## Contents
//! - [`EventKind`] one-bit category tag (built-in and custom kinds)
//! - [`EventFlagSet`] atomic enable/disable mask over kinds
//! - [`TimeSource`] enqueue-time logical timestamp
//! - [`EventPayload`] closed set of payload shapes, plus [`ErrorReport`] and
//!   [`RequestInfo`]
//!
//! See `core/mod.rs` for the system-level wiring diagram.

pub(crate) mod flags;
pub(crate) mod kind;
mod payload;
mod time;

pub use flags::EventFlagSet;
pub use kind::EventKind;
pub use payload::{ErrorReport, EventPayload, Field, RequestComplete, RequestInfo};
pub use time::TimeSource;
