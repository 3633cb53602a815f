//! # Event kinds.
//!
//! An [`EventKind`] is a category tag for a diagnostic occurrence. Every kind
//! owns exactly one bit of a 64-bit word, which is what lets an
//! [`EventFlagSet`](crate::EventFlagSet) gate emission with a single atomic load.
//!
//! ## Bit layout
//! ```text
//!  0..16   built-in kinds (INFO, DEBUG, WARNING, ERROR, FATAL, REQUEST, ...)
//! 16..64   custom kinds declared by consumers via EventKind::custom
//! ```
//!
//! Two kinds are equal when they share a bit; the label is only used for
//! rendering and parsing.
//!
//! ## Example
//! ```rust
//! use diagvisor::EventKind;
//!
//! const AUDIT: EventKind = EventKind::custom(20, "audit");
//!
//! assert_eq!(AUDIT.label(), "audit");
//! assert_ne!(AUDIT, EventKind::INFO);
//! assert_eq!(EventKind::from_label("Warning"), Some(EventKind::WARNING));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of bits reserved for built-in kinds.
pub const RESERVED_BITS: u8 = 16;

/// Total number of addressable kinds (one machine word).
pub const MAX_KINDS: u8 = 64;

/// Category tag for a diagnostic event.
#[derive(Clone, Copy)]
pub struct EventKind {
    bit: u8,
    label: &'static str,
}

impl EventKind {
    /// Informational message.
    pub const INFO: EventKind = EventKind::builtin(0, "info");
    /// Debug message.
    pub const DEBUG: EventKind = EventKind::builtin(1, "debug");
    /// Warning; rendered on the error stream.
    pub const WARNING: EventKind = EventKind::builtin(2, "warning");
    /// Error; rendered on the error stream.
    pub const ERROR: EventKind = EventKind::builtin(3, "error");
    /// Fatal error; rendered on the error stream.
    pub const FATAL: EventKind = EventKind::builtin(4, "fatal");
    /// An HTTP request started.
    pub const REQUEST: EventKind = EventKind::builtin(5, "request");
    /// An HTTP request completed.
    pub const REQUEST_COMPLETE: EventKind = EventKind::builtin(6, "request_complete");
    /// Raw HTTP request body.
    pub const REQUEST_BODY: EventKind = EventKind::builtin(7, "request_body");
    /// Raw HTTP response body.
    pub const RESPONSE: EventKind = EventKind::builtin(8, "response");

    /// All built-in kinds, in bit order.
    pub const BUILTIN: [EventKind; 9] = [
        EventKind::INFO,
        EventKind::DEBUG,
        EventKind::WARNING,
        EventKind::ERROR,
        EventKind::FATAL,
        EventKind::REQUEST,
        EventKind::REQUEST_COMPLETE,
        EventKind::REQUEST_BODY,
        EventKind::RESPONSE,
    ];

    const fn builtin(bit: u8, label: &'static str) -> Self {
        Self { bit, label }
    }

    /// Declares a consumer-defined kind.
    ///
    /// `bit` must lie in `16..64`; the lower bits belong to built-in kinds.
    /// Evaluated in a `const` item, an out-of-range bit is a compile error.
    ///
    /// # Panics
    /// Panics when `bit` is outside `16..64`.
    pub const fn custom(bit: u8, label: &'static str) -> Self {
        assert!(
            bit >= RESERVED_BITS && bit < MAX_KINDS,
            "custom event kinds must use bits 16..64"
        );
        Self { bit, label }
    }

    /// Bit index of this kind.
    #[inline]
    pub const fn bit(&self) -> u8 {
        self.bit
    }

    /// Single-bit mask of this kind.
    #[inline]
    pub const fn mask(&self) -> u64 {
        1u64 << self.bit
    }

    /// Human-readable label used in rendered lines.
    #[inline]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// True for kinds rendered on the error stream.
    #[inline]
    pub fn is_error_kind(&self) -> bool {
        matches!(self.bit, 2..=4)
    }

    /// Looks up a built-in kind by label (case-insensitive).
    pub fn from_label(label: &str) -> Option<EventKind> {
        let label = label.trim();
        EventKind::BUILTIN
            .into_iter()
            .find(|k| k.label.eq_ignore_ascii_case(label))
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.bit == other.bit
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bit.hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({}#{})", self.label, self.bit)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}
