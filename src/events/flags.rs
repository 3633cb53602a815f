//! # Enable/disable bitmask over event kinds.
//!
//! [`EventFlagSet`] answers "is kind K currently enabled?" with one atomic load.
//! All kinds fit a single `u64`, so updates are `fetch_or` / `fetch_and` and
//! readers never observe a partially applied change.
//!
//! ## Rules
//! - `enable` / `disable` are idempotent and visible to every check that starts
//!   after they return.
//! - Disabling a kind never affects tasks that were already enqueued.
//! - `all()` sets every bit, custom kinds included.
//!
//! ## Text form
//! ```text
//! "all"                      → every kind
//! "none" or ""               → nothing
//! "info, error,fatal"        → listed built-in labels (case-insensitive)
//! "info+bits(0x10000)"       → labels plus a raw mask of the remaining bits
//! ```
//!
//! `Display` writes the same form, so every set survives a text round trip.
//! Bits without a built-in label (custom kinds and unused reserved bits) are
//! carried in the `+bits(..)` suffix.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ParseFlagsError;
use crate::events::EventKind;

/// Mutable, thread-safe set of enabled event kinds.
#[derive(Default)]
pub struct EventFlagSet {
    bits: AtomicU64,
}

impl EventFlagSet {
    /// Set with every kind enabled.
    pub fn all() -> Self {
        Self::from_bits(u64::MAX)
    }

    /// Set with nothing enabled.
    pub fn none() -> Self {
        Self::from_bits(0)
    }

    /// Set with exactly the given kinds enabled.
    pub fn from_kinds(kinds: &[EventKind]) -> Self {
        Self::from_bits(kinds.iter().fold(0, |acc, k| acc | k.mask()))
    }

    /// Set from a raw bitmask.
    pub fn from_bits(bits: u64) -> Self {
        Self {
            bits: AtomicU64::new(bits),
        }
    }

    /// Current raw bitmask.
    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits.load(Ordering::Acquire)
    }

    /// Enables a kind.
    #[inline]
    pub fn enable(&self, kind: EventKind) {
        self.bits.fetch_or(kind.mask(), Ordering::AcqRel);
    }

    /// Disables a kind.
    #[inline]
    pub fn disable(&self, kind: EventKind) {
        self.bits.fetch_and(!kind.mask(), Ordering::AcqRel);
    }

    /// Returns true if the kind is enabled.
    #[inline]
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        self.bits() & kind.mask() != 0
    }

    /// Enables every kind.
    pub fn set_all(&self) {
        self.bits.store(u64::MAX, Ordering::Release);
    }

    /// Disables every kind.
    pub fn set_none(&self) {
        self.bits.store(0, Ordering::Release);
    }

    /// Replaces the whole mask with the mask of `other`.
    pub fn replace(&self, other: &EventFlagSet) {
        self.bits.store(other.bits(), Ordering::Release);
    }

    /// True if every kind is enabled.
    pub fn is_all(&self) -> bool {
        self.bits() == u64::MAX
    }

    /// True if no kind is enabled.
    pub fn is_none(&self) -> bool {
        self.bits() == 0
    }

    /// Enabled built-in kinds, in bit order.
    pub fn enabled_builtin(&self) -> Vec<EventKind> {
        let bits = self.bits();
        EventKind::BUILTIN
            .into_iter()
            .filter(|k| bits & k.mask() != 0)
            .collect()
    }
}

impl Clone for EventFlagSet {
    fn clone(&self) -> Self {
        Self::from_bits(self.bits())
    }
}

impl PartialEq for EventFlagSet {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for EventFlagSet {}

impl fmt::Debug for EventFlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventFlagSet({self})")
    }
}

impl fmt::Display for EventFlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("all");
        }
        if self.is_none() {
            return f.write_str("none");
        }
        let labels: Vec<&str> = self.enabled_builtin().iter().map(|k| k.label()).collect();
        let raw = self.bits() & !builtin_mask();
        if raw == 0 {
            f.write_str(&labels.join(","))
        } else {
            write!(f, "{}+bits({raw:#x})", labels.join(","))
        }
    }
}

impl FromStr for EventFlagSet {
    type Err = ParseFlagsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::none());
        }
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let (labels, raw) = match s.split_once('+') {
            Some((labels, suffix)) => (labels, parse_raw_bits(suffix.trim())?),
            None => (s, 0),
        };

        let set = Self::from_bits(raw);
        for part in labels.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind = EventKind::from_label(part).ok_or_else(|| ParseFlagsError::UnknownLabel {
                label: part.to_string(),
            })?;
            set.enable(kind);
        }
        Ok(set)
    }
}

fn builtin_mask() -> u64 {
    EventKind::BUILTIN.iter().fold(0, |acc, k| acc | k.mask())
}

fn parse_raw_bits(suffix: &str) -> Result<u64, ParseFlagsError> {
    let invalid = || ParseFlagsError::InvalidBits {
        text: suffix.to_string(),
    };
    let hex = suffix
        .strip_prefix("bits(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
        .ok_or_else(invalid)?;
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    u64::from_str_radix(hex, 16).map_err(|_| invalid())
}

impl From<&[EventKind]> for EventFlagSet {
    fn from(kinds: &[EventKind]) -> Self {
        Self::from_kinds(kinds)
    }
}
