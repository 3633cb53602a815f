//! # Rendering capability.
//!
//! The [`Writer`] trait is everything the dispatch core needs from an output:
//! raw writes, colorizing, pooled scratch buffers, and timestamped lines on a
//! standard and an error stream. The agent never assumes exclusive access to a
//! writer; implementations must be thread-safe.
//!
//! ## Contents
//! - [`Writer`] rendering trait
//! - [`Color`] palette used for labels and status codes
//! - [`BufferPool`] reusable scratch buffers
//! - [`LogWriter`] stdout/stderr implementation _(feature `logging`)_
//! - [`helpers`] request lifecycle line formatting

mod buffer;
pub mod helpers;
#[cfg(feature = "logging")]
mod log;

use std::fmt;
use std::io;

use crate::events::TimeSource;

pub use buffer::BufferPool;
#[cfg(feature = "logging")]
pub use log::LogWriter;

/// Terminal colors available to writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
}

impl Color {
    /// Color conventionally used for an HTTP status code.
    ///
    /// `< 300` green, `< 400` yellow, everything else red.
    pub fn for_status_code(status_code: u16) -> Color {
        match status_code {
            0..=299 => Color::Green,
            300..=399 => Color::Yellow,
            _ => Color::Red,
        }
    }
}

/// Output capability consumed by the agent and the request helpers.
///
/// ### Implementation requirements
/// - Thread-safe: the same writer is used by every dispatch worker at once.
/// - Do not block unboundedly; a hung write stalls one worker.
pub trait Writer: Send + Sync {
    /// Writes raw bytes to the standard stream.
    fn write(&self, bytes: &[u8]) -> io::Result<usize>;

    /// Wraps `text` in the given color (or returns it unchanged).
    fn colorize(&self, text: &str, color: Color) -> String;

    /// Colors `text` according to an HTTP status code.
    fn colorize_by_status_code(&self, status_code: u16, text: &str) -> String {
        self.colorize(text, Color::for_status_code(status_code))
    }

    /// Acquires a scratch buffer for one render call.
    fn get_buffer(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Returns a scratch buffer acquired with [`get_buffer`](Self::get_buffer).
    fn put_buffer(&self, _buffer: Vec<u8>) {}

    /// Writes one timestamped line to the standard stream.
    fn printf_with_time_source(&self, ts: &TimeSource, args: fmt::Arguments<'_>)
    -> io::Result<usize>;

    /// Writes one timestamped line to the error stream.
    fn errorf_with_time_source(&self, ts: &TimeSource, args: fmt::Arguments<'_>)
    -> io::Result<usize>;
}
