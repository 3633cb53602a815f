//! Error types used by the diagvisor runtime, its tasks and listener adapters.
//!
//! - [`DispatchError`]: usage errors of the dispatch queue (enqueue after close, ...).
//! - [`TaskError`]: failures of a single queued task; logged by the worker, never fatal.
//! - [`DecodeError`]: a listener adapter could not decode a payload; dropped and counted.
//! - [`ParseFlagsError`]: unknown label or malformed mask in a textual flag list.
//!
//! Each type provides `as_label` for logs; reported application errors are
//! carried as [`ErrorReport`](crate::ErrorReport) and are not part of this module.

use thiserror::Error;

/// # Errors produced by the dispatch queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The queue was closed; no new tasks are accepted.
    #[error("dispatch queue is closed")]
    Closed,

    /// The queue is at capacity (only returned by non-blocking enqueue).
    #[error("dispatch queue is full (capacity {capacity})")]
    Full {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// A blocking enqueue was attempted from inside the async runtime.
    #[error("blocking enqueue called from within an async runtime; use enqueue().await")]
    InsideRuntime,

    /// A worker terminated abnormally while the queue was closing.
    #[error("dispatch worker terminated abnormally: {info}")]
    WorkerPanicked {
        /// Join error details.
        info: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use diagvisor::DispatchError;
    ///
    /// assert_eq!(DispatchError::Closed.as_label(), "dispatch_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
            DispatchError::Full { .. } => "dispatch_full",
            DispatchError::InsideRuntime => "dispatch_inside_runtime",
            DispatchError::WorkerPanicked { .. } => "dispatch_worker_panicked",
        }
    }
}

/// # Errors produced by a queued task.
///
/// Returned to the worker loop, which logs them and moves on to the next task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Rendering through the writer failed.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// Task panicked; the panic was caught by the worker.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic message, if it was a string.
        info: String,
    },

    /// Generic task failure.
    #[error("task failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Write(_) => "task_write",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// Convenience constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }
}

/// # Errors produced while decoding an event payload inside a listener adapter.
///
/// Delivery to listeners is best-effort: the registry counts these and drops
/// the call; they never reach the producer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload has a different shape than the adapter expects.
    #[error("expected {expected} payload, found {found}")]
    Mismatch {
        /// Shape the adapter expects.
        expected: &'static str,
        /// Shape that was delivered.
        found: &'static str,
    },

    /// A positional value is absent.
    #[error("missing value #{index} ({expected})")]
    Missing {
        /// Position of the missing value.
        index: usize,
        /// Expected type or role.
        expected: &'static str,
    },

    /// A generic field holds a value of another type.
    #[error("field #{index} is not a {expected}")]
    FieldType {
        /// Position of the field.
        index: usize,
        /// Expected type name.
        expected: &'static str,
    },
}

impl DecodeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::Mismatch { .. } => "decode_mismatch",
            DecodeError::Missing { .. } => "decode_missing",
            DecodeError::FieldType { .. } => "decode_field_type",
        }
    }
}

/// # Errors produced when parsing an [`EventFlagSet`](crate::EventFlagSet) from text.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFlagsError {
    /// A label does not name a built-in event kind.
    #[error("unknown event label {label:?}")]
    UnknownLabel {
        /// The offending label.
        label: String,
    },

    /// A `+bits(..)` suffix is not a hexadecimal mask.
    #[error("invalid raw bit mask {text:?}")]
    InvalidBits {
        /// The offending suffix.
        text: String,
    },
}

impl ParseFlagsError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseFlagsError::UnknownLabel { .. } => "flags_unknown_label",
            ParseFlagsError::InvalidBits { .. } => "flags_invalid_bits",
        }
    }
}
