//! # Typed listener adapters.
//!
//! Each constructor wraps a strongly-typed callback into a generic
//! [`Listener`]. At invocation the adapter decodes the [`EventPayload`]; if the
//! shape does not match, the callback is **not** invoked and the
//! [`DecodeError`] is handed back to the registry, which counts and drops it.
//!
//! | adapter                        | payload                     | callback arguments                                   |
//! |--------------------------------|-----------------------------|------------------------------------------------------|
//! | [`message_listener`]           | `Message`                   | `(writer, ts, &str)`                                 |
//! | [`error_listener`]             | `Error`                     | `(writer, ts, &ErrorReport)`                         |
//! | [`error_with_request_listener`]| `Error` with a request      | `(writer, ts, &ErrorReport, &RequestInfo)`           |
//! | [`request_start_listener`]     | `RequestStart` / `Complete` | `(writer, ts, &RequestInfo)`                         |
//! | [`request_complete_listener`]  | `RequestComplete`           | `(writer, ts, &RequestInfo, status, length, elapsed)`|
//! | [`request_body_listener`]      | `Body`                      | `(writer, ts, &[u8])`                                |
//! | [`response_listener`]          | `Body`                      | `(writer, ts, &[u8])`                                |
//! | [`fields_listener`]            | `Fields`                    | `(writer, ts, &[Field])`                             |
//!
//! ## Example
//! ```rust
//! use diagvisor::adapters::error_listener;
//!
//! let on_error = error_listener(|_writer, _ts, err| {
//!     eprintln!("reported: {}", err.message());
//! });
//! # let _ = on_error;
//! ```

use std::time::Duration;

use crate::events::{ErrorReport, Field, RequestInfo, TimeSource};
use crate::listeners::{Listener, listener};
use crate::writer::{Writer, helpers};

/// Listener for `info` / `debug` messages.
pub fn message_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &str) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let text = payload.as_message()?;
        f(writer, ts, text);
        Ok(())
    })
}

/// Listener for `warning` / `error` / `fatal` events.
pub fn error_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &ErrorReport) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let err = payload.as_error()?;
        f(writer, ts, err);
        Ok(())
    })
}

/// Listener for errors reported together with a request.
///
/// Errors reported without a request are dropped.
pub fn error_with_request_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &ErrorReport, &RequestInfo) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let err = payload.as_error()?;
        let req = payload.as_error_request()?;
        f(writer, ts, err, req);
        Ok(())
    })
}

/// Listener for request-start events.
pub fn request_start_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &RequestInfo) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let req = payload.as_request()?;
        f(writer, ts, req);
        Ok(())
    })
}

/// Listener for request-complete events.
pub fn request_complete_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &RequestInfo, u16, u64, Duration)
        + Send
        + Sync
        + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let done = payload.as_request_complete()?;
        f(
            writer,
            ts,
            done.request,
            done.status_code,
            done.content_length,
            done.elapsed,
        );
        Ok(())
    })
}

/// Listener for request bodies.
pub fn request_body_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &[u8]) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let body = payload.as_body()?;
        f(writer, ts, body);
        Ok(())
    })
}

/// Listener for response bodies.
pub fn response_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &[u8]) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let body = payload.as_body()?;
        f(writer, ts, body);
        Ok(())
    })
}

/// Listener for custom events carrying generic fields.
pub fn fields_listener<F>(f: F) -> Listener
where
    F: Fn(Option<&dyn Writer>, TimeSource, &[Field]) + Send + Sync + 'static,
{
    listener(move |writer, ts, _kind, payload| {
        let fields = payload.as_fields()?;
        f(writer, ts, fields);
        Ok(())
    })
}

/// Request-start listener rendering through [`helpers::write_request`].
pub fn write_request_listener() -> Listener {
    request_start_listener(|writer, _ts, req| {
        if let Some(w) = writer {
            let _ = helpers::write_request(w, req);
        }
    })
}

/// Request-complete listener rendering through [`helpers::write_request_complete`].
pub fn write_request_complete_listener() -> Listener {
    request_complete_listener(|writer, _ts, req, status_code, content_length, elapsed| {
        if let Some(w) = writer {
            let _ = helpers::write_request_complete(w, req, status_code, content_length, elapsed);
        }
    })
}

/// Request-body listener rendering through [`helpers::write_request_body`].
pub fn write_request_body_listener() -> Listener {
    request_body_listener(|writer, _ts, body| {
        if let Some(w) = writer {
            let _ = helpers::write_request_body(w, body);
        }
    })
}

/// Response listener rendering through [`helpers::write_response`].
pub fn write_response_listener() -> Listener {
    response_listener(|writer, _ts, body| {
        if let Some(w) = writer {
            let _ = helpers::write_response(w, body);
        }
    })
}
