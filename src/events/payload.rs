//! # Event payloads.
//!
//! [`EventPayload`] is the closed set of shapes an event can carry from the
//! producer to listeners. Payloads are captured by value at enqueue time and
//! decoded on the worker through the `as_*` accessors, which return a
//! [`DecodeError`] instead of panicking on a shape mismatch.
//!
//! ```text
//! Message(text)                               info / debug
//! Error { error, request? }                   warning / error / fatal
//! RequestStart(request)                       request
//! RequestComplete { request, status, len, t } request_complete
//! Body(bytes)                                 request_body / response
//! Fields([Any, ...])                          custom kinds
//! ```
//!
//! Adding a new event shape means adding a variant plus an accessor here and an
//! adapter in [`listeners::adapters`](crate::listeners); the dispatch core
//! never looks inside a payload.

use std::any::Any;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::error::DecodeError;

/// Opaque positional value of a generic event.
pub type Field = Arc<dyn Any + Send + Sync>;

/// Snapshot of a reported application error.
///
/// Captures the display message and the `source()` chain so the report can be
/// cloned into queued tasks while the original error goes back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ErrorReport {
    message: String,
    causes: Vec<String>,
}

impl ErrorReport {
    /// Creates a report with no cause chain.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Snapshots an error and its `source()` chain.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        Self {
            message: err.to_string(),
            causes,
        }
    }

    /// Top-level message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Messages of the underlying causes, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Message followed by every cause, `: `-separated.
    pub fn detailed(&self) -> String {
        let mut out = self.message.clone();
        for cause in &self.causes {
            out.push_str(": ");
            out.push_str(cause);
        }
        out
    }
}

/// Request metadata captured for request lifecycle events.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<SocketAddr>,
}

impl RequestInfo {
    /// Creates request metadata without headers or peer address.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            peer: None,
        }
    }

    /// Captures method, URI and headers of a request.
    ///
    /// The peer address is taken from a `SocketAddr` request extension when the
    /// server put one there.
    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            peer: req.extensions().get::<SocketAddr>().copied(),
        }
    }

    /// Sets the peer address.
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Replaces the header map.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI as received.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path component of the URI.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Socket address of the connected peer, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
    /// peer address.
    pub fn remote_ip(&self) -> Option<String> {
        let forwarded = self
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }

        let real = self
            .headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = real {
            return Some(ip.to_string());
        }

        self.peer.map(|p| p.ip().to_string())
    }
}

/// Decoded view of a request-complete payload.
#[derive(Debug, Clone, Copy)]
pub struct RequestComplete<'a> {
    pub request: &'a RequestInfo,
    pub status_code: u16,
    pub content_length: u64,
    pub elapsed: Duration,
}

/// Data carried by an event from the producer to listeners.
#[derive(Clone)]
pub enum EventPayload {
    /// Informational or debug text.
    Message(String),
    /// Reported application error, optionally tied to a request.
    Error {
        error: ErrorReport,
        request: Option<Arc<RequestInfo>>,
    },
    /// A request started.
    RequestStart(Arc<RequestInfo>),
    /// A request completed.
    RequestComplete {
        request: Arc<RequestInfo>,
        status_code: u16,
        content_length: u64,
        elapsed: Duration,
    },
    /// Raw request or response body.
    Body(Bytes),
    /// Ordered opaque values of a custom event.
    Fields(Vec<Field>),
}

impl EventPayload {
    /// Plain message payload.
    pub fn message(text: impl Into<String>) -> Self {
        EventPayload::Message(text.into())
    }

    /// Error payload without a request.
    pub fn error(error: ErrorReport) -> Self {
        EventPayload::Error {
            error,
            request: None,
        }
    }

    /// Error payload tied to the request that produced it.
    pub fn error_with_request(error: ErrorReport, request: RequestInfo) -> Self {
        EventPayload::Error {
            error,
            request: Some(Arc::new(request)),
        }
    }

    /// A request has started.
    pub fn request_start(request: RequestInfo) -> Self {
        EventPayload::RequestStart(Arc::new(request))
    }

    /// A request has completed with the given status, size and latency.
    pub fn request_complete(
        request: RequestInfo,
        status_code: u16,
        content_length: u64,
        elapsed: Duration,
    ) -> Self {
        EventPayload::RequestComplete {
            request: Arc::new(request),
            status_code,
            content_length,
            elapsed,
        }
    }

    /// Raw request or response body.
    pub fn body(bytes: impl Into<Bytes>) -> Self {
        EventPayload::Body(bytes.into())
    }

    /// Ordered values of a custom event.
    pub fn fields(fields: Vec<Field>) -> Self {
        EventPayload::Fields(fields)
    }

    /// Short stable name of the variant.
    pub fn shape(&self) -> &'static str {
        match self {
            EventPayload::Message(_) => "message",
            EventPayload::Error { .. } => "error",
            EventPayload::RequestStart(_) => "request_start",
            EventPayload::RequestComplete { .. } => "request_complete",
            EventPayload::Body(_) => "body",
            EventPayload::Fields(_) => "fields",
        }
    }

    fn mismatch(&self, expected: &'static str) -> DecodeError {
        DecodeError::Mismatch {
            expected,
            found: self.shape(),
        }
    }

    /// Decodes message text.
    pub fn as_message(&self) -> Result<&str, DecodeError> {
        match self {
            EventPayload::Message(text) => Ok(text),
            _ => Err(self.mismatch("message")),
        }
    }

    /// Decodes a reported error.
    pub fn as_error(&self) -> Result<&ErrorReport, DecodeError> {
        match self {
            EventPayload::Error { error, .. } => Ok(error),
            _ => Err(self.mismatch("error")),
        }
    }

    /// Decodes the request an error was reported with.
    pub fn as_error_request(&self) -> Result<&RequestInfo, DecodeError> {
        match self {
            EventPayload::Error {
                request: Some(request),
                ..
            } => Ok(request),
            EventPayload::Error { request: None, .. } => Err(DecodeError::Missing {
                index: 1,
                expected: "request",
            }),
            _ => Err(self.mismatch("error")),
        }
    }

    /// Decodes the request of a request-start or request-complete payload.
    pub fn as_request(&self) -> Result<&RequestInfo, DecodeError> {
        match self {
            EventPayload::RequestStart(request) => Ok(request),
            EventPayload::RequestComplete { request, .. } => Ok(request),
            _ => Err(self.mismatch("request")),
        }
    }

    /// Decodes a request-complete payload.
    pub fn as_request_complete(&self) -> Result<RequestComplete<'_>, DecodeError> {
        match self {
            EventPayload::RequestComplete {
                request,
                status_code,
                content_length,
                elapsed,
            } => Ok(RequestComplete {
                request,
                status_code: *status_code,
                content_length: *content_length,
                elapsed: *elapsed,
            }),
            _ => Err(self.mismatch("request_complete")),
        }
    }

    /// Decodes a raw body.
    pub fn as_body(&self) -> Result<&[u8], DecodeError> {
        match self {
            EventPayload::Body(bytes) => Ok(bytes),
            _ => Err(self.mismatch("body")),
        }
    }

    /// Decodes all generic fields.
    pub fn as_fields(&self) -> Result<&[Field], DecodeError> {
        match self {
            EventPayload::Fields(fields) => Ok(fields),
            _ => Err(self.mismatch("fields")),
        }
    }

    /// Decodes the generic field at `index` as `T`.
    pub fn field<T: Any>(&self, index: usize) -> Result<&T, DecodeError> {
        let fields = self.as_fields()?;
        let value = fields.get(index).ok_or(DecodeError::Missing {
            index,
            expected: std::any::type_name::<T>(),
        })?;
        value
            .downcast_ref::<T>()
            .ok_or(DecodeError::FieldType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPayload::Message(text) => f.debug_tuple("Message").field(text).finish(),
            EventPayload::Error { error, request } => f
                .debug_struct("Error")
                .field("error", error)
                .field("request", &request.as_ref().map(|r| r.path()))
                .finish(),
            EventPayload::RequestStart(request) => {
                f.debug_tuple("RequestStart").field(&request.path()).finish()
            }
            EventPayload::RequestComplete {
                request,
                status_code,
                content_length,
                elapsed,
            } => f
                .debug_struct("RequestComplete")
                .field("path", &request.path())
                .field("status_code", status_code)
                .field("content_length", content_length)
                .field("elapsed", elapsed)
                .finish(),
            EventPayload::Body(bytes) => f.debug_tuple("Body").field(&bytes.len()).finish(),
            EventPayload::Fields(fields) => f.debug_tuple("Fields").field(&fields.len()).finish(),
        }
    }
}
