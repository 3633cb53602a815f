//! Request lifecycle line formatting.
//!
//! Pure functions over a [`Writer`]: each one borrows a scratch buffer, builds a
//! single line, writes it and returns the buffer. They are what the built-in
//! request listeners render.
//!
//! ```text
//! Request 127.0.0.1 GET /health
//! Request Complete 127.0.0.1 GET /health 200 1.2ms 17B
//! Request Body {"status":"ok!"}
//! Response {"status":"ok!"}
//! ```

use std::io;
use std::time::Duration;

use crate::events::RequestInfo;
use crate::writer::{Color, Writer};

const KILOBYTE: u64 = 1 << 10;
const MEGABYTE: u64 = 1 << 20;
const GIGABYTE: u64 = 1 << 30;
const TERABYTE: u64 = 1 << 40;

fn push_request_head(writer: &dyn Writer, buffer: &mut Vec<u8>, title: &str, req: &RequestInfo) {
    buffer.extend_from_slice(writer.colorize(title, Color::Green).as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(req.remote_ip().as_deref().unwrap_or("-").as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(writer.colorize(req.method().as_str(), Color::Blue).as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(req.path().as_bytes());
}

fn finish(writer: &dyn Writer, mut buffer: Vec<u8>) -> io::Result<usize> {
    buffer.push(b'\n');
    let res = writer.write(&buffer);
    writer.put_buffer(buffer);
    res
}

/// Writes a request-start line.
pub fn write_request(writer: &dyn Writer, req: &RequestInfo) -> io::Result<usize> {
    let mut buffer = writer.get_buffer();
    push_request_head(writer, &mut buffer, "Request", req);
    finish(writer, buffer)
}

/// Writes a request-complete line with status, elapsed time and response size.
pub fn write_request_complete(
    writer: &dyn Writer,
    req: &RequestInfo,
    status_code: u16,
    content_length: u64,
    elapsed: Duration,
) -> io::Result<usize> {
    let mut buffer = writer.get_buffer();
    push_request_head(writer, &mut buffer, "Request Complete", req);
    buffer.push(b' ');
    let status = status_code.to_string();
    buffer.extend_from_slice(writer.colorize_by_status_code(status_code, &status).as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(format!("{elapsed:?}").as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(format_file_size(content_length).as_bytes());
    finish(writer, buffer)
}

/// Writes a raw request body line.
pub fn write_request_body(writer: &dyn Writer, body: &[u8]) -> io::Result<usize> {
    write_body(writer, "Request Body", body)
}

/// Writes a raw response body line.
pub fn write_response(writer: &dyn Writer, body: &[u8]) -> io::Result<usize> {
    write_body(writer, "Response", body)
}

fn write_body(writer: &dyn Writer, title: &str, body: &[u8]) -> io::Result<usize> {
    let mut buffer = writer.get_buffer();
    buffer.extend_from_slice(writer.colorize(title, Color::Green).as_bytes());
    buffer.push(b' ');
    buffer.extend_from_slice(body);
    finish(writer, buffer)
}

/// Human-readable byte count (`17B`, `3KB`, `12MB`, ...), truncating.
pub fn format_file_size(bytes: u64) -> String {
    match bytes {
        b if b >= TERABYTE => format!("{}TB", b / TERABYTE),
        b if b >= GIGABYTE => format!("{}GB", b / GIGABYTE),
        b if b >= MEGABYTE => format!("{}MB", b / MEGABYTE),
        b if b >= KILOBYTE => format!("{}KB", b / KILOBYTE),
        b => format!("{b}B"),
    }
}
