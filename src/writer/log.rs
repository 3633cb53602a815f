//! # LogWriter: colorized line writer
//!
//! Writes timestamped lines to a standard and an error sink (stdout / stderr
//! by default).
//!
//! ## Example output
//! ```text
//! 2026-10-16T09:12:44.120331Z info Listening on :8888
//! 2026-10-16T09:12:45.004127Z [api] error connection refused: os error 111
//! 2026-10-16T09:12:45.004902Z Request Complete 127.0.0.1 GET /health 200 1.2ms 17B
//! ```
//!
//! Colors are emitted only when enabled ([`LogWriter::with_color`]); by default
//! they follow whether stdout is a terminal.

use std::fmt;
use std::io::{self, IsTerminal, Write as _};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;

use crate::events::TimeSource;
use crate::writer::{BufferPool, Color, Writer};

type Sink = Box<dyn io::Write + Send>;

/// Line writer over a standard and an error sink.
pub struct LogWriter {
    out: Mutex<Sink>,
    err: Mutex<Sink>,
    use_color: bool,
    show_timestamp: bool,
    label: Option<String>,
    pool: BufferPool,
}

impl LogWriter {
    /// Writer over the process stdout / stderr.
    #[must_use]
    pub fn new() -> Self {
        let use_color = io::stdout().is_terminal();
        Self::with_sinks(Box::new(io::stdout()), Box::new(io::stderr())).with_color(use_color)
    }

    /// Writer over arbitrary sinks. Colors are off.
    #[must_use]
    pub fn with_sinks(out: Sink, err: Sink) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            use_color: false,
            show_timestamp: true,
            label: None,
            pool: BufferPool::default(),
        }
    }

    /// Enables or disables ANSI colors.
    ///
    /// The flag is authoritative: escape codes are written regardless of
    /// `NO_COLOR` or whether the sink is a terminal.
    #[must_use]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enables or disables the timestamp prefix.
    #[must_use]
    pub fn with_timestamps(mut self, show_timestamp: bool) -> Self {
        self.show_timestamp = show_timestamp;
        self
    }

    /// Prefixes every line with `[label]`.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn render(&self, ts: &TimeSource, args: fmt::Arguments<'_>) -> Vec<u8> {
        let mut buffer = self.pool.get();
        if self.show_timestamp {
            let stamp = DateTime::<Utc>::from(ts.at).to_rfc3339_opts(SecondsFormat::Micros, true);
            buffer.extend_from_slice(self.colorize(&stamp, Color::Gray).as_bytes());
            buffer.push(b' ');
        }
        if let Some(label) = &self.label {
            let label = format!("[{label}]");
            buffer.extend_from_slice(self.colorize(&label, Color::Blue).as_bytes());
            buffer.push(b' ');
        }
        // Writing into a Vec cannot fail.
        let _ = buffer.write_fmt(args);
        buffer.push(b'\n');
        buffer
    }

    fn emit(&self, sink: &Mutex<Sink>, buffer: Vec<u8>) -> io::Result<usize> {
        let res = {
            let mut sink = sink.lock();
            sink.write_all(&buffer).and_then(|()| sink.flush())
        };
        let n = buffer.len();
        self.pool.put(buffer);
        res.map(|()| n)
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWriter")
            .field("use_color", &self.use_color)
            .field("show_timestamp", &self.show_timestamp)
            .field("label", &self.label)
            .finish()
    }
}

fn to_colored(color: Color) -> colored::Color {
    match color {
        Color::Black => colored::Color::Black,
        Color::Red => colored::Color::Red,
        Color::Green => colored::Color::Green,
        Color::Yellow => colored::Color::Yellow,
        Color::Blue => colored::Color::Blue,
        Color::Magenta => colored::Color::Magenta,
        Color::Cyan => colored::Color::Cyan,
        Color::White => colored::Color::White,
        Color::Gray => colored::Color::BrightBlack,
        Color::LightRed => colored::Color::BrightRed,
        Color::LightGreen => colored::Color::BrightGreen,
        Color::LightYellow => colored::Color::BrightYellow,
        Color::LightBlue => colored::Color::BrightBlue,
    }
}

impl Writer for LogWriter {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut buffer = self.pool.get();
        buffer.extend_from_slice(bytes);
        self.emit(&self.out, buffer)
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_color {
            format!("\x1b[{}m{text}\x1b[0m", to_colored(color).to_fg_str())
        } else {
            text.to_string()
        }
    }

    fn get_buffer(&self) -> Vec<u8> {
        self.pool.get()
    }

    fn put_buffer(&self, buffer: Vec<u8>) {
        self.pool.put(buffer);
    }

    fn printf_with_time_source(
        &self,
        ts: &TimeSource,
        args: fmt::Arguments<'_>,
    ) -> io::Result<usize> {
        let buffer = self.render(ts, args);
        self.emit(&self.out, buffer)
    }

    fn errorf_with_time_source(
        &self,
        ts: &TimeSource,
        args: fmt::Arguments<'_>,
    ) -> io::Result<usize> {
        let buffer = self.render(ts, args);
        self.emit(&self.err, buffer)
    }
}
