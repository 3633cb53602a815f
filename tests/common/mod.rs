#![allow(dead_code)]

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::Once;

use diagvisor::{Agent, AgentConfig, Color, EventFlagSet, TimeSource, Writer};
use parking_lot::Mutex;

/// Output stream a line was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
    Raw,
}

/// One rendered line.
#[derive(Debug, Clone)]
pub struct Line {
    pub stream: Stream,
    pub seq: u64,
    pub text: String,
}

/// Writer double that records every line instead of printing it.
#[derive(Default)]
pub struct RecordingWriter {
    lines: Mutex<Vec<Line>>,
}

impl RecordingWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().clone()
    }

    pub fn texts(&self, stream: Stream) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.stream == stream)
            .map(|l| l.text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    fn record(&self, stream: Stream, seq: u64, text: String) -> io::Result<usize> {
        let n = text.len();
        self.lines.lock().push(Line { stream, seq, text });
        Ok(n)
    }
}

impl Writer for RecordingWriter {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(bytes).trim_end().to_string();
        self.record(Stream::Raw, 0, text)
    }

    fn colorize(&self, text: &str, _color: Color) -> String {
        text.to_string()
    }

    fn printf_with_time_source(&self, ts: &TimeSource, args: fmt::Arguments<'_>) -> io::Result<usize> {
        self.record(Stream::Out, ts.seq, args.to_string())
    }

    fn errorf_with_time_source(&self, ts: &TimeSource, args: fmt::Arguments<'_>) -> io::Result<usize> {
        self.record(Stream::Err, ts.seq, args.to_string())
    }
}

/// Builds an agent rendering into a fresh [`RecordingWriter`].
pub fn recording_agent(
    workers: usize,
    queue_capacity: usize,
    verbosity: EventFlagSet,
) -> (Arc<Agent>, Arc<RecordingWriter>) {
    init_tracing();
    let writer = RecordingWriter::new();
    let cfg = AgentConfig {
        workers,
        queue_capacity,
        verbosity,
        ..AgentConfig::default()
    };
    let agent = Agent::builder(cfg).with_writer(writer.clone()).build();
    (agent, writer)
}

/// Installs a test subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
