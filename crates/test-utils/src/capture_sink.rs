use std::sync::{Arc, Mutex};

use vunat::supervisor::{OutputSink, Stream};

/// An `OutputSink` that records every emitted line in order.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<(Stream, String)>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_sink(&self) -> Arc<dyn OutputSink> {
        Arc::new(self.clone())
    }

    /// All lines, both streams, in emission order.
    pub fn lines(&self) -> Vec<(Stream, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.filtered(Stream::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.filtered(Stream::Stderr)
    }

    /// Index of the first line equal to `line`, on any stream.
    pub fn position(&self, line: &str) -> Option<usize> {
        self.lines.lock().unwrap().iter().position(|(_, l)| l == line)
    }

    pub fn contains(&self, line: &str) -> bool {
        self.position(line).is_some()
    }

    fn filtered(&self, stream: Stream) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, l)| l.clone())
            .collect()
    }
}

impl OutputSink for CaptureSink {
    fn emit(&self, stream: Stream, line: String) {
        self.lines.lock().unwrap().push((stream, line));
    }
}
