// src/supervisor/output.rs

//! Output multiplexing: child stdout/stderr lines are forwarded to the
//! program's own stdout/stderr, prefixed with the owning group's name.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Which program stream a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Destination for prefixed child output and supervisor status lines.
///
/// One `emit` call is one atomic write unit; ordering between concurrent
/// callers is unspecified.
pub trait OutputSink: Send + Sync {
    fn emit(&self, stream: Stream, line: String);
}

/// Writes to the real process stdout / stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSink;

impl OutputSink for StdioSink {
    fn emit(&self, stream: Stream, mut line: String) {
        line.push('\n');
        // A closed terminal is not the supervisor's problem; the child's exit
        // status is what matters.
        let _ = match stream {
            Stream::Stdout => std::io::stdout().lock().write_all(line.as_bytes()),
            Stream::Stderr => std::io::stderr().lock().write_all(line.as_bytes()),
        };
    }
}

/// `"[<group>] "`
pub fn group_prefix(group: &str) -> String {
    format!("[{group}] ")
}

/// Forward every line of `reader` to `sink` until the stream closes.
///
/// Lines are raw bytes; invalid UTF-8 is replaced, never fatal. Only EOF or
/// an I/O error ends the loop: a broken pipe is expected when the process is
/// killed, and the exit status is the authoritative outcome.
pub async fn forward_lines<R>(reader: R, stream: Stream, prefix: String, sink: Arc<dyn OutputSink>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = trim_line_end(&buf);
                sink.emit(stream, format!("{prefix}{}", String::from_utf8_lossy(line)));
            }
            Err(e) => {
                debug!(?stream, prefix = %prefix, error = %e, "output stream read failed");
                break;
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
