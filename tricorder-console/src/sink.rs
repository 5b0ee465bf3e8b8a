//! Styled output records and the line-buffering diagnostics sink.
//!
//! Everything the console shows the user goes through a host-provided
//! [`LogSink`], one record per line. [`OutputSink`] sits in front of it for
//! writers that produce a character stream instead of whole lines (engine
//! diagnostics): it buffers until a newline, then flushes one record.

use serde::{Deserialize, Serialize};
use std::io;
use std::rc::Rc;

/// Severity/color class of one console record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    /// Evaluation results and `log(...)` output.
    Normal,
    /// The submitted line, echoed back verbatim.
    Echo,
    /// Evaluation failures and engine diagnostics.
    Error,
    /// Welcome text, completion listings.
    Info,
}

/// Host log capability: display one styled line.
///
/// Implementations take `&self`; a sink that accumulates records keeps
/// them behind interior mutability.
pub trait LogSink {
    fn log(&self, text: &str, style: Style);
}

/// A write target that turns a character stream into styled records.
///
/// Bytes accumulate until a `\n` arrives; the buffered text (newline
/// excluded) is flushed as one record in the sink's fixed style. While
/// `intercept` is set, writes are discarded wholesale: whatever was
/// buffered before stays buffered, and nothing discarded is replayed when
/// interception ends.
pub struct OutputSink {
    sink: Rc<dyn LogSink>,
    buf: Vec<u8>,
    style: Style,
    intercept: bool,
}

impl OutputSink {
    pub fn new(sink: Rc<dyn LogSink>) -> Self {
        Self::with_style(sink, Style::Error)
    }

    pub fn with_style(sink: Rc<dyn LogSink>, style: Style) -> Self {
        Self {
            sink,
            buf: Vec::new(),
            style,
            intercept: false,
        }
    }

    pub fn intercept(&self) -> bool {
        self.intercept
    }

    pub fn set_intercept(&mut self, on: bool) {
        self.intercept = on;
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.intercept {
            return Ok(bytes.len());
        }
        for &b in bytes {
            if b == b'\n' {
                let text = String::from_utf8_lossy(&self.buf).into_owned();
                self.sink.log(&text, self.style);
                self.buf.clear();
            } else {
                self.buf.push(b);
            }
        }
        Ok(bytes.len())
    }

    // Records are newline-delimited by contract; a partial line stays
    // buffered until its newline arrives.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
