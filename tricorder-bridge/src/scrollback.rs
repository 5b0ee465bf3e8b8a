//! Styled output accumulation for the terminal view.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tricorder_console::{LogSink, Style};

/// Oldest lines are dropped past this point.
pub const MAX_LINES: usize = 500;

#[derive(Debug, Default)]
pub struct Scrollback {
    lines: VecDeque<(String, Style)>,
}

impl Scrollback {
    /// Append a record. Echoed input may carry embedded newlines; the
    /// view stays line-oriented, so each becomes its own entry.
    pub fn push(&mut self, text: &str, style: Style) {
        for line in text.split('\n') {
            if self.lines.len() == MAX_LINES {
                self.lines.pop_front();
            }
            self.lines.push_back((line.to_string(), style));
        }
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &(String, Style)> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The bridge's `LogSink`: console records land in the shared scrollback.
#[derive(Clone)]
pub struct ScrollbackSink(pub Rc<RefCell<Scrollback>>);

impl LogSink for ScrollbackSink {
    fn log(&self, text: &str, style: Style) {
        self.0.borrow_mut().push(text, style);
    }
}
