//! The host-owned input line.
//!
//! One shared single-line buffer serves both the bridge's own command
//! console and the capture session; it is the buffer the console
//! reaches through the `LineEditor` capability. The cursor is a byte
//! offset, always on a char boundary.

use tricorder_console::LineEditor;

#[derive(Debug, Default, Clone)]
pub struct PromptEditor {
    value: String,
    cursor: usize,
}

impl PromptEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            let start = self.cursor - c.len_utf8();
            self.value.remove(start);
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Take the whole line, leaving the buffer empty.
    pub fn submit(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }
}

impl LineEditor for PromptEditor {
    fn text(&self) -> String {
        self.value.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.value = text.to_string();
        self.cursor = self.cursor.min(self.value.len());
        while !self.value.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    fn caret(&self) -> usize {
        self.cursor
    }

    fn set_caret(&mut self, caret: usize) {
        self.cursor = caret.min(self.value.len());
        while !self.value.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }
}
