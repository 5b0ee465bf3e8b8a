//! The line-editor capability the host provides.
//!
//! The host owns the text buffer and the caret; the console reaches them
//! only through this interface, and only while capture is active inside a
//! single key event.

/// Read/write access to the host's single-line edit buffer.
///
/// `caret` is a byte offset into `text`, always on a char boundary, with
/// `0 <= caret <= text.len()`.
pub trait LineEditor {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn caret(&self) -> usize;
    fn set_caret(&mut self, caret: usize);
}

/// Take the whole buffer, leaving it empty with the caret at zero.
pub fn pop_text(editor: &mut dyn LineEditor) -> String {
    let text = editor.text();
    editor.set_text("");
    editor.set_caret(0);
    text
}

/// Replace the buffer and put the caret at the end.
pub fn replace_text(editor: &mut dyn LineEditor, text: &str) {
    editor.set_text(text);
    editor.set_caret(text.len());
}
