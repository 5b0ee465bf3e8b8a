//! Keyboard dispatch: crossterm events → console key classification.
//!
//! Ctrl-C cancels the line and Ctrl-D ends the capture session, mirroring
//! the interactive prompt's welcome text. Keys the console does not claim
//! get the bridge's default line editing.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tricorder_console::ConsoleKey;

use crate::editor::PromptEditor;

/// Classify a key event for the console session. `None` means the key has
/// no console meaning and stays with the host.
pub fn map_console_key(event: &KeyEvent) -> Option<ConsoleKey> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Enter => Some(ConsoleKey::Commit),
        KeyCode::Char('c') if ctrl => Some(ConsoleKey::Cancel),
        KeyCode::Char('d') if ctrl => Some(ConsoleKey::Exit),
        KeyCode::Up => Some(ConsoleKey::HistoryPrev),
        KeyCode::Down => Some(ConsoleKey::HistoryNext),
        KeyCode::Tab => Some(ConsoleKey::Complete),
        _ => None,
    }
}

/// Default editing for keys the console did not claim.
pub fn apply_default_editing(event: &KeyEvent, editor: &mut PromptEditor) {
    if event.kind != KeyEventKind::Press {
        return;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return;
    }
    match event.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}
