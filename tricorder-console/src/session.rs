//! The console session: capture-mode state machine and line dispatch.
//!
//! One session is created at host startup and threaded through the host's
//! command handlers, key handler and render hook. While capture is active
//! it decides what each classified keystroke means; committed lines go to
//! the engine and come back as styled records through the host's log sink.

use std::cell::RefCell;
use std::rc::Rc;

use crate::completion;
use crate::editor::{self, LineEditor};
use crate::engine::{EvalError, ScriptEngine};
use crate::history::History;
use crate::sink::{LogSink, OutputSink, Style};
use crate::value::{format_value, Value};
use crate::watch::{WatchError, WatchEval, WatchRegistry};

/// Prompt shown in place of the host's own while capture is active.
pub const DEFAULT_PROMPT: &str = "tri>";

const WELCOME: &str =
    "Welcome to the Tricorder interactive prompt. Ctrl-C clears the line, Ctrl-D exits.";

/// Host-side classification of a keystroke while capture is active.
///
/// Keys that match none of these stay with the host's default editing and
/// never reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKey {
    Commit,
    Cancel,
    Exit,
    HistoryPrev,
    HistoryNext,
    Complete,
}

/// Whether the session consumed a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Fallthrough,
}

/// Extension point invoked when the user cancels the current line.
pub type CancelHook = Box<dyn FnMut()>;

/// Host-supplied source for the "repeat last input" shorthand of
/// [`ConsoleSession::eval_command`]. The provider owns any host-specific
/// prefix handling; the session never inspects host command syntax.
pub type RecallProvider = Box<dyn Fn() -> Option<String>>;

/// The `log`/`watch`/`unwatch` helpers the engine exposes inside its own
/// scope, so evaluated code can call back into the console.
#[derive(Clone)]
pub struct ConsoleBindings {
    watches: Rc<RefCell<WatchRegistry>>,
    log: Rc<dyn LogSink>,
}

impl ConsoleBindings {
    /// Format each value as an evaluation result would be and emit them
    /// space-joined as one Normal record.
    pub fn log_values(&self, values: &[Value]) {
        let text = values
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(" ");
        self.log.log(&text, Style::Normal);
    }

    pub fn watch(&self, name: &str, eval: WatchEval) -> Result<(), WatchError> {
        self.watches.borrow_mut().watch(name, eval)
    }

    pub fn unwatch(&self, name: &str) -> Result<(), WatchError> {
        self.watches.borrow_mut().unwatch(name)
    }
}

/// What an engine implementation gets from the console at build time.
pub struct EngineContext {
    pub bindings: ConsoleBindings,
    /// Line-buffering writer for engine diagnostics. Interception is on
    /// while the engine factory runs, so boot noise is swallowed.
    pub diagnostics: Rc<RefCell<OutputSink>>,
}

pub struct ConsoleSession<E> {
    engine: E,
    log: Rc<dyn LogSink>,
    watches: Rc<RefCell<WatchRegistry>>,
    diagnostics: Rc<RefCell<OutputSink>>,
    history: History,
    capturing: bool,
    prompt: String,
    saved_line: String,
    cancel_hook: Option<CancelHook>,
    recall: Option<RecallProvider>,
}

impl<E: ScriptEngine> ConsoleSession<E> {
    /// Build a session around an engine. The factory receives the console
    /// bindings and the diagnostics writer; diagnostics written while it
    /// runs are intercepted.
    pub fn boot<F>(log: Rc<dyn LogSink>, build_engine: F) -> Self
    where
        F: FnOnce(&EngineContext) -> E,
    {
        let watches = Rc::new(RefCell::new(WatchRegistry::new()));
        let diagnostics = Rc::new(RefCell::new(OutputSink::new(Rc::clone(&log))));
        let ctx = EngineContext {
            bindings: ConsoleBindings {
                watches: Rc::clone(&watches),
                log: Rc::clone(&log),
            },
            diagnostics: Rc::clone(&diagnostics),
        };

        ctx.diagnostics.borrow_mut().set_intercept(true);
        let engine = build_engine(&ctx);
        ctx.diagnostics.borrow_mut().set_intercept(false);

        Self {
            engine,
            log,
            watches,
            diagnostics,
            history: History::new(),
            capturing: false,
            prompt: DEFAULT_PROMPT.to_string(),
            saved_line: String::new(),
            cancel_hook: None,
            recall: None,
        }
    }

    // ────────────────────────────────────────────────────────────────
    // Capture lifecycle
    // ────────────────────────────────────────────────────────────────

    /// The host's start command: divert keystrokes to the console and
    /// restore whatever the user was typing when they last exited.
    pub fn start_capture(&mut self, editor: &mut dyn LineEditor) {
        self.capturing = true;
        editor::replace_text(editor, &self.saved_line);
        self.log.log(WELCOME, Style::Info);
        tracing::debug!("capture started");
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// The host's render path calls this each frame to pick the prompt
    /// glyph: the console's while capturing, the host's otherwise.
    pub fn resolve_prompt<'a>(&'a self, default: &'a str) -> &'a str {
        if self.capturing {
            &self.prompt
        } else {
            default
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    pub fn set_cancel_hook(&mut self, hook: CancelHook) {
        self.cancel_hook = Some(hook);
    }

    pub fn set_recall_provider(&mut self, recall: RecallProvider) {
        self.recall = Some(recall);
    }

    // ────────────────────────────────────────────────────────────────
    // Key dispatch
    // ────────────────────────────────────────────────────────────────

    /// Handle one classified keystroke. Returns `Fallthrough` whenever
    /// capture is inactive, so the host can keep its own meaning for the
    /// same keys.
    pub fn handle_key(&mut self, key: ConsoleKey, editor: &mut dyn LineEditor) -> KeyOutcome {
        if !self.capturing {
            return KeyOutcome::Fallthrough;
        }

        match key {
            ConsoleKey::Commit => {
                let line = editor::pop_text(editor);
                self.handle_line(&line);
                self.history.commit(&line);
            }
            ConsoleKey::Cancel => {
                editor::pop_text(editor);
                if let Some(hook) = self.cancel_hook.as_mut() {
                    hook();
                }
            }
            ConsoleKey::Exit => {
                self.saved_line = editor::pop_text(editor);
                self.capturing = false;
                tracing::debug!("capture ended");
            }
            ConsoleKey::HistoryPrev | ConsoleKey::HistoryNext => {
                let dir = if key == ConsoleKey::HistoryPrev { -1 } else { 1 };
                let entry = self.history.navigate(dir).to_string();
                editor::replace_text(editor, &entry);
            }
            ConsoleKey::Complete => {
                let text = editor.text();
                let mut caret = editor.caret().min(text.len());
                while !text.is_char_boundary(caret) {
                    caret -= 1;
                }
                let (head, tail) = text.split_at(caret);
                let expanded = completion::expand(head, &mut self.engine, self.log.as_ref());
                let caret_after = expanded.len();
                editor.set_text(&format!("{expanded}{tail}"));
                editor.set_caret(caret_after);
            }
        }

        KeyOutcome::Consumed
    }

    // ────────────────────────────────────────────────────────────────
    // Evaluation dispatch
    // ────────────────────────────────────────────────────────────────

    /// Echo `line`, evaluate it, and log the outcome. A statement that
    /// resolves to no value prints nothing; a failure prints its message
    /// as one Error record.
    pub fn handle_line(&mut self, line: &str) {
        self.log.log(line, Style::Echo);
        match self.engine.eval(line) {
            Ok(value) => self.log.log(&format_value(&value), Style::Normal),
            Err(EvalError::NoValue) => {}
            Err(EvalError::Failed(msg)) => self.log.log(&msg, Style::Error),
        }
    }

    /// Non-interactive entry point: evaluate `arg` immediately, bypassing
    /// keystroke capture. An empty argument asks the recall provider for
    /// the previous input to reuse; without a provider (or a previous
    /// input) this does nothing.
    pub fn eval_command(&mut self, arg: &str) {
        let line = if arg.trim().is_empty() {
            match self.recall.as_ref().and_then(|recall| recall()) {
                Some(prev) => prev,
                None => return,
            }
        } else {
            arg.to_string()
        };
        self.handle_line(&line);
    }

    // ────────────────────────────────────────────────────────────────
    // Shared state
    // ────────────────────────────────────────────────────────────────

    /// The watch registry, shared with the engine's console bindings.
    /// The host's render path borrows it once per frame.
    pub fn watches(&self) -> Rc<RefCell<WatchRegistry>> {
        Rc::clone(&self.watches)
    }

    /// A fresh bindings handle, for hosts that register watches of their
    /// own next to the engine's.
    pub fn bindings(&self) -> ConsoleBindings {
        ConsoleBindings {
            watches: Rc::clone(&self.watches),
            log: Rc::clone(&self.log),
        }
    }

    /// The engine diagnostics writer created at boot.
    pub fn diagnostics(&self) -> Rc<RefCell<OutputSink>> {
        Rc::clone(&self.diagnostics)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn saved_line(&self) -> &str {
        &self.saved_line
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
