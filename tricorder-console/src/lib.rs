//! # Tricorder Console Core
//!
//! The embeddable debug console: a capture/edit session state machine,
//! command history, tab completion, a watch-expression registry evaluated
//! once per render tick, and the styled output pipeline.
//!
//! The core draws nothing and compiles nothing. The host supplies a
//! [`LineEditor`] and a [`LogSink`]; the evaluation engine sits behind
//! [`ScriptEngine`]. Everything runs synchronously on the host's
//! update/render thread.

pub mod completion;
pub mod editor;
pub mod engine;
pub mod history;
pub mod session;
pub mod sink;
pub mod value;
pub mod watch;

// Re-export the main types so hosts can just use `tricorder_console::ConsoleSession`.
pub use editor::LineEditor;
pub use engine::{Completions, EvalError, ScriptEngine};
pub use history::History;
pub use session::{
    ConsoleBindings, ConsoleKey, ConsoleSession, EngineContext, KeyOutcome, DEFAULT_PROMPT,
};
pub use sink::{LogSink, OutputSink, Style};
pub use value::{format_value, Value};
pub use watch::{WatchError, WatchEval, WatchLine, WatchRegistry, WATCH_ERROR_SENTINEL};
