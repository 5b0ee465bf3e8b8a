//! The evaluation capability the console drives.
//!
//! The console never compiles or runs code itself. Anything that can
//! evaluate one line and suggest completions for a prefix can sit behind
//! [`ScriptEngine`]: an interpreter, a scripting VM, a sandboxed
//! subprocess.

use crate::value::Value;
use thiserror::Error;

/// Why an evaluation produced nothing to print.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The input was valid but was a statement or declaration rather than
    /// an expression. Not shown to the user.
    #[error("expression produced no value")]
    NoValue,
    /// A real failure. The message is shown to the user as-is.
    #[error("{0}")]
    Failed(String),
}

/// Completion answer for the token ending at the caret.
///
/// `candidates` are suffixes: appending one to the current input forms a
/// valid continuation. `token_prefix` is the token fragment the engine
/// matched against, used when listing full names.
#[derive(Debug, Clone, PartialEq)]
pub struct Completions {
    pub candidates: Vec<String>,
    pub token_prefix: String,
}

/// The two-operation evaluation contract.
pub trait ScriptEngine {
    fn eval(&mut self, line: &str) -> Result<Value, EvalError>;

    /// `None` means completion is unavailable for this input; the console
    /// leaves the buffer untouched.
    fn completions(&mut self, prefix: &str) -> Option<Completions>;
}
