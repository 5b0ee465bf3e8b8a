//! Named watch expressions, re-evaluated once per render tick.

use crate::engine::EvalError;
use crate::value::{format_value, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown in place of a watch value whose evaluator failed.
pub const WATCH_ERROR_SENTINEL: &str = "<error>";

/// A registered zero-argument evaluator.
pub type WatchEval = Box<dyn FnMut() -> Result<Value, EvalError>>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WatchError {
    #[error("watch '{0}' already exists")]
    DuplicateName(String),
    #[error("no watch named '{0}'")]
    NotFound(String),
}

/// One rendered label/value pair, ready for the host to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchLine {
    pub name: String,
    pub text: String,
}

struct WatchEntry {
    name: String,
    eval: WatchEval,
}

/// Ordered name→evaluator registry. Insertion order is render order.
#[derive(Default)]
pub struct WatchRegistry {
    entries: Vec<WatchEntry>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `eval` under `name`. Names are unique; a taken name is a
    /// recoverable error and leaves the registry untouched.
    pub fn watch(&mut self, name: &str, eval: WatchEval) -> Result<(), WatchError> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(WatchError::DuplicateName(name.to_string()));
        }
        self.entries.push(WatchEntry {
            name: name.to_string(),
            eval,
        });
        tracing::debug!(%name, "watch registered");
        Ok(())
    }

    /// Remove the watch named `name`, preserving the order of the rest.
    pub fn unwatch(&mut self, name: &str) -> Result<(), WatchError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| WatchError::NotFound(name.to_string()))?;
        self.entries.remove(idx);
        tracing::debug!(%name, "watch removed");
        Ok(())
    }

    /// Evaluate every watch in insertion order and return its display
    /// line. A failing evaluator contributes the error sentinel; the
    /// frame always completes.
    pub fn render_frame(&mut self) -> Vec<WatchLine> {
        self.entries
            .iter_mut()
            .map(|entry| {
                let text = match (entry.eval)() {
                    Ok(value) => format_value(&value),
                    Err(_) => WATCH_ERROR_SENTINEL.to_string(),
                };
                WatchLine {
                    name: entry.name.clone(),
                    text,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}
