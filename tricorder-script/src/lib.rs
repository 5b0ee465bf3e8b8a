//! # Tricorder Script
//!
//! The reference expression engine behind the console's [`ScriptEngine`]
//! contract: a small interpreted language with numbers, strings, booleans,
//! nil, variables, assignment, and builtin calls. The console bindings
//! (`log`, `watch`, `unwatch`) are builtins; hosts can register native
//! functions of their own.
//!
//! Anything satisfying the two-operation contract could replace this
//! crate; the console never sees past the trait.

mod eval;
mod parser;
mod token;

pub use eval::NativeFn;

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::io::Write;
use std::rc::Rc;

use eval::{Env, EvalCx, Natives};
use tricorder_console::{
    format_value, Completions, ConsoleBindings, EngineContext, EvalError, ScriptEngine, Value,
};

/// Builtins every session has, sorted for completion listings.
const BUILTINS: &[&str] = &["log", "unwatch", "watch"];

pub struct Interp {
    env: Env,
    natives: Natives,
    bindings: ConsoleBindings,
}

impl Interp {
    /// Build the engine and install the prelude. Prelude notices go to
    /// the console's diagnostics writer, which the session intercepts
    /// during boot.
    pub fn boot(ctx: &EngineContext) -> Self {
        let interp = Self {
            env: Rc::new(RefCell::new(HashMap::new())),
            natives: Rc::new(RefCell::new(HashMap::new())),
            bindings: ctx.bindings.clone(),
        };

        let mut diag = ctx.diagnostics.borrow_mut();
        let _ = writeln!(
            diag,
            "tricorder-script {}: installing prelude",
            env!("CARGO_PKG_VERSION")
        );
        for (name, value) in [("pi", PI), ("tau", TAU)] {
            interp
                .env
                .borrow_mut()
                .insert(name.to_string(), Value::Num(value));
            let _ = writeln!(diag, "  {name} = {}", format_value(&Value::Num(value)));
        }
        drop(diag);

        tracing::debug!("script engine booted");
        interp
    }

    /// Expose a host function to expressions, e.g. an uptime counter.
    pub fn register_native(&mut self, name: &str, f: NativeFn) {
        self.natives.borrow_mut().insert(name.to_string(), f);
    }

    fn cx(&self) -> EvalCx<'_> {
        EvalCx {
            env: &self.env,
            natives: &self.natives,
            bindings: &self.bindings,
            in_watch: false,
        }
    }

    /// Every name an identifier could complete to, sorted.
    fn scope_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTINS.iter().map(|s| s.to_string()).collect();
        names.extend(self.natives.borrow().keys().cloned());
        names.extend(self.env.borrow().keys().cloned());
        names.sort();
        names.dedup();
        names
    }
}

impl ScriptEngine for Interp {
    fn eval(&mut self, line: &str) -> Result<Value, EvalError> {
        if line.trim().is_empty() {
            return Err(EvalError::NoValue);
        }
        let expr =
            parser::parse_line(line).map_err(|e| EvalError::Failed(format!("{e:#}")))?;
        self.cx().eval(&expr)
    }

    fn completions(&mut self, prefix: &str) -> Option<Completions> {
        let token = trailing_ident(prefix);
        if token.is_empty() {
            return None;
        }

        let candidates: Vec<String> = self
            .scope_names()
            .into_iter()
            .filter(|name| name.starts_with(token))
            .map(|name| name[token.len()..].to_string())
            .collect();

        Some(Completions {
            candidates,
            token_prefix: token.to_string(),
        })
    }
}

/// The identifier fragment ending at the end of `prefix`, possibly empty.
fn trailing_ident(prefix: &str) -> &str {
    let start = prefix
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(prefix.len());
    &prefix[start..]
}
