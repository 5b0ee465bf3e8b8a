//! Expression evaluation against the shared environment.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::parser::{BinOp, Expr};
use tricorder_console::{ConsoleBindings, EvalError, Value};

/// A host-registered function callable from expressions.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

pub(crate) type Env = Rc<RefCell<HashMap<String, Value>>>;
pub(crate) type Natives = Rc<RefCell<HashMap<String, NativeFn>>>;

pub(crate) struct EvalCx<'a> {
    pub env: &'a Env,
    pub natives: &'a Natives,
    pub bindings: &'a ConsoleBindings,
    /// Set while running inside a watch evaluator. Registry mutation is
    /// rejected there, since the registry is already borrowed for the frame.
    pub in_watch: bool,
}

impl EvalCx<'_> {
    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var(name) => self
                .env
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::Failed(format!("unknown variable '{name}'"))),
            Expr::Assign(name, rhs) => {
                let value = self.eval(rhs)?;
                self.env.borrow_mut().insert(name.clone(), value);
                Err(EvalError::NoValue)
            }
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Num(n) => Ok(Value::Num(-n)),
                other => Err(EvalError::Failed(format!(
                    "cannot negate {}",
                    kind(&other)
                ))),
            },
            Expr::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs),
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    fn binary(&self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;

        match op {
            BinOp::Add => match (left, right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (l, r) => Err(type_error("add", &l, &r)),
            },
            BinOp::Sub => numeric(op, left, right).map(|(a, b)| Value::Num(a - b)),
            BinOp::Mul => numeric(op, left, right).map(|(a, b)| Value::Num(a * b)),
            BinOp::Div => numeric(op, left, right).map(|(a, b)| Value::Num(a / b)),
            BinOp::Rem => numeric(op, left, right).map(|(a, b)| Value::Num(a % b)),
            BinOp::Eq => Ok(Value::Bool(left == right)),
            BinOp::Ne => Ok(Value::Bool(left != right)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = match (&left, &right) {
                    (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let Some(ordering) = ordering else {
                    return Err(type_error("compare", &left, &right));
                };
                let holds = match op {
                    BinOp::Lt => ordering.is_lt(),
                    BinOp::Le => ordering.is_le(),
                    BinOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Bool(holds))
            }
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        match name {
            "log" => {
                let values = self.eval_all(args)?;
                self.bindings.log_values(&values);
                Err(EvalError::NoValue)
            }
            "watch" => {
                self.reject_in_watch(name)?;
                if args.len() != 2 {
                    return Err(EvalError::Failed(
                        "watch expects a name and an expression".to_string(),
                    ));
                }
                let watch_name = self.string_arg(&args[0], name)?;

                // The second argument is taken unevaluated: it becomes the
                // zero-argument evaluator, re-run against the live
                // environment every frame.
                let ast = args[1].clone();
                let env = Rc::clone(self.env);
                let natives = Rc::clone(self.natives);
                let bindings = self.bindings.clone();
                let eval = Box::new(move || {
                    EvalCx {
                        env: &env,
                        natives: &natives,
                        bindings: &bindings,
                        in_watch: true,
                    }
                    .eval(&ast)
                });

                self.bindings
                    .watch(&watch_name, eval)
                    .map_err(|e| EvalError::Failed(e.to_string()))?;
                Err(EvalError::NoValue)
            }
            "unwatch" => {
                self.reject_in_watch(name)?;
                if args.len() != 1 {
                    return Err(EvalError::Failed("unwatch expects a name".to_string()));
                }
                let watch_name = self.string_arg(&args[0], name)?;
                self.bindings
                    .unwatch(&watch_name)
                    .map_err(|e| EvalError::Failed(e.to_string()))?;
                Err(EvalError::NoValue)
            }
            _ => {
                let native = self.natives.borrow().get(name).cloned();
                match native {
                    Some(f) => {
                        let values = self.eval_all(args)?;
                        f(&values)
                    }
                    None => Err(EvalError::Failed(format!("unknown function '{name}'"))),
                }
            }
        }
    }

    fn eval_all(&self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|a| self.eval(a)).collect()
    }

    fn string_arg(&self, arg: &Expr, function: &str) -> Result<String, EvalError> {
        match self.eval(arg)? {
            Value::Str(s) => Ok(s),
            other => Err(EvalError::Failed(format!(
                "{function} expects a string name, got {}",
                kind(&other)
            ))),
        }
    }

    fn reject_in_watch(&self, function: &str) -> Result<(), EvalError> {
        if self.in_watch {
            return Err(EvalError::Failed(format!(
                "{function} is not available inside a watch expression"
            )));
        }
        Ok(())
    }
}

fn numeric(op: BinOp, left: Value, right: Value) -> Result<(f64, f64), EvalError> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok((a, b)),
        (l, r) => {
            let verb = match op {
                BinOp::Sub => "subtract",
                BinOp::Mul => "multiply",
                BinOp::Div => "divide",
                _ => "combine",
            };
            Err(type_error(verb, &l, &r))
        }
    }
}

fn type_error(verb: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::Failed(format!(
        "cannot {verb} {} and {}",
        kind(left),
        kind(right)
    ))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Bool(_) => "bool",
        Value::Num(_) => "number",
        Value::Str(_) => "string",
        Value::Opaque(_) => "opaque value",
    }
}
