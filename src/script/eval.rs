//! Turning parsed scripts into bodies
//!
//! The engine never sees the AST: every block literal becomes an opaque
//! [`Body`] closure, and every name it calls goes through the sandbox the
//! body is run in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::{body, Body, Call, Sandbox};
use crate::error::{BlockError, Result};
use crate::script::ast::{BinaryOp, CallExpr, Expr, Script, Statement};
use crate::value::Value;

/// Lexical variables of one block activation
#[derive(Default)]
pub struct Env {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    pub fn root() -> Rc<Env> {
        Rc::new(Env::default())
    }

    pub fn child(parent: &Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            vars: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Update the nearest existing binding, or create a local one
    pub fn assign(&self, name: &str, value: Value) {
        if let Err(value) = self.update(name, value) {
            self.vars.borrow_mut().insert(name.to_string(), value);
        }
    }

    fn update(&self, name: &str, value: Value) -> std::result::Result<(), Value> {
        if let Some(slot) = self.vars.borrow_mut().get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.update(name, value),
            None => Err(value),
        }
    }
}

/// Body running a whole script directly in `env`
pub fn script_body(script: &Script, env: Rc<Env>) -> Body {
    let statements = Rc::new(script.statements.clone());
    body(move |sb| eval_statements(&statements, &env, sb))
}

/// Body for a block literal; each run gets fresh locals on top of `enclosing`
fn block_body(statements: Rc<Vec<Statement>>, enclosing: Rc<Env>) -> Body {
    body(move |sb| {
        let local = Env::child(&enclosing);
        eval_statements(&statements, &local, sb)
    })
}

fn eval_statements(statements: &[Statement], env: &Rc<Env>, sb: &Sandbox<'_>) -> Result<Value> {
    let mut last = Value::Nil;
    for statement in statements {
        last = match statement {
            Statement::Assign { name, value } => {
                let value = eval_expr(value, env, sb)?;
                env.assign(name, value.clone());
                value
            }
            Statement::Expr(expr) => eval_expr(expr, env, sb)?,
        };
    }
    Ok(last)
}

fn eval_expr(expr: &Expr, env: &Rc<Env>, sb: &Sandbox<'_>) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|item| eval_expr(item, env, sb))
                .collect::<Result<_>>()?,
        )),
        Expr::Negate(operand) => match eval_expr(operand, env, sb)? {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| BlockError::application("integer overflow")),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(BlockError::application(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        },
        Expr::Binary { op, left, right } => {
            let left = eval_expr(left, env, sb)?;
            let right = eval_expr(right, env, sb)?;
            apply(*op, left, right)
        }
        Expr::Call(call) => eval_call(call, env, sb),
    }
}

fn eval_call(call: &CallExpr, env: &Rc<Env>, sb: &Sandbox<'_>) -> Result<Value> {
    if call.is_bare() {
        if let Some(value) = env.lookup(&call.name) {
            return Ok(value);
        }
    }

    let args = call
        .args
        .iter()
        .map(|arg| eval_expr(arg, env, sb))
        .collect::<Result<Vec<_>>>()?;

    let mut invocation = Call::new(args);
    if let Some(statements) = &call.block {
        invocation = invocation.with_block(block_body(Rc::new(statements.clone()), Rc::clone(env)));
    }

    sb.invoke(&call.name, invocation)
}

/// Longest string `*` may produce
pub const MAX_REPEAT_LEN: usize = 1 << 24;

/// Arithmetic and concatenation
pub fn apply(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    use Value::*;

    let unsupported = |left: &Value, right: &Value| {
        BlockError::application(format!(
            "unsupported operation: {} {} {}",
            left.type_name(),
            op,
            right.type_name()
        ))
    };
    let overflow = || BlockError::application("integer overflow");

    match (op, left, right) {
        (BinaryOp::Add, Str(a), b) => Ok(Str(format!("{}{}", a, b))),
        (BinaryOp::Add, a, Str(b)) => Ok(Str(format!("{}{}", a, b))),
        (BinaryOp::Add, List(mut a), List(b)) => {
            a.extend(b);
            Ok(List(a))
        }
        (BinaryOp::Mul, Str(s), Int(n)) | (BinaryOp::Mul, Int(n), Str(s)) => {
            let times = usize::try_from(n)
                .map_err(|_| BlockError::application("negative repeat count"))?;
            match s.len().checked_mul(times) {
                Some(len) if len <= MAX_REPEAT_LEN => Ok(Str(s.repeat(times))),
                _ => Err(BlockError::application(format!(
                    "repeated string longer than {} bytes",
                    MAX_REPEAT_LEN
                ))),
            }
        }
        (op, Int(a), Int(b)) => match op {
            BinaryOp::Add => a.checked_add(b).map(Int).ok_or_else(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Int).ok_or_else(overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Int).ok_or_else(overflow),
            BinaryOp::Div | BinaryOp::Rem if b == 0 => {
                Err(BlockError::application("divided by 0"))
            }
            BinaryOp::Div => a.checked_div_euclid(b).map(Int).ok_or_else(overflow),
            BinaryOp::Rem => a.checked_rem_euclid(b).map(Int).ok_or_else(overflow),
        },
        (op, a, b) => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => Ok(Float(match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Div => x / y,
                BinaryOp::Rem => x % y,
            })),
            _ => Err(unsupported(&a, &b)),
        },
    }
}
