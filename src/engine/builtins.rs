//! Operations every scope exposes regardless of its declared commands

use crate::engine::{Call, ScopeNode};
use crate::error::{BlockError, Result};
use crate::value::Value;

/// The baseline, in the order it is appended to effective command sets
pub const NAMES: &[&str] = &["inspect", "print", "raise", "scope_name"];

pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

pub(crate) fn invoke(node: &ScopeNode<'_>, name: &str, call: Call) -> Result<Value> {
    match name {
        "inspect" => Ok(inspect(node, call.args)),
        "print" => {
            println!("{}", join(&call.args));
            Ok(Value::Nil)
        }
        "raise" => {
            let message = if call.args.is_empty() {
                "unhandled exception".to_string()
            } else {
                join(&call.args)
            };
            Err(BlockError::application(message))
        }
        "scope_name" => Ok(Value::from(node.scope_type().name())),
        _ => Err(BlockError::delegation(name, node.describe())),
    }
}

fn inspect(node: &ScopeNode<'_>, mut args: Vec<Value>) -> Value {
    match args.len() {
        0 => Value::Str(node.describe()),
        1 => Value::Str(args.remove(0).inspect()),
        _ => Value::Str(Value::List(args).inspect()),
    }
}

fn join(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
