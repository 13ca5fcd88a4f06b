//! Script runner for executing .blk files

use std::fs;
use std::path::Path;

use log::info;

use crate::engine::Parent;
use crate::error::{BlockError, Result};
use crate::registry::ScopeType;
use crate::script::ast::{Expr, Script, Statement};
use crate::script::eval::{script_body, Env};
use crate::script::parse_script;
use crate::value::Value;
use crate::vocabulary::Vocabulary;

/// Name of the scope every script's top level runs in
pub const ROOT_SCOPE: &str = "script";

/// Expected extension for script files
pub const SCRIPT_EXTENSION: &str = "blk";

/// Result of script execution
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptResult {
    /// Value of the last top-level statement
    pub value: Value,
    /// Number of top-level statements in the script
    pub statements: usize,
}

/// Runs scripts against a vocabulary.
///
/// The top level of a script is the body of a `script` scope whose parent is
/// the vocabulary's host object, so every command bound onto the host is
/// callable there.
pub struct ScriptRunner {
    vocabulary: Vocabulary,
    /// Variables injected before the first statement, from `--arg`
    variables: Vec<(String, Value)>,
}

impl ScriptRunner {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            variables: Vec::new(),
        }
    }

    /// Set script arguments of the form `key=value`
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        for arg in args {
            if let Some((key, value)) = arg.split_once('=') {
                self.variables
                    .push((key.trim().to_string(), parse_arg_value(value)));
            }
        }
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Load and run a script file
    pub fn run_file(&self, path: &Path) -> Result<ScriptResult> {
        if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
            return Err(BlockError::config(format!(
                "Script file must have .{} extension: {}",
                SCRIPT_EXTENSION,
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        self.run_source(&content)
    }

    pub fn run_source(&self, source: &str) -> Result<ScriptResult> {
        let script = parse_script(source)?;
        self.run_script(&script)
    }

    /// Run a parsed script
    pub fn run_script(&self, script: &Script) -> Result<ScriptResult> {
        let env = Env::root();
        for (name, value) in &self.variables {
            env.assign(name, value.clone());
        }

        let host = self.vocabulary.host_object();
        let root = ScopeType::new(ROOT_SCOPE);
        let node = root.instantiate(
            Some(Parent::External(&host)),
            Some(script_body(script, env)),
        )?;

        info!(
            "running script ({} statements) against {}",
            script.statements.len(),
            self.vocabulary.host().name()
        );
        let value = node.execute()?;

        Ok(ScriptResult {
            value,
            statements: script.statements.len(),
        })
    }
}

/// Numbers and booleans are typed, everything else stays a string
fn parse_arg_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        Value::Int(n)
    } else if let Ok(n) = raw.parse::<f64>() {
        Value::Float(n)
    } else if raw.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else {
        Value::Str(raw.to_string())
    }
}

/// Outline a script without executing it
pub fn explain_script(script: &Script) -> Vec<String> {
    let mut lines = Vec::new();
    explain_statements(&script.statements, 0, &mut lines);
    lines
}

fn explain_statements(statements: &[Statement], depth: usize, lines: &mut Vec<String>) {
    let indent = "   ".repeat(depth);

    for (i, statement) in statements.iter().enumerate() {
        let expr = match statement {
            Statement::Assign { name, value } => {
                lines.push(format!("{}{}. {} = {}", indent, i + 1, name, describe(value)));
                value
            }
            Statement::Expr(expr) => {
                lines.push(format!("{}{}. {}", indent, i + 1, describe(expr)));
                expr
            }
        };

        if let Expr::Call(call) = expr {
            if let Some(block) = &call.block {
                explain_statements(block, depth + 1, lines);
            }
        }
    }
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => value.inspect(),
        Expr::List(items) => {
            let items: Vec<String> = items.iter().map(describe).collect();
            format!("[{}]", items.join(", "))
        }
        Expr::Negate(operand) => format!("-{}", describe(operand)),
        Expr::Binary { op, left, right } => {
            format!("{} {} {}", describe(left), op, describe(right))
        }
        Expr::Call(call) => {
            let mut text = call.name.clone();
            if call.parens {
                let args: Vec<String> = call.args.iter().map(describe).collect();
                text.push_str(&format!("({})", args.join(", ")));
            }
            if let Some(block) = &call.block {
                text.push_str(&format!(" {{ {} statements }}", block.len()));
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::VocabularyOptions;

    fn runner() -> ScriptRunner {
        ScriptRunner::new(Vocabulary::standard(&VocabularyOptions::default()).unwrap())
    }

    #[test]
    fn test_with_args() {
        let runner = runner().with_args(vec![
            "count=3".to_string(),
            "ratio=0.5".to_string(),
            "name=blocks".to_string(),
            "flag=true".to_string(),
            "ignored".to_string(),
        ]);
        assert_eq!(
            runner.variables,
            vec![
                ("count".to_string(), Value::Int(3)),
                ("ratio".to_string(), Value::Float(0.5)),
                ("name".to_string(), Value::from("blocks")),
                ("flag".to_string(), Value::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_args_become_variables() {
        let runner = runner().with_args(vec!["n=4".to_string()]);
        let result = runner.run_source("foo { show_foo(n) }").unwrap();
        assert_eq!(result.value, Value::from("foo*4"));
        assert_eq!(result.statements, 1);
    }

    #[test]
    fn test_top_level_cannot_reach_block_commands() {
        let err = runner().run_source("show_foo(1)").unwrap_err();
        assert!(err.is_unresolved_command());
        assert!(err.to_string().contains("#<script>"));
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let err = runner().run_file(Path::new("notes.txt")).unwrap_err();
        assert!(err.to_string().contains(".blk"));
    }

    #[test]
    fn test_explain_script() {
        let script = parse_script("foo { x = 1; bar { show_foo(x + 1) } }").unwrap();
        assert_eq!(
            explain_script(&script),
            vec![
                "1. foo { 2 statements }",
                "   1. x = 1",
                "   2. bar { 1 statements }",
                "      1. show_foo(x + 1)",
            ]
        );
    }
}
