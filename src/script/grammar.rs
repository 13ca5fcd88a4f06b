//! Pest grammar parser for block scripts

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{BlockError, Result};
use crate::script::ast::*;
use crate::value::Value;

#[derive(Parser)]
#[grammar = "../grammar/blocks.pest"]
pub struct BlockParser;

/// Parse script source into an AST
pub fn parse_script(input: &str) -> Result<Script> {
    let pair = BlockParser::parse(Rule::script, input)
        .map_err(|e| BlockError::parse(e.to_string()))?
        .next()
        .ok_or_else(|| BlockError::parse("Empty script"))?;

    let statements = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::statements)
        .ok_or_else(|| BlockError::parse("Expected statements"))?;

    Ok(Script {
        statements: parse_statements(statements)?,
    })
}

fn parse_statements(pair: Pair<Rule>) -> Result<Vec<Statement>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::statement)
        .map(parse_statement)
        .collect()
}

fn parse_statement(pair: Pair<Rule>) -> Result<Statement> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| BlockError::parse("Expected statement content"))?;

    match inner.as_rule() {
        Rule::assignment => {
            let mut parts = inner.into_inner();
            let name = parts
                .next()
                .ok_or_else(|| BlockError::parse("Expected variable name"))?
                .as_str()
                .to_string();
            let value = parts
                .next()
                .ok_or_else(|| BlockError::parse(format!("Expected value for `{}`", name)))?;
            Ok(Statement::Assign {
                name,
                value: parse_expr(value)?,
            })
        }
        Rule::expr => Ok(Statement::Expr(parse_expr(inner)?)),
        rule => Err(BlockError::parse(format!(
            "Unexpected rule in statement: {:?}",
            rule
        ))),
    }
}

fn parse_expr(pair: Pair<Rule>) -> Result<Expr> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| BlockError::parse("Expected expression"))?;
    let mut left = parse_term(first)?;

    while let Some(op) = inner.next() {
        let right = inner
            .next()
            .ok_or_else(|| BlockError::parse(format!("Expected operand after `{}`", op.as_str())))?;
        left = Expr::Binary {
            op: parse_op(&op)?,
            left: Box::new(left),
            right: Box::new(parse_term(right)?),
        };
    }

    Ok(left)
}

fn parse_term(pair: Pair<Rule>) -> Result<Expr> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| BlockError::parse("Expected operand"))?;
    let mut left = parse_unary(first)?;

    while let Some(op) = inner.next() {
        let right = inner
            .next()
            .ok_or_else(|| BlockError::parse(format!("Expected operand after `{}`", op.as_str())))?;
        left = Expr::Binary {
            op: parse_op(&op)?,
            left: Box::new(left),
            right: Box::new(parse_unary(right)?),
        };
    }

    Ok(left)
}

fn parse_op(pair: &Pair<Rule>) -> Result<BinaryOp> {
    match pair.as_str() {
        "+" => Ok(BinaryOp::Add),
        "-" => Ok(BinaryOp::Sub),
        "*" => Ok(BinaryOp::Mul),
        "/" => Ok(BinaryOp::Div),
        "%" => Ok(BinaryOp::Rem),
        other => Err(BlockError::parse(format!("Unknown operator: {}", other))),
    }
}

fn parse_unary(pair: Pair<Rule>) -> Result<Expr> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| BlockError::parse("Expected operand"))?;

    if first.as_rule() == Rule::negate {
        let operand = inner
            .next()
            .ok_or_else(|| BlockError::parse("Expected operand after `-`"))?;
        return Ok(Expr::Negate(Box::new(parse_unary(operand)?)));
    }

    parse_atom(first)
}

fn parse_atom(pair: Pair<Rule>) -> Result<Expr> {
    match pair.as_rule() {
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(|n| Expr::Literal(Value::Int(n)))
            .map_err(|_| BlockError::parse(format!("Integer out of range: {}", pair.as_str()))),
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(|n| Expr::Literal(Value::Float(n)))
            .map_err(|e| BlockError::parse(format!("Invalid number {}: {}", pair.as_str(), e))),
        Rule::string => {
            let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Expr::Literal(Value::Str(unescape(raw))))
        }
        Rule::boolean => Ok(Expr::Literal(Value::Bool(pair.as_str() == "true"))),
        Rule::nil => Ok(Expr::Literal(Value::Nil)),
        Rule::list => Ok(Expr::List(
            pair.into_inner().map(parse_expr).collect::<Result<_>>()?,
        )),
        Rule::expr => parse_expr(pair),
        Rule::call => Ok(Expr::Call(parse_call(pair)?)),
        rule => Err(BlockError::parse(format!(
            "Unexpected rule in expression: {:?}",
            rule
        ))),
    }
}

fn parse_call(pair: Pair<Rule>) -> Result<CallExpr> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .ok_or_else(|| BlockError::parse("Expected command name"))?
        .as_str()
        .to_string();

    let mut call = CallExpr {
        name,
        args: Vec::new(),
        parens: false,
        block: None,
    };

    for part in inner {
        match part.as_rule() {
            Rule::arguments => {
                call.parens = true;
                call.args = part.into_inner().map(parse_expr).collect::<Result<_>>()?;
            }
            Rule::block => {
                let statements = part
                    .into_inner()
                    .next()
                    .ok_or_else(|| BlockError::parse("Expected block body"))?;
                call.block = Some(parse_statements(statements)?);
            }
            rule => {
                return Err(BlockError::parse(format!(
                    "Unexpected rule in call: {:?}",
                    rule
                )))
            }
        }
    }

    Ok(call)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Expr>, block: Option<Vec<Statement>>) -> Expr {
        Expr::Call(CallExpr {
            name: name.to_string(),
            parens: !args.is_empty(),
            args,
            block,
        })
    }

    fn bare(name: &str) -> Expr {
        call(name, vec![], None)
    }

    #[test]
    fn test_parse_nested_blocks() {
        let script = parse_script("foo { x = 1; bar { show_foo(x + 1) } }").unwrap();

        let inner = Statement::Expr(call(
            "show_foo",
            vec![Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(bare("x")),
                right: Box::new(Expr::Literal(Value::Int(1))),
            }],
            None,
        ));
        let expected = Script {
            statements: vec![Statement::Expr(call(
                "foo",
                vec![],
                Some(vec![
                    Statement::Assign {
                        name: "x".to_string(),
                        value: Expr::Literal(Value::Int(1)),
                    },
                    Statement::Expr(call("bar", vec![], Some(vec![inner]))),
                ]),
            ))],
        };

        assert_eq!(script, expected);
    }

    #[test]
    fn test_newlines_separate_statements() {
        let script = parse_script("x = 1\ny = 2\n# comment\nshow(x)").unwrap();
        assert_eq!(script.statements.len(), 3);
    }

    #[test]
    fn test_precedence() {
        let script = parse_script("1 + 2 * 3").unwrap();
        let Statement::Expr(Expr::Binary { op, right, .. }) = &script.statements[0] else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_literals() {
        let script = parse_script(r#"[1, 2.5, "a\"b", true, nil, -3]"#).unwrap();
        let Statement::Expr(Expr::List(items)) = &script.statements[0] else {
            panic!("expected list");
        };
        assert_eq!(items[0], Expr::Literal(Value::Int(1)));
        assert_eq!(items[1], Expr::Literal(Value::Float(2.5)));
        assert_eq!(items[2], Expr::Literal(Value::from("a\"b")));
        assert_eq!(items[3], Expr::Literal(Value::Bool(true)));
        assert_eq!(items[4], Expr::Literal(Value::Nil));
        assert_eq!(
            items[5],
            Expr::Negate(Box::new(Expr::Literal(Value::Int(3))))
        );
    }

    #[test]
    fn test_empty_parens_mark_call() {
        let script = parse_script("ping()").unwrap();
        let Statement::Expr(Expr::Call(call)) = &script.statements[0] else {
            panic!("expected call");
        };
        assert!(call.parens);
        assert!(!call.is_bare());
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        let script = parse_script("nilly = true").unwrap();
        assert!(matches!(&script.statements[0], Statement::Assign { name, .. } if name == "nilly"));
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().statements.is_empty());
        assert!(parse_script(" ; ;\n").unwrap().statements.is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_script("foo {").unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::Parse(_)));
    }
}
