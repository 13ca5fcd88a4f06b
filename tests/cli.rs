//! Command-line behaviour of the blockdsl binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn blockdsl() -> Command {
    let mut cmd = Command::cargo_bin("blockdsl").unwrap();
    cmd.env_remove("BLOCKDSL_VOCABULARY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn eval_prints_value() {
    blockdsl()
        .args(["eval", "foo { x = 1; bar { show_foo(x + 1) } }"])
        .assert()
        .success()
        .stdout("foo*2\n");
}

#[test]
fn isolated_eval_fails_with_unresolved_command() {
    blockdsl()
        .args(["--isolated", "eval", "foo { x = 1; bar { show_foo(x + 1) } }"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(
            "Error: undefined local variable or method `show_foo' for #<Bar>",
        ));
}

#[test]
fn eval_json_output() {
    blockdsl()
        .args(["eval", "[1, \"a\"]", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"value\""))
        .stdout(predicate::str::contains("\"statements\": 1"));
}

#[test]
fn run_script_file_with_args() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("demo.blk");
    fs::write(
        &script,
        "# nested blocks\nfoo {\n  bar { show_foo(n * 2) }\n}\n",
    )
    .unwrap();

    blockdsl()
        .arg("run")
        .arg(&script)
        .args(["--arg", "n=21"])
        .assert()
        .success()
        .stdout("foo*42\n");
}

#[test]
fn run_rejects_other_extensions() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("demo.txt");
    fs::write(&script, "1").unwrap();

    blockdsl()
        .arg("run")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".blk extension"));
}

#[test]
fn commands_lists_effective_set() {
    blockdsl()
        .args(["commands", "Bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands in Bar"))
        .stdout(predicate::str::contains("  show_foo\n"));

    blockdsl()
        .args(["--isolated", "commands", "Bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show_foo").not());
}

#[test]
fn commands_unknown_block() {
    blockdsl()
        .args(["commands", "Qux"])
        .assert()
        .failure()
        .stderr("Error: Configuration error: unknown block: Qux\n");
}

#[test]
fn custom_vocabulary_file() {
    let dir = TempDir::new().unwrap();
    let vocabulary = dir.path().join("doc.json");
    fs::write(
        &vocabulary,
        r###"{
            "host": "doc",
            "blocks": [
                { "name": "Section", "commands": [{ "name": "heading", "template": "## {0}" }] },
                { "name": "List", "commands": [{ "name": "item", "template": "- {args}" }] }
            ],
            "bindings": [
                { "source": "Section", "destination": "doc" },
                { "source": "List", "destination": "Section", "command_name": "items",
                  "propagate_parent_commands": true }
            ]
        }"###,
    )
    .unwrap();

    blockdsl()
        .arg("--vocabulary")
        .arg(&vocabulary)
        .args(["eval", r#"section { items { [heading("Intro"), item(1, 2)] } }"#])
        .assert()
        .success()
        .stdout("[\"## Intro\", \"- 1, 2\"]\n");
}

#[test]
fn explain_inline_source() {
    blockdsl()
        .args(["explain", "foo { bar { show_foo(1) } }"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Script: <inline>"))
        .stdout(predicate::str::contains("   1. bar { 1 statements }"));
}

#[test]
fn parse_errors_are_reported() {
    blockdsl()
        .args(["eval", "foo {"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: Parse error"));
}
