//! Vocabulary configuration loaded from JSON

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::engine::BindOptions;
use crate::error::{BlockError, Result};
use crate::value::Value;

/// Name of the host type when a config does not give one
pub const DEFAULT_HOST: &str = "main";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Block types, their commands, and how they nest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// A command whose result is its template with the call's arguments filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,
    pub template: String,
    /// Unexposed commands are callable directly but never from a body
    #[serde(default = "default_expose")]
    pub expose: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub options: BindOptions,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_expose() -> bool {
    true
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            blocks: Vec::new(),
            bindings: Vec::new(),
        }
    }
}

impl VocabularyConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| BlockError::config(format!("invalid vocabulary: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Foo, Bar and Baz nested under `main`.
    ///
    /// `bar` propagates, so a body inside `bar` can still call `show_foo`.
    pub fn standard() -> Self {
        let block = |name: &str, command: &str, template: &str| BlockConfig {
            name: name.to_string(),
            commands: vec![CommandConfig {
                name: command.to_string(),
                template: template.to_string(),
                expose: true,
            }],
        };
        let binding = |source: &str, destination: &str, name: &str, propagate: bool| BindingConfig {
            source: source.to_string(),
            destination: destination.to_string(),
            options: BindOptions::new().named(name).propagate(propagate),
        };

        Self {
            host: default_host(),
            blocks: vec![
                block("Foo", "show_foo", "foo*{0}"),
                block("Bar", "show_bar", "bar*{0}"),
                block("Baz", "show_baz", "baz*{0}"),
            ],
            bindings: vec![
                binding("Baz", "Bar", "baz", false),
                binding("Bar", "Foo", "bar", true),
                binding("Foo", DEFAULT_HOST, "foo", false),
            ],
        }
    }
}

/// Fill `{0}`, `{1}`, ... with positional arguments and `{args}` with all of them.
///
/// Missing arguments render as nothing; unknown placeholders are left alone.
pub fn render_template(template: &str, args: &[Value]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            if key == "args" {
                let all: Vec<String> = args.iter().map(Value::to_string).collect();
                return all.join(", ");
            }
            match key.parse::<usize>() {
                Ok(index) => args.get(index).map(Value::to_string).unwrap_or_default(),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}
