//! Output formatting

use serde::Serialize;

use crate::output::human::format_human;
use crate::output::json::format_json;
use crate::registry::CommandSet;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Everything the CLI prints on success
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// Result of running a script
    Value { value: Value, statements: usize },
    /// Effective command set inside a block
    Commands { block: String, commands: CommandSet },
    /// Statement outline of a script
    Explanation { source: String, lines: Vec<String> },
}

pub fn format_output(report: &Report, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
