//! Human-readable output formatting

use crate::output::Report;

pub fn format_human(report: &Report) -> String {
    match report {
        Report::Value { value, .. } => value.to_string(),
        Report::Commands { block, commands } => {
            let title = format!("Commands in {}", block);
            let mut output = format!("{}\n{}\n", title, "-".repeat(title.len()));
            for name in commands {
                output.push_str(&format!("  {}\n", name));
            }
            output.truncate(output.trim_end().len());
            output
        }
        Report::Explanation { source, lines } => {
            let mut output = format!("Script: {}\nStatements: {}\n", source, top_level(lines));
            if !lines.is_empty() {
                output.push('\n');
                output.push_str(&lines.join("\n"));
            }
            output
        }
    }
}

fn top_level(lines: &[String]) -> usize {
    lines.iter().filter(|l| !l.starts_with(' ')).count()
}
