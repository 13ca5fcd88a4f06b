//! Default command names derived from type names

use std::sync::LazyLock;

use regex::Regex;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"));
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// Canonical command name for a type name.
///
/// `FooBar` becomes `foo_bar`, `HTTPServer` becomes `http_server` and module
/// separators (`::`) become `/`.
pub fn command_name_for(type_name: &str) -> String {
    let name = type_name.replace("::", "/");
    let name = ACRONYM_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.replace('-', "_").to_lowercase()
}
