//! Script front-end
//!
//! Parses a small block language and compiles it into bodies the engine can
//! run. Handles loading, explaining and executing .blk script files.

pub mod ast;
pub mod eval;
pub mod grammar;
pub mod runner;

pub use ast::*;
pub use grammar::parse_script;
pub use runner::{explain_script, ScriptResult, ScriptRunner};
