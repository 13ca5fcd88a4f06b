//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ExecutionContext;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "blockdsl")]
#[command(author, version, about = "Run nested command blocks with sandboxed command resolution", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable parent-command propagation for every binding
    #[arg(long, global = true)]
    pub isolated: bool,

    /// Vocabulary file (JSON); defaults to the built-in Foo/Bar/Baz vocabulary
    #[arg(long, global = true, value_name = "FILE", env = "BLOCKDSL_VOCABULARY")]
    pub vocabulary: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Run a block script file (.blk)
    Run {
        /// Path to the .blk script file
        file: PathBuf,

        /// Script arguments in the form key=value
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },

    /// Evaluate inline script source
    Eval {
        /// Script source
        source: String,
    },

    /// List the commands callable inside a block
    Commands {
        /// Block type name
        block: String,
    },

    /// Explain a script without executing it
    Explain {
        /// Script source or path to a .blk file
        input: String,
    },
}

impl Args {
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext {
            output_format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
            verbose: self.verbose,
            isolated: self.isolated,
            vocabulary: self.vocabulary.clone(),
        }
    }
}
