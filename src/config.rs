//! Execution settings shared by the CLI subcommands

use std::path::PathBuf;

use log::debug;

use crate::error::Result;
use crate::output::OutputFormat;
use crate::vocabulary::{Vocabulary, VocabularyConfig, VocabularyOptions};

/// Execution settings
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub output_format: OutputFormat,
    pub verbose: bool,
    /// Build the vocabulary with parent-command propagation switched off
    pub isolated: bool,
    /// Vocabulary file; the standard Foo/Bar/Baz vocabulary when absent
    pub vocabulary: Option<PathBuf>,
}

impl ExecutionContext {
    pub fn vocabulary_options(&self) -> VocabularyOptions {
        VocabularyOptions {
            isolated: self.isolated,
        }
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        let config = match &self.vocabulary {
            Some(path) => {
                debug!("loading vocabulary from {}", path.display());
                VocabularyConfig::load(path)?
            }
            None => VocabularyConfig::standard(),
        };
        Vocabulary::build(&config, &self.vocabulary_options())
    }
}
