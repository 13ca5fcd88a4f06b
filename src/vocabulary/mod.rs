//! Vocabularies: a host type plus the block types bound onto it
//!
//! A [`Vocabulary`] is built once from a [`VocabularyConfig`] and then used to
//! run any number of scripts.

pub mod config;

pub use config::{render_template, BindingConfig, BlockConfig, CommandConfig, VocabularyConfig};

use log::{debug, info};

use crate::engine::{bind, body, Call, Parent, ScopeNode};
use crate::error::{BlockError, Result};
use crate::registry::{CommandSet, HostObject, HostType, ScopeType};
use crate::value::Value;

/// Switches applied while building a vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VocabularyOptions {
    /// Ignore `propagate_parent_commands` so every block sees only its own commands
    pub isolated: bool,
}

#[derive(Debug, Clone)]
struct Binding {
    source: String,
    destination: String,
    command_name: String,
    propagate: bool,
}

#[derive(Debug)]
pub struct Vocabulary {
    host: HostType,
    blocks: Vec<ScopeType>,
    bindings: Vec<Binding>,
}

impl Vocabulary {
    pub fn build(config: &VocabularyConfig, options: &VocabularyOptions) -> Result<Self> {
        let host = HostType::new(config.host.as_str());
        let mut blocks: Vec<ScopeType> = Vec::with_capacity(config.blocks.len());

        for block in &config.blocks {
            if block.name == config.host || blocks.iter().any(|b| b.name() == block.name) {
                return Err(BlockError::config(format!(
                    "duplicate block name: {}",
                    block.name
                )));
            }

            let ty = ScopeType::new(block.name.as_str());
            for command in &block.commands {
                let template = command.template.clone();
                let handler = move |_: &ScopeNode<'_>, call: Call| -> Result<Value> {
                    Ok(Value::Str(render_template(&template, &call.args)))
                };
                if command.expose {
                    ty.command(command.name.as_str(), handler);
                } else {
                    ty.define(command.name.as_str(), handler);
                }
            }
            blocks.push(ty);
        }

        let mut vocabulary = Self {
            host,
            blocks,
            bindings: Vec::with_capacity(config.bindings.len()),
        };

        for binding in &config.bindings {
            let source = vocabulary.require_block(&binding.source)?.clone();
            let mut bind_options = binding.options.clone();
            if options.isolated {
                bind_options.propagate_parent_commands = false;
            }
            let propagate = bind_options.propagate_parent_commands;

            let command_name = if binding.destination == vocabulary.host.name() {
                bind(&source, &vocabulary.host, bind_options)
            } else {
                let destination = vocabulary.require_block(&binding.destination)?;
                bind(&source, destination, bind_options)
            };

            vocabulary.bindings.push(Binding {
                source: binding.source.clone(),
                destination: binding.destination.clone(),
                command_name,
                propagate,
            });
        }

        info!(
            "built vocabulary on {} ({} blocks, {} bindings{})",
            vocabulary.host.name(),
            vocabulary.blocks.len(),
            vocabulary.bindings.len(),
            if options.isolated { ", isolated" } else { "" }
        );
        Ok(vocabulary)
    }

    /// The Foo/Bar/Baz vocabulary
    pub fn standard(options: &VocabularyOptions) -> Result<Self> {
        Self::build(&VocabularyConfig::standard(), options)
    }

    pub fn host(&self) -> &HostType {
        &self.host
    }

    /// A fresh instance of the host type for one run
    pub fn host_object(&self) -> HostObject {
        self.host.instantiate()
    }

    pub fn block(&self, name: &str) -> Option<&ScopeType> {
        self.blocks.iter().find(|b| b.name() == name)
    }

    pub fn blocks(&self) -> &[ScopeType] {
        &self.blocks
    }

    /// Command installed for `source` on `destination`, if any
    pub fn command_name(&self, source: &str, destination: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.source == source && b.destination == destination)
            .map(|b| b.command_name.as_str())
    }

    fn require_block(&self, name: &str) -> Result<&ScopeType> {
        self.block(name)
            .ok_or_else(|| BlockError::config(format!("unknown block: {}", name)))
    }

    /// Commands a body sees inside `block` when reached from the host.
    ///
    /// Follows the first binding of each block outward until it lands on the
    /// host, builds that chain of nodes and asks the innermost one.
    pub fn effective_commands_for(&self, block: &str) -> Result<CommandSet> {
        // innermost first; the flag says whether the node's parent is the next link
        let mut chain: Vec<(ScopeType, bool)> = Vec::new();
        let mut reaches_host = false;
        let mut current = self.require_block(block)?.clone();

        loop {
            if chain.iter().any(|(ty, _)| ty.same_type(&current)) {
                return Err(BlockError::config(format!(
                    "bindings of {} form a cycle",
                    current.name()
                )));
            }

            let Some(binding) = self.bindings.iter().find(|b| b.source == current.name()) else {
                chain.push((current, false));
                break;
            };
            chain.push((current, binding.propagate));

            if binding.destination == self.host.name() {
                reaches_host = true;
                break;
            }
            current = self.require_block(&binding.destination)?.clone();
        }

        chain.reverse();
        debug!(
            "nesting chain for {}: {}",
            block,
            chain
                .iter()
                .map(|(ty, _)| ty.name())
                .collect::<Vec<_>>()
                .join(" > ")
        );

        let host = self.host_object();
        let parent = match chain.first() {
            Some((_, true)) if reaches_host => Some(Parent::External(&host)),
            _ => None,
        };
        effective_in(&chain, parent)
    }
}

fn effective_in(chain: &[(ScopeType, bool)], parent: Option<Parent<'_>>) -> Result<CommandSet> {
    let Some(((ty, _), rest)) = chain.split_first() else {
        return Ok(CommandSet::new());
    };
    let node = ty.instantiate(parent, Some(body(|_| Ok(Value::Nil))))?;

    match rest.first() {
        None => Ok(node.effective_commands()),
        Some((_, propagate)) => effective_in(rest, propagate.then_some(Parent::Scope(&node))),
    }
}
