//! Installing scope types as commands on other types

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::{Call, Parent, ScopeNode};
use crate::registry::{command_name_for, HostObject, HostType, ScopeType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOptions {
    /// Let bodies of the bound block call the destination's commands
    #[serde(default)]
    pub propagate_parent_commands: bool,
    /// Installed name; derived from the source type's name when absent
    #[serde(default)]
    pub command_name: Option<String>,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn propagate(mut self, propagate: bool) -> Self {
        self.propagate_parent_commands = propagate;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.command_name = Some(name.into());
        self
    }
}

/// A type that can receive bound commands
pub trait BindTarget {
    fn target_name(&self) -> &str;

    /// Define `command_name` so that calling it runs a new `source` node
    fn install(&self, command_name: &str, source: &ScopeType, propagate: bool);
}

impl BindTarget for ScopeType {
    fn target_name(&self) -> &str {
        self.name()
    }

    fn install(&self, command_name: &str, source: &ScopeType, propagate: bool) {
        let source = source.clone();
        self.define(command_name, move |dest: &ScopeNode<'_>, call: Call| {
            let parent = propagate.then_some(Parent::Scope(dest));
            source.instantiate(parent, call.block)?.execute()
        });
        self.register([command_name]);
    }
}

impl BindTarget for HostType {
    fn target_name(&self) -> &str {
        self.name()
    }

    fn install(&self, command_name: &str, source: &ScopeType, propagate: bool) {
        let source = source.clone();
        self.define(command_name, move |host: &HostObject, call: Call| {
            let parent = propagate.then_some(Parent::External(host));
            source.instantiate(parent, call.block)?.execute()
        });
    }
}

/// Make `source` callable as a block command on `destination`.
///
/// Calling the command builds a new `source` node around the attached body
/// and executes it immediately. With `propagate_parent_commands` the node's
/// parent is the calling destination instance, so the body can reach the
/// destination's commands too.
///
/// Binding a second source under an existing name replaces the first one.
/// Returns the installed command name.
pub fn bind<D>(source: &ScopeType, destination: &D, options: BindOptions) -> String
where
    D: BindTarget + ?Sized,
{
    let command_name = options
        .command_name
        .unwrap_or_else(|| command_name_for(source.name()));
    debug!(
        "binding {} onto {} as `{}` (propagate: {})",
        source.name(),
        destination.target_name(),
        command_name,
        options.propagate_parent_commands
    );
    destination.install(&command_name, source, options.propagate_parent_commands);
    command_name
}
