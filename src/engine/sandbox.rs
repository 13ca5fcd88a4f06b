//! Allow-listed execution surface handed to deferred bodies

use log::debug;

use crate::engine::{Body, Call, ScopeNode};
use crate::error::{BlockError, Result};
use crate::registry::CommandSet;
use crate::value::Value;

/// What a running body sees of the world.
///
/// Every name goes through one decision: if the owning node's effective
/// command set contains it the call is forwarded to the node, otherwise it
/// fails with an unresolved-command error. The sandbox offers no access to
/// the node itself.
pub struct Sandbox<'a> {
    node: &'a ScopeNode<'a>,
}

impl<'a> Sandbox<'a> {
    pub(crate) fn new(node: &'a ScopeNode<'a>) -> Self {
        Self { node }
    }

    /// Call `name` with positional arguments
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.invoke(name, Call::new(args))
    }

    /// Call `name` with positional arguments and an attached body
    pub fn call_with_block(&self, name: &str, args: Vec<Value>, block: Body) -> Result<Value> {
        self.invoke(name, Call::new(args).with_block(block))
    }

    pub fn invoke(&self, name: &str, call: Call) -> Result<Value> {
        if !self.node.effective_commands().contains(name) {
            debug!("rejected `{}` in {}", name, self.node.describe());
            return Err(BlockError::unresolved(name, self.node.describe()).scrubbed());
        }

        debug!("forwarding `{}` to {}", name, self.node.describe());
        self.node.call(name, call).map_err(BlockError::scrubbed)
    }

    /// Whether `name` would get past this sandbox
    pub fn can_call(&self, name: &str) -> bool {
        self.node.effective_commands().contains(name)
    }

    /// Names reachable from here
    pub fn commands(&self) -> CommandSet {
        self.node.effective_commands()
    }
}
