//! Deferred bodies and call payloads

use std::rc::Rc;

use crate::engine::Sandbox;
use crate::error::Result;
use crate::value::Value;

/// A deferred, zero-argument computation run inside a [`Sandbox`].
///
/// The sandbox is the body's only handle on the outside world.
pub type Body = Rc<dyn Fn(&Sandbox<'_>) -> Result<Value>>;

/// Wrap a closure as a [`Body`]
pub fn body<F>(f: F) -> Body
where
    F: Fn(&Sandbox<'_>) -> Result<Value> + 'static,
{
    Rc::new(f)
}

/// Arguments of one command invocation plus an optional attached body
#[derive(Clone, Default)]
pub struct Call {
    pub args: Vec<Value>,
    pub block: Option<Body>,
}

impl Call {
    pub fn new(args: Vec<Value>) -> Self {
        Self { args, block: None }
    }

    pub fn with_block(mut self, block: Body) -> Self {
        self.block = Some(block);
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Positional argument, or `nil` when missing
    pub fn arg_or_nil(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}

impl std::fmt::Debug for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Call")
            .field("args", &self.args)
            .field("block", &self.block.is_some())
            .finish()
    }
}
