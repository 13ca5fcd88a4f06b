//! Scope types: the configuration shared by every node of one kind of block

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::engine::{Body, Call, Parent, ScopeNode};
use crate::error::Result;
use crate::registry::{CommandSet, MethodTable};
use crate::value::Value;

/// Handler behind a scope type method. Receives the node it runs on.
pub type ScopeHandler = Rc<dyn Fn(&ScopeNode<'_>, Call) -> Result<Value>>;

#[derive(Default)]
struct Registry {
    commands: CommandSet,
    methods: MethodTable<ScopeHandler>,
}

struct ScopeTypeInner {
    name: String,
    registry: RefCell<Registry>,
}

/// One kind of block.
///
/// Holds the names the block exposes to bodies running inside it (its
/// [`CommandSet`]) and the methods its nodes implement. A method that is not
/// registered as a command is only reachable through direct calls on a node,
/// never from inside a sandboxed body.
///
/// Clones share the same registry.
#[derive(Clone)]
pub struct ScopeType {
    inner: Rc<ScopeTypeInner>,
}

impl ScopeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ScopeTypeInner {
                name: name.into(),
                registry: RefCell::new(Registry::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Expose `names` as commands and return the updated set
    pub fn register<I, S>(&self, names: I) -> CommandSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = self.inner.registry.borrow_mut();
        registry.commands.extend(names);
        registry.commands.clone()
    }

    /// Declared commands, in registration order
    pub fn commands(&self) -> CommandSet {
        self.inner.registry.borrow().commands.clone()
    }

    /// Define a method without exposing it
    pub fn define<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ScopeNode<'_>, Call) -> Result<Value> + 'static,
    {
        let name = name.into();
        let replaced = self
            .inner
            .registry
            .borrow_mut()
            .methods
            .define(name.clone(), Rc::new(handler));
        if replaced {
            debug!("{}: method `{}` redefined", self.name(), name);
        }
    }

    /// Define a method and expose it as a command
    pub fn command<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ScopeNode<'_>, Call) -> Result<Value> + 'static,
    {
        let name = name.into();
        self.define(name.clone(), handler);
        self.register([name]);
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.registry.borrow().methods.contains(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.inner.registry.borrow().methods.names()
    }

    pub(crate) fn handler(&self, name: &str) -> Option<ScopeHandler> {
        self.inner.registry.borrow().methods.get(name)
    }

    pub fn same_type(&self, other: &ScopeType) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Build a node of this type
    pub fn instantiate<'p>(
        &self,
        parent: Option<Parent<'p>>,
        body: Option<Body>,
    ) -> Result<ScopeNode<'p>> {
        ScopeNode::new(self, parent, body)
    }

    /// Build a parentless node around `body` and execute it
    pub fn run(&self, body: Body) -> Result<Value> {
        ScopeNode::new(self, None, Some(body))?.execute()
    }
}

impl std::fmt::Debug for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.borrow();
        f.debug_struct("ScopeType")
            .field("name", &self.inner.name)
            .field("commands", &registry.commands)
            .field("methods", &registry.methods.names())
            .finish()
    }
}
