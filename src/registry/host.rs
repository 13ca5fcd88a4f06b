//! External objects: parents and bind destinations that are not scopes

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::engine::Call;
use crate::error::{BlockError, Result};
use crate::registry::MethodTable;
use crate::value::Value;

/// Something a scope can delegate to when it is not itself a scope.
///
/// `public_commands` is the object's callable surface. When the object is a
/// scope node's parent, every one of these names becomes reachable from the
/// node's body.
pub trait CommandTarget {
    /// Short description used in error messages, e.g. `#<main>`
    fn describe(&self) -> String;

    fn public_commands(&self) -> Vec<String>;

    fn responds_to(&self, name: &str) -> bool {
        self.public_commands().iter().any(|c| c == name)
    }

    fn invoke(&self, name: &str, call: Call) -> Result<Value>;
}

pub type HostHandler = Rc<dyn Fn(&HostObject, Call) -> Result<Value>>;

struct HostTypeInner {
    name: String,
    methods: RefCell<MethodTable<HostHandler>>,
}

/// A plain, non-scope type whose methods are its public surface.
///
/// Used for the top level of a host application: binding a scope type onto a
/// host type makes the block callable from any [`HostObject`] of that type.
#[derive(Clone)]
pub struct HostType {
    inner: Rc<HostTypeInner>,
}

impl HostType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(HostTypeInner {
                name: name.into(),
                methods: RefCell::new(MethodTable::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn define<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&HostObject, Call) -> Result<Value> + 'static,
    {
        let name = name.into();
        if self
            .inner
            .methods
            .borrow_mut()
            .define(name.clone(), Rc::new(handler))
        {
            debug!("{}: method `{}` redefined", self.name(), name);
        }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.borrow().contains(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.inner.methods.borrow().names()
    }

    pub(crate) fn handler(&self, name: &str) -> Option<HostHandler> {
        self.inner.methods.borrow().get(name)
    }

    pub fn instantiate(&self) -> HostObject {
        HostObject::new(self)
    }
}

impl std::fmt::Debug for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostType")
            .field("name", &self.inner.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// An instance of a [`HostType`]
#[derive(Debug, Clone)]
pub struct HostObject {
    ty: HostType,
}

impl HostObject {
    pub fn new(ty: &HostType) -> Self {
        Self { ty: ty.clone() }
    }

    pub fn host_type(&self) -> &HostType {
        &self.ty
    }

    /// Call one of the type's methods on this object
    pub fn call(&self, name: &str, call: Call) -> Result<Value> {
        match self.ty.handler(name) {
            Some(handler) => handler(self, call),
            None => Err(BlockError::delegation(name, self.describe())),
        }
    }
}

impl CommandTarget for HostObject {
    fn describe(&self) -> String {
        format!("#<{}>", self.ty.name())
    }

    fn public_commands(&self) -> Vec<String> {
        self.ty.method_names()
    }

    fn responds_to(&self, name: &str) -> bool {
        self.ty.has_method(name)
    }

    fn invoke(&self, name: &str, call: Call) -> Result<Value> {
        self.call(name, call)
    }
}
