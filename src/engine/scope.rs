//! Scope nodes: one level of nested execution

use log::{debug, trace};

use crate::engine::{builtins, Body, Call, Sandbox};
use crate::error::{BlockError, Result};
use crate::registry::{CommandSet, CommandTarget, ScopeType};
use crate::value::Value;

/// The context a node was created in.
///
/// Always borrowed: a node never keeps its parent alive and a parent never
/// references its children.
#[derive(Clone, Copy)]
pub enum Parent<'p> {
    Scope(&'p ScopeNode<'p>),
    External(&'p dyn CommandTarget),
}

impl<'p> Parent<'p> {
    /// Names this parent contributes to a child's effective command set
    pub fn commands(&self) -> CommandSet {
        match self {
            Parent::Scope(node) => node.effective_commands(),
            Parent::External(target) => target.public_commands().into_iter().collect(),
        }
    }

    pub fn responds_to(&self, name: &str) -> bool {
        match self {
            Parent::Scope(node) => node.responds_to(name),
            Parent::External(target) => target.responds_to(name),
        }
    }

    pub fn invoke(&self, name: &str, call: Call) -> Result<Value> {
        match self {
            Parent::Scope(node) => node.call(name, call),
            Parent::External(target) => target.invoke(name, call),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Parent::Scope(node) => node.describe(),
            Parent::External(target) => target.describe(),
        }
    }
}

impl std::fmt::Debug for Parent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parent({})", self.describe())
    }
}

/// A runtime instance of a [`ScopeType`] wrapping one deferred body
pub struct ScopeNode<'p> {
    ty: ScopeType,
    parent: Option<Parent<'p>>,
    body: Body,
}

impl<'p> ScopeNode<'p> {
    /// Fails with a construction error when `body` is missing
    pub fn new(ty: &ScopeType, parent: Option<Parent<'p>>, body: Option<Body>) -> Result<Self> {
        let body = body.ok_or_else(BlockError::construction)?;
        debug!(
            "new {} node (parent: {})",
            ty.name(),
            parent.map_or_else(|| "none".to_string(), |p| p.describe())
        );
        Ok(Self {
            ty: ty.clone(),
            parent,
            body,
        })
    }

    pub fn scope_type(&self) -> &ScopeType {
        &self.ty
    }

    pub fn parent(&self) -> Option<Parent<'p>> {
        self.parent
    }

    /// The deferred body this node was built around
    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn describe(&self) -> String {
        format!("#<{}>", self.ty.name())
    }

    /// Every name a body running in this node may call.
    ///
    /// Own commands first, then whatever the parent contributes, then the
    /// builtins. Recomputed on every call so late registrations show up.
    pub fn effective_commands(&self) -> CommandSet {
        let mut commands = self.ty.commands();
        if let Some(parent) = &self.parent {
            commands.extend(parent.commands());
        }
        commands.extend(builtins::NAMES.iter().copied());
        trace!("{} effective commands: {}", self.describe(), commands);
        commands
    }

    /// Run the stored body inside a fresh sandbox
    pub fn execute(&self) -> Result<Value> {
        self.run_block(&self.body)
    }

    /// Run `block` in a fresh sandbox bound to this node
    pub fn run_block(&self, block: &Body) -> Result<Value> {
        debug!("executing body in {}", self.describe());
        let sandbox = Sandbox::new(self);
        block(&sandbox).map_err(BlockError::scrubbed)
    }

    /// Direct, unsandboxed dispatch.
    ///
    /// Tries the type's own methods, then the builtins, then the parent if it
    /// responds to `name`.
    pub fn call(&self, name: &str, call: Call) -> Result<Value> {
        if let Some(handler) = self.ty.handler(name) {
            return handler(self, call);
        }
        if builtins::is_builtin(name) {
            return builtins::invoke(self, name, call);
        }
        match self.parent {
            Some(parent) if parent.responds_to(name) => parent.invoke(name, call),
            _ => Err(BlockError::delegation(name, self.describe())),
        }
    }

    /// Shorthand for [`ScopeNode::call`] with positional arguments only
    pub fn call_with(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.call(name, Call::new(args))
    }

    pub fn responds_to(&self, name: &str) -> bool {
        self.ty.has_method(name)
            || builtins::is_builtin(name)
            || self.parent.is_some_and(|p| p.responds_to(name))
    }
}

impl std::fmt::Debug for ScopeNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeNode")
            .field("type", &self.ty.name())
            .field("parent", &self.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::engine::body;

    /// A minimal external object with a list-like surface
    struct Shelf {
        items: RefCell<Vec<Value>>,
    }

    impl CommandTarget for Shelf {
        fn describe(&self) -> String {
            "#<Shelf>".to_string()
        }

        fn public_commands(&self) -> Vec<String> {
            vec!["push".to_string(), "len".to_string(), "inspect".to_string()]
        }

        fn invoke(&self, name: &str, call: Call) -> Result<Value> {
            match name {
                "push" => {
                    self.items.borrow_mut().extend(call.args);
                    Ok(Value::Nil)
                }
                "len" => Ok(Value::Int(self.items.borrow().len() as i64)),
                _ => Err(BlockError::delegation(name, self.describe())),
            }
        }
    }

    fn shelf() -> Shelf {
        Shelf {
            items: RefCell::new(Vec::new()),
        }
    }

    fn noop() -> Option<Body> {
        Some(body(|_| Ok(Value::Nil)))
    }

    fn with_builtins(names: &[&str]) -> Vec<String> {
        names
            .iter()
            .chain(builtins::NAMES)
            .map(|s| s.to_string())
            .collect::<CommandSet>()
            .into_vec()
    }

    #[test]
    fn test_requires_body() {
        let err = ScopeNode::new(&ScopeType::new("Dsl1"), None, None).unwrap_err();
        assert!(err.is_construction());
        assert_eq!(err.to_string(), "block must be provided");
    }

    #[test]
    fn test_keeps_parent() {
        let target = shelf();
        let node = ScopeNode::new(&ScopeType::new("Dsl1"), Some(Parent::External(&target)), noop())
            .unwrap();
        assert_eq!(node.parent().map(|p| p.describe()), Some("#<Shelf>".to_string()));
    }

    #[test]
    fn test_effective_commands_without_parent() {
        let ty = ScopeType::new("Dsl1");
        ty.register(["foo", "bar"]);
        let node = ScopeNode::new(&ty, None, noop()).unwrap();

        assert_eq!(node.effective_commands().into_vec(), with_builtins(&["foo", "bar"]));
    }

    #[test]
    fn test_effective_commands_with_scope_parent() {
        let outer_ty = ScopeType::new("Dsl1");
        outer_ty.register(["foo", "bar"]);
        let inner_ty = ScopeType::new("Dsl2");
        inner_ty.register(["true_self", "foo"]);

        let outer = ScopeNode::new(&outer_ty, None, noop()).unwrap();
        let inner = ScopeNode::new(&inner_ty, Some(Parent::Scope(&outer)), noop()).unwrap();

        assert_eq!(
            inner.effective_commands().into_vec(),
            with_builtins(&["true_self", "foo", "bar"])
        );
    }

    #[test]
    fn test_effective_commands_recurse_through_grandparent() {
        let a = ScopeType::new("A");
        a.register(["a"]);
        let b = ScopeType::new("B");
        b.register(["b"]);
        let c = ScopeType::new("C");
        c.register(["c"]);

        let outer = ScopeNode::new(&a, None, noop()).unwrap();
        let middle = ScopeNode::new(&b, Some(Parent::Scope(&outer)), noop()).unwrap();
        let inner = ScopeNode::new(&c, Some(Parent::Scope(&middle)), noop()).unwrap();

        assert_eq!(inner.effective_commands().into_vec(), with_builtins(&["c", "b", "a"]));
    }

    #[test]
    fn test_effective_commands_with_external_parent() {
        let ty = ScopeType::new("Dsl1");
        ty.register(["foo"]);
        let target = shelf();
        let node = ScopeNode::new(&ty, Some(Parent::External(&target)), noop()).unwrap();

        assert_eq!(
            node.effective_commands().into_vec(),
            with_builtins(&["foo", "push", "len", "inspect"])
        );
    }

    #[test]
    fn test_effective_commands_are_not_cached() {
        let ty = ScopeType::new("Dsl1");
        let node = ScopeNode::new(&ty, None, noop()).unwrap();
        assert!(!node.effective_commands().contains("late"));

        ty.register(["late"]);
        assert!(node.effective_commands().contains("late"));
    }

    #[test]
    fn test_execute_returns_body_value() {
        let node = ScopeNode::new(
            &ScopeType::new("Dsl1"),
            None,
            Some(body(|_| Ok(Value::Int(3)))),
        )
        .unwrap();
        assert_eq!(node.execute().unwrap(), Value::Int(3));
    }

    #[test]
    fn test_exposes_stored_body() {
        let stored = body(|_| Ok(Value::from("stored")));
        let node = ScopeNode::new(&ScopeType::new("Dsl1"), None, Some(Rc::clone(&stored))).unwrap();

        assert!(Rc::ptr_eq(node.body(), &stored));
        assert_eq!(node.run_block(node.body()).unwrap(), Value::from("stored"));
    }

    #[test]
    fn test_rerun_executes_same_body_again() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let node = ScopeNode::new(
            &ScopeType::new("Dsl1"),
            None,
            Some(body(move |_| {
                counter.set(counter.get() + 1);
                Ok(Value::Int(counter.get()))
            })),
        )
        .unwrap();

        assert_eq!(node.execute().unwrap(), Value::Int(1));
        assert_eq!(node.execute().unwrap(), Value::Int(2));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_direct_call_relays_to_parent() {
        let target = shelf();
        let node = ScopeNode::new(&ScopeType::new("Dsl1"), Some(Parent::External(&target)), noop())
            .unwrap();

        assert!(node.responds_to("push"));
        node.call_with("push", vec![Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(node.call_with("len", vec![]).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_direct_call_without_parent_fails() {
        let node = ScopeNode::new(&ScopeType::new("Dsl1"), None, noop()).unwrap();

        assert!(!node.responds_to("push"));
        assert!(node.responds_to("inspect"));
        let err = node.call_with("push", vec![]).unwrap_err();
        assert!(err.is_delegation());
        assert_eq!(err.to_string(), "undefined method `push' for #<Dsl1>");
    }

    #[test]
    fn test_own_methods_shadow_parent() {
        let outer_ty = ScopeType::new("Outer");
        outer_ty.command("name", |_, _| Ok(Value::from("outer")));
        let inner_ty = ScopeType::new("Inner");
        inner_ty.command("name", |_, _| Ok(Value::from("inner")));

        let outer = ScopeNode::new(&outer_ty, None, noop()).unwrap();
        let inner = ScopeNode::new(&inner_ty, Some(Parent::Scope(&outer)), noop()).unwrap();

        assert_eq!(inner.call_with("name", vec![]).unwrap(), Value::from("inner"));
    }

    #[test]
    fn test_handler_can_run_attached_block() {
        let ty = ScopeType::new("Loop");
        ty.command("twice", |node, call| {
            let block = call.block.ok_or_else(BlockError::construction)?;
            node.run_block(&block)?;
            node.run_block(&block)
        });
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);

        let result = ty
            .run(body(move |sb| {
                let seen = Rc::clone(&seen);
                sb.call_with_block(
                    "twice",
                    vec![],
                    body(move |_| {
                        seen.set(seen.get() + 1);
                        Ok(Value::Int(seen.get()))
                    }),
                )
            }))
            .unwrap();

        assert_eq!(result, Value::Int(2));
        assert_eq!(hits.get(), 2);
    }
}
