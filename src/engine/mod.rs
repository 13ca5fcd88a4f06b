//! Execution engine: scope nodes, sandboxes and the binder

pub mod binder;
pub mod builtins;
pub mod call;
pub mod sandbox;
pub mod scope;
pub mod trace;

pub use binder::{bind, BindOptions, BindTarget};
pub use call::{body, Body, Call};
pub use sandbox::Sandbox;
pub use scope::{Parent, ScopeNode};
pub use trace::{Frame, Trace};
