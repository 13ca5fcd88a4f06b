//! blockdsl - nestable command blocks with sandboxed command resolution
//!
//! A [`ScopeType`] names a kind of block and keeps the list of commands a body
//! running inside it may call. [`bind`] installs one block type as a command
//! on another (or on a [`HostType`]), so blocks nest. Every body runs in a
//! [`Sandbox`] that rejects names outside the executing node's effective
//! command set before anything is dispatched.
//!
//! # Example
//!
//! ```
//! use blockdsl::{bind, body, BindOptions, HostType, ScopeType, Value};
//!
//! let foo = ScopeType::new("Foo");
//! foo.command("show_foo", |_, call| Ok(Value::from(format!("foo*{}", call.args[0]))));
//!
//! let main = HostType::new("main");
//! bind(&foo, &main, BindOptions::new());
//!
//! let host = main.instantiate();
//! let result = host
//!     .call(
//!         "foo",
//!         blockdsl::Call::default().with_block(body(|sb| sb.call("show_foo", vec![Value::Int(2)]))),
//!     )
//!     .unwrap();
//! assert_eq!(result, Value::from("foo*2"));
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod registry;
pub mod script;
pub mod value;
pub mod vocabulary;

pub use config::ExecutionContext;
pub use engine::{bind, body, BindOptions, BindTarget, Body, Call, Parent, Sandbox, ScopeNode};
pub use error::{BlockError, ErrorKind, Result};
pub use output::{format_output, OutputFormat, Report};
pub use registry::{command_name_for, CommandSet, CommandTarget, HostObject, HostType, ScopeType};
pub use script::{explain_script, parse_script, Script, ScriptResult, ScriptRunner};
pub use value::Value;
pub use vocabulary::{Vocabulary, VocabularyConfig, VocabularyOptions};
