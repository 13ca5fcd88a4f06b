//! Per-type registries: exposed command names and method tables
//!
//! All registration is expected to finish before the registered types are
//! executed. Nothing here is synchronized; the types are `!Send` and meant to
//! be configured once and then run on a single thread.

pub mod command_set;
pub mod host;
pub mod method_table;
pub mod naming;
pub mod scope_type;

pub use command_set::CommandSet;
pub use host::{CommandTarget, HostHandler, HostObject, HostType};
pub use method_table::MethodTable;
pub use naming::command_name_for;
pub use scope_type::{ScopeHandler, ScopeType};
