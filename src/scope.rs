//! Identifiers visible at a node and what they are bound to.
mod filter;
mod item;
mod resolver;

pub use filter::filter_by_position;
pub use item::{NodeScope, ScopeById, ScopeItem};
pub use resolver::{resolve_scope, resolve_scope_into, ScopeInspector};
