#![deny(nonstandard_style, rust_2018_idioms)]
#![warn(unused)]

//! Scope resolution and type inference for Power Query M node graphs, as produced by
//! an error-tolerant parser.

pub mod cli;
pub mod errors;
pub mod inference;
pub mod scope;
pub mod settings;
pub mod syntax;
pub mod types;

pub use errors::{InspectionError, InspectionErrorKind};
pub use inference::{expected_type, infer_type, widest_type, InspectionCache, TypeById};
pub use scope::{filter_by_position, resolve_scope, resolve_scope_into, ScopeById, ScopeItem};
pub use settings::{CancellationFlag, CancellationToken, InspectionSettings};
pub use types::{Type, TypeKind};
