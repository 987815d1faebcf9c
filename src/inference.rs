//! Static type inference over the node graph.
pub mod bin_op;
mod dereference;
mod evaluator;
mod expected;
pub mod union;
mod widest;

pub use evaluator::{infer_type, InferenceState, InspectionCache, TypeById};
pub use expected::expected_type;
pub use widest::widest_type;
