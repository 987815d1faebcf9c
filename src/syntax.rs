mod builder;
pub mod iter;
mod kind;
mod node_id_map;
mod signature;
mod tree;

pub use builder::NodeIdMapBuilder;
pub use kind::*;
pub use node_id_map::NodeIdMap;
pub use signature::{FunctionSignature, ParameterSignature};
pub use tree::*;
