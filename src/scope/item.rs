use crate::syntax::{NodeId, PrimitiveTypeKind};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// What an identifier resolves to at some position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ScopeItem {
    /// The implicit `_` of an `each` expression.
    Each { each_expression: NodeId },
    Parameter {
        node: NodeId,
        name: String,
        is_nullable: bool,
        is_optional: bool,
        maybe_type: Option<PrimitiveTypeKind>,
    },
    /// A `let` binding or record field.
    KeyValuePair {
        key: String,
        key_node: NodeId,
        maybe_value: Option<NodeId>,
        /// Bound under `@key`, visible only inside its own value.
        is_recursive: bool,
    },
    SectionMember {
        key: String,
        key_node: NodeId,
        maybe_value: Option<NodeId>,
        is_recursive: bool,
    },
    /// An identifier use with no definition, as dereferencing reports it. Never stored in
    /// a scope.
    Undefined { node: NodeId },
}

impl ScopeItem {
    /// The value expression a binding refers to, if it has one.
    pub fn maybe_value(&self) -> Option<NodeId> {
        match self {
            ScopeItem::KeyValuePair { maybe_value, .. }
            | ScopeItem::SectionMember { maybe_value, .. } => *maybe_value,
            ScopeItem::Each { .. } | ScopeItem::Parameter { .. } | ScopeItem::Undefined { .. } => {
                None
            }
        }
    }

    pub fn is_recursive(&self) -> bool {
        match self {
            ScopeItem::KeyValuePair { is_recursive, .. }
            | ScopeItem::SectionMember { is_recursive, .. } => *is_recursive,
            _ => false,
        }
    }

    pub fn is_each(&self) -> bool {
        matches!(self, ScopeItem::Each { .. })
    }
}

/// Scope of a single node: identifier to item, in insertion order.
pub type NodeScope = IndexMap<String, ScopeItem>;

pub type ScopeById = HashMap<NodeId, NodeScope>;
