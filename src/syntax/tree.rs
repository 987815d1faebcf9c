use super::{ConstantKind, LiteralKind, NodeKind, PrimitiveTypeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type NodeId = u32;

/// Content of a fully parsed node. Structural nodes have none; leaves carry their token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AstPayload {
    None,
    Constant(ConstantKind),
    Identifier(String),
    Literal { kind: LiteralKind, literal: String },
    PrimitiveType(PrimitiveTypeKind),
}

impl Default for AstPayload {
    fn default() -> Self {
        AstPayload::None
    }
}

/// A structurally complete node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub maybe_attribute_index: Option<u32>,
    #[serde(default)]
    pub payload: AstPayload,
}

impl AstNode {
    pub fn constant_kind(&self) -> Option<ConstantKind> {
        if let AstPayload::Constant(kind) = self.payload {
            Some(kind)
        } else {
            None
        }
    }

    pub fn identifier_literal(&self) -> Option<&str> {
        if let AstPayload::Identifier(ref literal) = self.payload {
            Some(literal.as_str())
        } else {
            None
        }
    }

    pub fn literal(&self) -> Option<(LiteralKind, &str)> {
        if let AstPayload::Literal { kind, ref literal } = self.payload {
            Some((kind, literal.as_str()))
        } else {
            None
        }
    }

    pub fn primitive_type_kind(&self) -> Option<PrimitiveTypeKind> {
        if let AstPayload::PrimitiveType(kind) = self.payload {
            Some(kind)
        } else {
            None
        }
    }
}

/// A construct the parser started but has not (or could not) finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub maybe_attribute_index: Option<u32>,
}

/// Either a resolved node or a context placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XorNode<'a> {
    Ast(&'a AstNode),
    Context(&'a ContextNode),
}

impl<'a> XorNode<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            XorNode::Ast(node) => node.id,
            XorNode::Context(node) => node.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            XorNode::Ast(node) => node.kind,
            XorNode::Context(node) => node.kind,
        }
    }

    pub fn maybe_attribute_index(&self) -> Option<u32> {
        match self {
            XorNode::Ast(node) => node.maybe_attribute_index,
            XorNode::Context(node) => node.maybe_attribute_index,
        }
    }

    pub fn ast(&self) -> Option<&'a AstNode> {
        if let XorNode::Ast(node) = self {
            Some(node)
        } else {
            None
        }
    }

    pub fn is_ast(&self) -> bool {
        self.ast().is_some()
    }

    pub fn is_context(&self) -> bool {
        !self.is_ast()
    }

    pub fn constant_kind(&self) -> Option<ConstantKind> {
        self.ast().and_then(AstNode::constant_kind)
    }

    pub fn identifier_literal(&self) -> Option<&'a str> {
        self.ast().and_then(AstNode::identifier_literal)
    }
}

impl fmt::Display for XorNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XorNode::Ast(node) => write!(f, "{}#{}", node.kind, node.id),
            XorNode::Context(node) => write!(f, "{}#{} (context)", node.kind, node.id),
        }
    }
}
