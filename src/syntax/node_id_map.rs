use super::{AstNode, ContextNode, NodeId, NodeKind, XorNode};
use crate::errors::InspectionError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node graph produced by the parser: nodes by id plus parent/child edges.
///
/// The inspection engine never mutates it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeIdMap {
    ast_node_by_id: HashMap<NodeId, AstNode>,
    context_node_by_id: HashMap<NodeId, ContextNode>,
    parent_id_by_id: HashMap<NodeId, NodeId>,
    child_ids_by_id: HashMap<NodeId, Vec<NodeId>>,
    leaf_node_ids: HashSet<NodeId>,
}

impl NodeIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    // -- mutation (parser side)

    pub fn insert_ast(&mut self, node: AstNode) {
        self.context_node_by_id.remove(&node.id);
        self.ast_node_by_id.insert(node.id, node);
    }

    pub fn insert_context(&mut self, node: ContextNode) {
        self.context_node_by_id.insert(node.id, node);
    }

    /// Links `child_id` under `parent_id`, keeping children ordered by attribute index.
    pub fn link(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.parent_id_by_id.insert(child_id, parent_id);

        let attribute_index = |id: &NodeId| {
            self.ast_node_by_id
                .get(id)
                .map(|n| n.maybe_attribute_index)
                .or_else(|| {
                    self.context_node_by_id
                        .get(id)
                        .map(|n| n.maybe_attribute_index)
                })
                .flatten()
        };
        let child_index = attribute_index(&child_id);
        let children = self.child_ids_by_id.get(&parent_id).cloned().unwrap_or_default();
        let position = children
            .iter()
            .position(|id| attribute_index(id) > child_index)
            .unwrap_or_else(|| children.len());
        let mut children = children;

        children.insert(position, child_id);
        self.child_ids_by_id.insert(parent_id, children);
    }

    /// Places a node in its parent's attribute slot. Call before `link`.
    pub fn set_attribute_index(&mut self, node_id: NodeId, attribute_index: u32) {
        if let Some(node) = self.ast_node_by_id.get_mut(&node_id) {
            node.maybe_attribute_index = Some(attribute_index);
        } else if let Some(node) = self.context_node_by_id.get_mut(&node_id) {
            node.maybe_attribute_index = Some(attribute_index);
        }
    }

    pub fn mark_leaf(&mut self, node_id: NodeId) {
        self.leaf_node_ids.insert(node_id);
    }

    // -- accessors

    pub fn len(&self) -> usize {
        self.ast_node_by_id.len() + self.context_node_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn xor(&self, node_id: NodeId) -> Option<XorNode<'_>> {
        if let Some(node) = self.ast_node_by_id.get(&node_id) {
            Some(XorNode::Ast(node))
        } else {
            self.context_node_by_id.get(&node_id).map(XorNode::Context)
        }
    }

    pub fn expect_xor(&self, node_id: NodeId) -> Result<XorNode<'_>, InspectionError> {
        self.xor(node_id)
            .ok_or_else(|| InspectionError::missing_node(node_id))
    }

    pub fn parent_id(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent_id_by_id.get(&node_id).copied()
    }

    /// The parent of a node; a dangling parent id is an invariant violation.
    pub fn parent_xor(&self, node_id: NodeId) -> Result<Option<XorNode<'_>>, InspectionError> {
        match self.parent_id(node_id) {
            Some(parent_id) => self.expect_xor(parent_id).map(Some),
            None => Ok(None),
        }
    }

    pub fn child_ids(&self, node_id: NodeId) -> &[NodeId] {
        self.child_ids_by_id
            .get(&node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn children(&self, node_id: NodeId) -> Result<Vec<XorNode<'_>>, InspectionError> {
        self.child_ids(node_id)
            .iter()
            .map(|id| self.expect_xor(*id))
            .collect()
    }

    /// Finds the child occupying `attribute_index` of `parent_id`.
    ///
    /// When `allowed_kinds` is given, a child of any other kind is an invariant violation.
    pub fn maybe_child_by_attribute_index(
        &self,
        parent_id: NodeId,
        attribute_index: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Result<Option<XorNode<'_>>, InspectionError> {
        for child_id in self.child_ids(parent_id) {
            let child = self.expect_xor(*child_id)?;

            if child.maybe_attribute_index() != Some(attribute_index) {
                continue;
            }
            if let Some(allowed_kinds) = allowed_kinds {
                if !allowed_kinds.contains(&child.kind()) {
                    return Err(InspectionError::unexpected_kind(
                        child.id(),
                        allowed_kinds,
                        child.kind(),
                    ));
                }
            }

            return Ok(Some(child));
        }

        Ok(None)
    }

    /// Like `maybe_child_by_attribute_index`, but the child must exist.
    pub fn expect_child_by_attribute_index(
        &self,
        parent_id: NodeId,
        attribute_index: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Result<XorNode<'_>, InspectionError> {
        self.maybe_child_by_attribute_index(parent_id, attribute_index, allowed_kinds)?
            .ok_or_else(|| InspectionError::missing_child(parent_id, attribute_index))
    }

    /// Children of a resolved node must exist; a context node may simply not have them yet.
    pub fn maybe_required_child(
        &self,
        parent: XorNode<'_>,
        attribute_index: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Result<Option<XorNode<'_>>, InspectionError> {
        match parent {
            XorNode::Ast(_) => self
                .expect_child_by_attribute_index(parent.id(), attribute_index, allowed_kinds)
                .map(Some),
            XorNode::Context(_) => {
                self.maybe_child_by_attribute_index(parent.id(), attribute_index, allowed_kinds)
            }
        }
    }

    /// The path from `node_id` up to the root: index 0 is the node itself, the root is last.
    pub fn ancestry(&self, node_id: NodeId) -> Result<Vec<XorNode<'_>>, InspectionError> {
        let mut ancestry = vec![self.expect_xor(node_id)?];
        let mut current = node_id;

        while let Some(parent_id) = self.parent_id(current) {
            if ancestry.len() > self.len() {
                // parent links form a cycle
                return Err(InspectionError::missing_node(parent_id));
            }
            ancestry.push(self.expect_xor(parent_id)?);
            current = parent_id;
        }

        Ok(ancestry)
    }

    pub fn is_leaf(&self, node_id: NodeId) -> bool {
        self.leaf_node_ids.contains(&node_id)
    }

    pub fn leaf_node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.leaf_node_ids.iter().copied()
    }
}
