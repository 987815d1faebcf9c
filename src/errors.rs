use crate::syntax::{NodeId, NodeKind};
use std::fmt;
use thiserror::Error;

/// Failure of a scope or type inspection.
///
/// Only invariant violations and cancellation are reported here. Incomplete input
/// is modelled in the results (`Unknown`, absent values), never as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct InspectionError {
    pub kind: InspectionErrorKind,
}

impl InspectionError {
    pub fn new(kind: InspectionErrorKind) -> Self {
        Self { kind }
    }

    pub fn missing_node(node_id: NodeId) -> Self {
        Self::new(InspectionErrorKind::MissingNode { node_id })
    }

    pub fn missing_child(parent_id: NodeId, attribute_index: u32) -> Self {
        Self::new(InspectionErrorKind::MissingChild {
            parent_id,
            attribute_index,
        })
    }

    pub fn unexpected_kind(node_id: NodeId, expected: &[NodeKind], actual: NodeKind) -> Self {
        Self::new(InspectionErrorKind::UnexpectedKind {
            node_id,
            expected: expected.to_vec(),
            actual,
        })
    }

    pub fn missing_payload(node_id: NodeId, kind: NodeKind) -> Self {
        Self::new(InspectionErrorKind::MissingPayload { node_id, kind })
    }

    pub fn missing_scope(node_id: NodeId) -> Self {
        Self::new(InspectionErrorKind::MissingScope { node_id })
    }

    pub fn recursion_limit(node_id: NodeId, limit: usize) -> Self {
        Self::new(InspectionErrorKind::RecursionLimitExceeded { node_id, limit })
    }

    pub fn cancelled() -> Self {
        Self::new(InspectionErrorKind::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, InspectionErrorKind::Cancelled)
    }

    /// Node ids involved in the failure, for editor consumers that want to highlight them.
    pub fn node_ids(&self) -> Vec<NodeId> {
        match self.kind {
            InspectionErrorKind::MissingNode { node_id }
            | InspectionErrorKind::UnexpectedKind { node_id, .. }
            | InspectionErrorKind::MissingPayload { node_id, .. }
            | InspectionErrorKind::MissingScope { node_id }
            | InspectionErrorKind::RecursionLimitExceeded { node_id, .. } => vec![node_id],
            InspectionErrorKind::MissingChild { parent_id, .. } => vec![parent_id],
            InspectionErrorKind::Cancelled => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionErrorKind {
    MissingNode {
        node_id: NodeId,
    },
    MissingChild {
        parent_id: NodeId,
        attribute_index: u32,
    },
    UnexpectedKind {
        node_id: NodeId,
        expected: Vec<NodeKind>,
        actual: NodeKind,
    },
    MissingPayload {
        node_id: NodeId,
        kind: NodeKind,
    },
    MissingScope {
        node_id: NodeId,
    },
    RecursionLimitExceeded {
        node_id: NodeId,
        limit: usize,
    },
    Cancelled,
}

impl fmt::Display for InspectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionErrorKind::MissingNode { node_id } => {
                write!(f, "Invariant error: node #{} does not exist", node_id)
            }
            InspectionErrorKind::MissingChild {
                parent_id,
                attribute_index,
            } => write!(
                f,
                "Invariant error: node #{} has no child at attribute index {}",
                parent_id, attribute_index
            ),
            InspectionErrorKind::UnexpectedKind {
                node_id,
                expected,
                actual,
            } => {
                write!(f, "Invariant error: expected node #{} to be ", node_id)?;

                let mut it = expected.iter().peekable();
                while let Some(kind) = it.next() {
                    write!(f, "{}", kind)?;
                    if it.peek().is_some() {
                        write!(f, " | ")?;
                    }
                }
                write!(f, ", but found {}", actual)
            }
            InspectionErrorKind::MissingPayload { node_id, kind } => write!(
                f,
                "Invariant error: {} node #{} is missing its content",
                kind, node_id
            ),
            InspectionErrorKind::MissingScope { node_id } => {
                write!(f, "Invariant error: no scope was resolved for node #{}", node_id)
            }
            InspectionErrorKind::RecursionLimitExceeded { node_id, limit } => write!(
                f,
                "Inference depth exceeded {} levels at node #{}",
                limit, node_id
            ),
            InspectionErrorKind::Cancelled => write!(f, "Inspection was cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_kind_message() {
        let err = InspectionError::unexpected_kind(
            3,
            &[NodeKind::ArrayWrapper, NodeKind::Csv],
            NodeKind::Identifier,
        );

        assert_eq!(
            err.to_string(),
            "Invariant error: expected node #3 to be ArrayWrapper | Csv, but found Identifier"
        );
        assert_eq!(err.node_ids(), vec![3]);
    }

    #[test]
    fn cancelled_has_no_nodes() {
        let err = InspectionError::cancelled();

        assert!(err.is_cancelled());
        assert!(err.node_ids().is_empty());
    }
}
