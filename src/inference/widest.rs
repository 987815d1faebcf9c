use super::expected::expected_type;
use crate::syntax::{NodeIdMap, XorNode};
use crate::types::{Type, TypeKind};
use log::trace;

/// Hint for a leaf that is still being typed.
///
/// Climbs `ancestry` (target first) while each node is the only child of its parent,
/// keeping the last slot expectation that applies. Stops at the first parent with
/// siblings of the current node.
pub fn widest_type(graph: &NodeIdMap, ancestry: &[XorNode<'_>]) -> Option<Type> {
    let mut best_match = None;

    for pair in ancestry.windows(2) {
        let (child, parent) = (pair[0], pair[1]);

        if graph.child_ids(parent.id()).len() > 1 {
            break;
        }
        let attribute_index = match child.maybe_attribute_index() {
            Some(attribute_index) => attribute_index,
            None => break,
        };

        let expected = expected_type(parent.kind(), attribute_index);
        if expected.kind() != TypeKind::NotApplicable {
            trace!("[widest] {} expects {} at {}", parent, expected, attribute_index);
            best_match = Some(expected);
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{attr, ConstantKind, NodeIdMapBuilder, NodeKind};

    #[test]
    fn only_child_of_if_condition() {
        // if x
        let mut b = NodeIdMapBuilder::new();
        let x = b.identifier_expression("x");
        let partial = b.context(NodeKind::IfExpression, &[(attr::IF_CONDITION, x)]);
        let graph = b.finish();
        let identifier = graph.child_ids(x)[0];
        let ancestry = graph.ancestry(identifier).unwrap();

        assert_eq!(ancestry.last().map(|n| n.id()), Some(partial));
        assert_eq!(widest_type(&graph, &ancestry), Some(Type::LOGICAL));
    }

    #[test]
    fn stops_at_siblings() {
        // each x
        let mut b = NodeIdMapBuilder::new();
        let x = b.identifier_expression("x");
        b.each_expression(x);
        let graph = b.finish();
        let ancestry = graph.ancestry(x).unwrap();

        assert_eq!(widest_type(&graph, &ancestry), None);
    }

    #[test]
    fn keeps_outermost_applicable_hint() {
        // (x  inside a partial `not`
        let mut b = NodeIdMapBuilder::new();
        let x = b.identifier_expression("x");
        let open = b.constant(ConstantKind::LeftParenthesis);
        let parenthesized = b.context(
            NodeKind::ParenthesizedExpression,
            &[(0, open), (attr::WRAPPED_CONTENT, x)],
        );
        b.context(NodeKind::UnaryExpression, &[(attr::UNARY_OPERAND, parenthesized)]);
        let graph = b.finish();
        let ancestry = graph.ancestry(x).unwrap();

        // the parenthesized node has two children, so the climb ends there
        assert_eq!(widest_type(&graph, &ancestry), None);

        let mut b = NodeIdMapBuilder::new();
        let x = b.identifier_expression("x");
        let parenthesized =
            b.context(NodeKind::ParenthesizedExpression, &[(attr::WRAPPED_CONTENT, x)]);
        b.context(NodeKind::UnaryExpression, &[(attr::UNARY_OPERAND, parenthesized)]);
        let graph = b.finish();
        let ancestry = graph.ancestry(x).unwrap();

        assert_eq!(
            widest_type(&graph, &ancestry),
            Some(Type::any_union(vec![Type::NUMBER, Type::LOGICAL]))
        );
    }

    #[test]
    fn root_alone_has_no_hint() {
        let mut b = NodeIdMapBuilder::new();
        let x = b.identifier("x");
        let graph = b.finish();
        let ancestry = graph.ancestry(x).unwrap();

        assert_eq!(widest_type(&graph, &ancestry), None);
    }
}
