use super::{ScopeById, ScopeItem};
use crate::errors::InspectionError;
use crate::syntax::{attr, NodeIdMap, XorNode};
use log::trace;

/// Hides items that top-down propagation made visible but that the exact position
/// rules out: a node sitting in the body slot of the `each` that `_` refers to does
/// not see that `_`.
///
/// Every node of `active_path` must have been resolved in `scope_by_id`.
pub fn filter_by_position(
    graph: &NodeIdMap,
    scope_by_id: &ScopeById,
    active_path: &[XorNode<'_>],
) -> Result<ScopeById, InspectionError> {
    let mut delta = ScopeById::new();

    for node in active_path {
        let scope = scope_by_id
            .get(&node.id())
            .ok_or_else(|| InspectionError::missing_scope(node.id()))?;

        if node.maybe_attribute_index() != Some(attr::EACH_BODY) {
            continue;
        }
        let parent_id = match graph.parent_id(node.id()) {
            Some(parent_id) => parent_id,
            None => continue,
        };
        let hidden: Vec<_> = scope
            .iter()
            .filter(|(_, item)| {
                matches!(item, ScopeItem::Each { each_expression } if *each_expression == parent_id)
            })
            .map(|(key, _)| key.clone())
            .collect();

        if hidden.is_empty() {
            continue;
        }

        let filtered = delta.entry(node.id()).or_insert_with(|| scope.clone());
        for key in &hidden {
            trace!("[scope] hide {} at #{}", key, node.id());
            filtered.shift_remove(key);
        }
    }

    // an emptied scope stays in the result: every path node keeps an entry
    let mut result = scope_by_id.clone();
    result.extend(delta);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InspectionErrorKind;
    use crate::scope::resolve_scope;
    use crate::settings::InspectionSettings;
    use crate::syntax::{ConstantKind, NodeIdMapBuilder, NodeKind};
    use assert_matches::assert_matches;

    #[test]
    fn each_body_slot_hides_underscore() {
        // each _ + 1
        let mut b = NodeIdMapBuilder::new();
        let underscore = b.identifier_expression("_");
        let one = b.numeric_literal("1");
        let body = b.bin_op(NodeKind::ArithmeticExpression, underscore, ConstantKind::Plus, one);
        b.each_expression(body);
        let graph = b.finish();

        let scope_by_id =
            resolve_scope(&graph, underscore, None, &InspectionSettings::default()).unwrap();
        let path = graph.ancestry(underscore).unwrap();
        let filtered = filter_by_position(&graph, &scope_by_id, &path).unwrap();

        assert!(scope_by_id[&body].contains_key("_"));
        assert!(filtered[&body].is_empty());
        assert!(filtered[&underscore].contains_key("_"));
    }

    #[test]
    fn filtering_twice_keeps_the_path_resolved() {
        // each 1
        let mut b = NodeIdMapBuilder::new();
        let body = b.numeric_literal("1");
        b.each_expression(body);
        let graph = b.finish();

        let scope_by_id =
            resolve_scope(&graph, body, None, &InspectionSettings::default()).unwrap();
        let path = graph.ancestry(body).unwrap();
        let filtered = filter_by_position(&graph, &scope_by_id, &path).unwrap();
        let refiltered = filter_by_position(&graph, &filtered, &path).unwrap();

        assert!(filtered[&body].is_empty());
        assert_eq!(refiltered, filtered);
    }

    #[test]
    fn other_bindings_survive() {
        // let x = 1 in each x
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let x = b.identifier_expression("x");
        let each = b.each_expression(x);
        b.let_expression(&[("x", one)], each);
        let graph = b.finish();

        let scope_by_id = resolve_scope(&graph, x, None, &InspectionSettings::default()).unwrap();
        let path = graph.ancestry(x).unwrap();
        let filtered = filter_by_position(&graph, &scope_by_id, &path).unwrap();

        assert!(filtered[&x].contains_key("x"));
        assert!(!filtered[&x].contains_key("_"));
        assert!(scope_by_id[&x].contains_key("_"));
    }

    #[test]
    fn unresolved_path_is_an_error() {
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let graph = b.finish();
        let path = graph.ancestry(one).unwrap();

        assert_matches!(
            filter_by_position(&graph, &ScopeById::new(), &path),
            Err(InspectionError {
                kind: InspectionErrorKind::MissingScope { node_id }
            }) if node_id == one
        );
    }
}
