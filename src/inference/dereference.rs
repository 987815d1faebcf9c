use super::InferenceState;
use crate::errors::InspectionError;
use crate::scope::{ScopeInspector, ScopeItem};
use crate::syntax::{attr, NodeId, NodeIdMap, NodeKind, XorNode};
use log::{debug, trace};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Dereferenced {
    Item(ScopeItem),
    /// The chain came back to a binding still being defined (`x = @x`).
    Recursive,
}

/// `name` or `@name` as written at a use site.
#[derive(Debug, Clone, Copy)]
struct IdentifierUse<'a> {
    name: &'a str,
    is_inclusive: bool,
}

impl IdentifierUse<'_> {
    fn key(&self) -> String {
        if self.is_inclusive {
            format!("@{}", self.name)
        } else {
            self.name.to_string()
        }
    }
}

fn identifier_use<'a>(
    graph: &'a NodeIdMap,
    node: XorNode<'a>,
) -> Result<Option<IdentifierUse<'a>>, InspectionError> {
    match node.kind() {
        NodeKind::Identifier => Ok(node.identifier_literal().map(|name| IdentifierUse {
            name,
            is_inclusive: false,
        })),
        NodeKind::IdentifierExpression => {
            let is_inclusive = graph
                .maybe_child_by_attribute_index(
                    node.id(),
                    attr::IDENTIFIER_EXPRESSION_INCLUSIVE,
                    None,
                )?
                .is_some();
            let name = graph
                .maybe_child_by_attribute_index(
                    node.id(),
                    attr::IDENTIFIER_EXPRESSION_IDENTIFIER,
                    Some(&[NodeKind::Identifier]),
                )?
                .and_then(|n| n.identifier_literal());

            Ok(name.map(|name| IdentifierUse { name, is_inclusive }))
        }
        _ => Ok(None),
    }
}

impl<'a> InferenceState<'a> {
    /// Follows an identifier through aliasing bindings (`b = a`) to the item that
    /// gives its type.
    /// A name with no binding comes back as `ScopeItem::Undefined` for the use site.
    pub(super) fn dereference(
        &mut self,
        node: XorNode<'a>,
    ) -> Result<Dereferenced, InspectionError> {
        let graph = self.graph;
        let undefined = Dereferenced::Item(ScopeItem::Undefined { node: node.id() });
        let original = match identifier_use(graph, node)? {
            Some(original) => original,
            None => return Ok(undefined),
        };
        let mut current = node;
        let mut current_use = original;
        let mut visited = HashSet::new();

        visited.insert(node.id());

        loop {
            self.settings.check_cancellation()?;

            let item = match self.lookup(current.id(), &current_use.key())? {
                Some(item) => item,
                None => {
                    trace!("[dereference] {} is not in scope at {}", current_use.key(), current);
                    return Ok(undefined);
                }
            };
            let value = match item.maybe_value() {
                Some(value) => graph.expect_xor(value)?,
                None => return Ok(Dereferenced::Item(item)),
            };
            let next_use = match identifier_use(graph, value)? {
                Some(next_use) => next_use,
                None => return Ok(Dereferenced::Item(item)),
            };

            if next_use.is_inclusive != original.is_inclusive || !visited.insert(value.id()) {
                debug!("[dereference] recursive reference through {}", value);
                return Ok(Dereferenced::Recursive);
            }

            trace!("[dereference] {} -> {}", current, value);
            current = value;
            current_use = next_use;
        }
    }

    /// The item bound to `key` at `node_id`, resolving that node's scope on demand.
    pub(super) fn lookup(
        &mut self,
        node_id: NodeId,
        key: &str,
    ) -> Result<Option<ScopeItem>, InspectionError> {
        if !self.scope_delta.contains_key(&node_id) && !self.given_scope.contains_key(&node_id) {
            let delta = {
                let mut inspector = ScopeInspector::new(self.graph, self.settings)
                    .with_given(&self.scope_delta)
                    .with_given(self.given_scope);
                inspector.inspect(node_id)?;
                inspector.into_delta()
            };

            self.scope_delta.extend(delta);
        }

        let scope = self
            .scope_delta
            .get(&node_id)
            .or_else(|| self.given_scope.get(&node_id))
            .ok_or_else(|| InspectionError::missing_scope(node_id))?;

        Ok(scope.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TypeById;
    use crate::scope::ScopeById;
    use crate::settings::InspectionSettings;
    use crate::syntax::NodeIdMapBuilder;
    use assert_matches::assert_matches;

    #[test]
    fn unbound_name_is_undefined_at_its_use() {
        // let a = 1 in b
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let body = b.identifier_expression("b");
        b.let_expression(&[("a", one)], body);
        let graph = b.finish();
        let settings = InspectionSettings::default();
        let (types, scopes) = (TypeById::new(), ScopeById::new());
        let mut state = InferenceState::new(&graph, &settings, &types, &scopes);

        let dereferenced = state.dereference(graph.expect_xor(body).unwrap()).unwrap();
        assert_matches!(
            dereferenced,
            Dereferenced::Item(ScopeItem::Undefined { node }) if node == body
        );
    }

    #[test]
    fn alias_resolves_to_its_binding() {
        // let a = 1, b = a in b
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let value_b = b.identifier_expression("a");
        let body = b.identifier_expression("b");
        b.let_expression(&[("a", one), ("b", value_b)], body);
        let graph = b.finish();
        let settings = InspectionSettings::default();
        let (types, scopes) = (TypeById::new(), ScopeById::new());
        let mut state = InferenceState::new(&graph, &settings, &types, &scopes);

        let dereferenced = state.dereference(graph.expect_xor(body).unwrap()).unwrap();
        assert_matches!(
            dereferenced,
            Dereferenced::Item(ScopeItem::KeyValuePair { key, maybe_value: Some(value), .. })
                if key == "a" && value == one
        );
    }
}
