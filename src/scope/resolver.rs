use super::{NodeScope, ScopeById, ScopeItem};
use crate::errors::InspectionError;
use crate::settings::InspectionSettings;
use crate::syntax::iter::{self, KeyValuePair};
use crate::syntax::{attr, FunctionSignature, NodeId, NodeIdMap, NodeKind, XorNode};
use log::{debug, trace};

/// Resolves the scope of `root` and every node on its ancestry.
///
/// Returns `given ∪ delta`. The caller's map is only read; when it already holds
/// `root` it is returned as is.
pub fn resolve_scope(
    graph: &NodeIdMap,
    root: NodeId,
    maybe_given: Option<&ScopeById>,
    settings: &InspectionSettings,
) -> Result<ScopeById, InspectionError> {
    if let Some(given) = maybe_given {
        if given.contains_key(&root) {
            debug!("[scope] #{} is already resolved", root);
            return Ok(given.clone());
        }
    }

    let mut inspector = ScopeInspector::new(graph, settings);
    if let Some(given) = maybe_given {
        inspector = inspector.with_given(given);
    }
    inspector.inspect(root)?;

    let mut scope_by_id = maybe_given.cloned().unwrap_or_default();
    scope_by_id.extend(inspector.into_delta());
    Ok(scope_by_id)
}

/// Like `resolve_scope`, but merges the new entries into `cache`. On failure `cache`
/// is left untouched.
pub fn resolve_scope_into(
    graph: &NodeIdMap,
    root: NodeId,
    cache: &mut ScopeById,
    settings: &InspectionSettings,
) -> Result<(), InspectionError> {
    let delta = {
        let mut inspector = ScopeInspector::new(graph, settings).with_given(&*cache);
        inspector.inspect(root)?;
        inspector.into_delta()
    };

    cache.extend(delta);
    Ok(())
}

/// Top-down scope propagation over read-only `given` layers, writing only to its own
/// delta.
#[derive(Debug)]
pub struct ScopeInspector<'a> {
    graph: &'a NodeIdMap,
    given: Vec<&'a ScopeById>,
    delta: ScopeById,
    settings: &'a InspectionSettings,
}

impl<'a> ScopeInspector<'a> {
    pub fn new(graph: &'a NodeIdMap, settings: &'a InspectionSettings) -> Self {
        Self {
            graph,
            given: vec![],
            delta: ScopeById::new(),
            settings,
        }
    }

    /// Adds a read-only layer. Layers are consulted in the order they were added.
    pub fn with_given(mut self, given: &'a ScopeById) -> Self {
        self.given.push(given);
        self
    }

    pub fn into_delta(self) -> ScopeById {
        self.delta
    }

    pub fn inspect(&mut self, root: NodeId) -> Result<(), InspectionError> {
        self.settings.check_cancellation()?;

        if self.delta.contains_key(&root) || self.given_scope(root).is_some() {
            trace!("[scope] cache hit #{}", root);
            return Ok(());
        }

        let graph = self.graph;
        let ancestry = graph.ancestry(root)?;

        // Outermost first: a node's scope starts as a copy of its parent's.
        for (i, node) in ancestry.iter().enumerate().rev() {
            self.settings.check_cancellation()?;

            let maybe_next = if i > 0 { Some(ancestry[i - 1]) } else { None };
            trace!("[scope] visit {}", node);

            match node.kind() {
                NodeKind::EachExpression => self.inspect_each(*node)?,
                NodeKind::FunctionExpression => self.inspect_function(*node)?,
                NodeKind::LetExpression => self.inspect_let(*node, maybe_next)?,
                NodeKind::RecordExpression | NodeKind::RecordLiteral => {
                    let pairs = iter::record_key_value_pairs(graph, *node)?;
                    self.inspect_key_value_pairs(*node, &pairs, false);
                }
                NodeKind::Section => {
                    let pairs = iter::section_key_value_pairs(graph, *node)?;
                    self.inspect_key_value_pairs(*node, &pairs, true);
                }
                _ => {
                    self.get_or_create_scope(node.id(), None);
                }
            }
        }

        debug!("[scope] resolved #{} ({} new entries)", root, self.delta.len());
        Ok(())
    }

    fn given_scope(&self, node_id: NodeId) -> Option<&NodeScope> {
        self.given.iter().find_map(|given| given.get(&node_id))
    }

    fn get_or_create_scope(
        &mut self,
        node_id: NodeId,
        maybe_default: Option<&NodeScope>,
    ) -> &mut NodeScope {
        if !self.delta.contains_key(&node_id) {
            let scope = self.initial_scope(node_id, maybe_default);
            self.delta.insert(node_id, scope);
        }

        self.delta.entry(node_id).or_default()
    }

    /// The first of: a given entry, the default, the parent's scope, an empty scope.
    /// Always a copy, so later insertions never reach the source.
    fn initial_scope(&self, node_id: NodeId, maybe_default: Option<&NodeScope>) -> NodeScope {
        if let Some(given) = self.given_scope(node_id) {
            return given.clone();
        }
        if let Some(default) = maybe_default {
            return default.clone();
        }
        if let Some(parent_id) = self.graph.parent_id(node_id) {
            if let Some(parent) = self
                .delta
                .get(&parent_id)
                .or_else(|| self.given_scope(parent_id))
            {
                return parent.clone();
            }
        }

        NodeScope::new()
    }

    fn expand_scope(
        &mut self,
        node_id: NodeId,
        items: Vec<(String, ScopeItem)>,
        maybe_default: Option<&NodeScope>,
    ) {
        let scope = self.get_or_create_scope(node_id, maybe_default);

        for (key, item) in items {
            scope.insert(key, item);
        }
    }

    fn inspect_each(&mut self, each: XorNode<'a>) -> Result<(), InspectionError> {
        let each_scope = self.get_or_create_scope(each.id(), None).clone();

        if let Some(body) = self.graph.maybe_required_child(each, attr::EACH_BODY, None)? {
            let item = ScopeItem::Each {
                each_expression: each.id(),
            };
            self.expand_scope(body.id(), vec![("_".to_string(), item)], Some(&each_scope));
        }

        Ok(())
    }

    /// Parameters are visible in the body only.
    fn inspect_function(&mut self, function: XorNode<'a>) -> Result<(), InspectionError> {
        let function_scope = self.get_or_create_scope(function.id(), None).clone();
        let body = match self
            .graph
            .maybe_required_child(function, attr::FUNCTION_BODY, None)?
        {
            Some(body) => body,
            None => return Ok(()),
        };
        let signature = FunctionSignature::analyze(self.graph, function)?;
        let items = signature
            .parameters
            .into_iter()
            .map(|parameter| {
                (
                    parameter.name.clone(),
                    ScopeItem::Parameter {
                        node: parameter.id,
                        name: parameter.name,
                        is_nullable: parameter.is_nullable,
                        is_optional: parameter.is_optional,
                        maybe_type: parameter.maybe_type,
                    },
                )
            })
            .collect();

        self.expand_scope(body.id(), items, Some(&function_scope));
        Ok(())
    }

    fn inspect_let(
        &mut self,
        let_expression: XorNode<'a>,
        maybe_next: Option<XorNode<'a>>,
    ) -> Result<(), InspectionError> {
        let pairs = iter::let_key_value_pairs(self.graph, let_expression)?;

        match maybe_next {
            Some(body) if body.maybe_attribute_index() == Some(attr::LET_BODY) => {
                let let_scope = self.get_or_create_scope(let_expression.id(), None).clone();
                let items = pairs
                    .iter()
                    .map(|kv| (kv.key.to_string(), pair_item(kv, false, false)))
                    .collect();

                self.expand_scope(body.id(), items, Some(&let_scope));
            }
            _ => self.inspect_key_value_pairs(let_expression, &pairs, false),
        }

        Ok(())
    }

    /// Each value sees its siblings, and itself only through `@key`.
    fn inspect_key_value_pairs(
        &mut self,
        owner: XorNode<'a>,
        pairs: &[KeyValuePair<'a>],
        is_section: bool,
    ) {
        let owner_scope = self.get_or_create_scope(owner.id(), None).clone();

        for kv in pairs {
            let value = match kv.maybe_value {
                Some(value) => value,
                None => continue,
            };
            let items = pairs
                .iter()
                .map(|other| {
                    if other.key == kv.key {
                        (format!("@{}", kv.key), pair_item(kv, is_section, true))
                    } else {
                        (other.key.to_string(), pair_item(other, is_section, false))
                    }
                })
                .collect();

            self.expand_scope(value.id(), items, Some(&owner_scope));
        }
    }
}

fn pair_item(kv: &KeyValuePair<'_>, is_section: bool, is_recursive: bool) -> ScopeItem {
    let key = kv.key.to_string();
    let key_node = kv.key_node_id();
    let maybe_value = kv.maybe_value.map(|value| value.id());

    if is_section {
        ScopeItem::SectionMember {
            key,
            key_node,
            maybe_value,
            is_recursive,
        }
    } else {
        ScopeItem::KeyValuePair {
            key,
            key_node,
            maybe_value,
            is_recursive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InspectionErrorKind;
    use crate::settings::CancellationFlag;
    use crate::syntax::{AstPayload, ConstantKind, NodeIdMapBuilder, PrimitiveTypeKind};
    use assert_matches::assert_matches;

    fn scope_at(graph: &NodeIdMap, node_id: NodeId) -> NodeScope {
        let scope_by_id =
            resolve_scope(graph, node_id, None, &InspectionSettings::default()).unwrap();

        scope_by_id[&node_id].clone()
    }

    #[test]
    fn record_siblings_visible_self_not() {
        // [a = b, b = 1]
        let mut b = NodeIdMapBuilder::new();
        let value_a = b.identifier_expression("b");
        let value_b = b.numeric_literal("1");
        b.record_expression(&[("a", value_a), ("b", value_b)]);
        let graph = b.finish();

        let scope = scope_at(&graph, value_b);
        assert!(scope.contains_key("a"));
        assert!(!scope.contains_key("b"));

        let scope = scope_at(&graph, value_a);
        assert!(!scope.contains_key("a"));
        assert_matches!(
            scope.get("b"),
            Some(ScopeItem::KeyValuePair { key, maybe_value: Some(value), is_recursive: false, .. })
                if key == "b" && *value == value_b
        );
        assert_matches!(
            scope.get("@a"),
            Some(ScopeItem::KeyValuePair { is_recursive: true, .. })
        );
    }

    #[test]
    fn each_binds_underscore_in_body() {
        // each _ + 1
        let mut b = NodeIdMapBuilder::new();
        let underscore = b.identifier_expression("_");
        let one = b.numeric_literal("1");
        let body = b.bin_op(NodeKind::ArithmeticExpression, underscore, ConstantKind::Plus, one);
        let each = b.each_expression(body);
        let graph = b.finish();

        let scope_by_id =
            resolve_scope(&graph, underscore, None, &InspectionSettings::default()).unwrap();

        assert_eq!(
            scope_by_id[&body].get("_"),
            Some(&ScopeItem::Each { each_expression: each })
        );
        assert!(scope_by_id[&underscore].contains_key("_"));
        assert!(scope_by_id[&each].is_empty());
    }

    #[test]
    fn inner_each_shadows_outer() {
        // each each _
        let mut b = NodeIdMapBuilder::new();
        let underscore = b.identifier_expression("_");
        let inner = b.each_expression(underscore);
        let outer = b.each_expression(inner);
        let graph = b.finish();

        let scope = scope_at(&graph, underscore);

        assert_eq!(scope.get("_"), Some(&ScopeItem::Each { each_expression: inner }));
        assert_ne!(scope.get("_"), Some(&ScopeItem::Each { each_expression: outer }));
    }

    #[test]
    fn parameters_visible_in_body_only() {
        // (x as number) => x
        let mut b = NodeIdMapBuilder::new();
        let x = b.parameter("x", false, Some((PrimitiveTypeKind::Number, false)));
        let body = b.identifier_expression("x");
        let function = b.function_expression(&[x], None, body);
        let graph = b.finish();

        let scope_by_id =
            resolve_scope(&graph, body, None, &InspectionSettings::default()).unwrap();

        assert!(!scope_by_id[&function].contains_key("x"));
        assert_matches!(
            scope_by_id[&body].get("x"),
            Some(ScopeItem::Parameter {
                is_nullable: false,
                is_optional: false,
                maybe_type: Some(PrimitiveTypeKind::Number),
                ..
            })
        );
    }

    #[test]
    fn let_body_sees_every_binding() {
        // let a = 1, b = a in b
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let value_b = b.identifier_expression("a");
        let body = b.identifier_expression("b");
        b.let_expression(&[("a", one), ("b", value_b)], body);
        let graph = b.finish();

        let scope = scope_at(&graph, body);
        assert!(scope.contains_key("a"));
        assert!(scope.contains_key("b"));
        assert!(!scope.contains_key("@b"));

        let scope = scope_at(&graph, value_b);
        assert!(scope.contains_key("a"));
        assert!(!scope.contains_key("b"));
        assert!(scope.contains_key("@b"));
    }

    #[test]
    fn outer_bindings_reach_record_values() {
        // let x = 1 in [a = x]
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let value_a = b.identifier_expression("x");
        let record = b.record_expression(&[("a", value_a)]);
        b.let_expression(&[("x", one)], record);
        let graph = b.finish();

        let scope = scope_at(&graph, value_a);

        assert!(scope.contains_key("x"));
        assert!(!scope.contains_key("a"));
    }

    #[test]
    fn section_members_see_each_other() {
        let mut b = NodeIdMapBuilder::new();
        let value_a = b.identifier_expression("b");
        let value_b = b.numeric_literal("1");
        b.section(&[("a", value_a), ("b", value_b)]);
        let graph = b.finish();

        assert_matches!(
            scope_at(&graph, value_a).get("b"),
            Some(ScopeItem::SectionMember { maybe_value: Some(value), .. }) if *value == value_b
        );
        assert!(scope_at(&graph, value_b).contains_key("a"));
    }

    #[test]
    fn second_call_is_a_cache_hit() {
        let mut b = NodeIdMapBuilder::new();
        let value_a = b.identifier_expression("b");
        let value_b = b.numeric_literal("1");
        b.record_expression(&[("a", value_a), ("b", value_b)]);
        let graph = b.finish();
        let settings = InspectionSettings::default();

        let first = resolve_scope(&graph, value_a, None, &settings).unwrap();
        let second = resolve_scope(&graph, value_a, Some(&first), &settings).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn failure_leaves_given_untouched() {
        // An `each` that claims to be complete but has no body.
        let mut b = NodeIdMapBuilder::new();
        let each_constant = b.constant(ConstantKind::Each);
        let each = b.ast(NodeKind::EachExpression, AstPayload::None, &[(0, each_constant)]);
        let graph = b.finish();
        let settings = InspectionSettings::default();

        let mut given = ScopeById::new();
        given.insert(
            999,
            vec![("x".to_string(), ScopeItem::Each { each_expression: 1 })]
                .into_iter()
                .collect(),
        );
        let snapshot = given.clone();

        assert_matches!(
            resolve_scope(&graph, each, Some(&given), &settings),
            Err(InspectionError {
                kind: InspectionErrorKind::MissingChild { attribute_index: 1, .. }
            })
        );
        assert_eq!(given, snapshot);

        assert!(resolve_scope_into(&graph, each, &mut given, &settings).is_err());
        assert_eq!(given, snapshot);
    }

    #[test]
    fn resolve_into_merges_on_success() {
        let mut b = NodeIdMapBuilder::new();
        let underscore = b.identifier_expression("_");
        let each = b.each_expression(underscore);
        let graph = b.finish();
        let mut cache = ScopeById::new();

        resolve_scope_into(&graph, underscore, &mut cache, &InspectionSettings::default()).unwrap();

        assert!(cache.contains_key(&each));
        assert!(cache[&underscore].contains_key("_"));
    }

    #[test]
    fn context_each_without_body() {
        let mut b = NodeIdMapBuilder::new();
        let each_constant = b.constant(ConstantKind::Each);
        let each = b.context(NodeKind::EachExpression, &[(0, each_constant)]);
        let graph = b.finish();

        assert!(scope_at(&graph, each).is_empty());
    }

    #[test]
    fn cancelled_before_work() {
        let mut b = NodeIdMapBuilder::new();
        let one = b.numeric_literal("1");
        let graph = b.finish();
        let flag = CancellationFlag::new();
        flag.cancel();
        let settings = InspectionSettings::new().with_cancellation_token(flag);

        let err = resolve_scope(&graph, one, None, &settings).unwrap_err();

        assert!(err.is_cancelled());
    }
}
