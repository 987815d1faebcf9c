use super::bin_op::{bin_op_type, right_operand_hint};
use super::dereference::Dereferenced;
use crate::errors::InspectionError;
use crate::scope::{ScopeById, ScopeItem};
use crate::settings::InspectionSettings;
use crate::syntax::iter;
use crate::syntax::{
    attr, AstNode, ConstantKind, FunctionSignature, LiteralKind, NodeId, NodeIdMap, NodeKind,
    ParameterSignature, PrimitiveTypeKind, XorNode,
};
use crate::types::{FieldMap, FunctionParameter, Type, TypeKind};
use log::{debug, trace};
use std::collections::HashMap;

pub type TypeById = HashMap<NodeId, Type>;

/// Results a host keeps between inspections of the same graph.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InspectionCache {
    pub type_by_id: TypeById,
    pub scope_by_id: ScopeById,
}

impl InspectionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Infers the type of `node_id`. New types and scopes are written to `cache` only
/// when inference succeeds.
pub fn infer_type(
    graph: &NodeIdMap,
    node_id: NodeId,
    settings: &InspectionSettings,
    cache: &mut InspectionCache,
) -> Result<Type, InspectionError> {
    let (ty, type_delta, scope_delta) = {
        let mut state =
            InferenceState::new(graph, settings, &cache.type_by_id, &cache.scope_by_id);
        let ty = state.infer(node_id)?;
        let (type_delta, scope_delta) = state.into_deltas();

        (ty, type_delta, scope_delta)
    };

    cache.type_by_id.extend(type_delta);
    cache.scope_by_id.extend(scope_delta);
    Ok(ty)
}

/// Memoized inference over read-only given layers.
#[derive(Debug)]
pub struct InferenceState<'a> {
    pub(super) graph: &'a NodeIdMap,
    pub(super) settings: &'a InspectionSettings,
    given_types: &'a TypeById,
    pub(super) given_scope: &'a ScopeById,
    type_delta: TypeById,
    pub(super) scope_delta: ScopeById,
    /// Nodes being inferred, with the depth each was entered at.
    in_progress: HashMap<NodeId, usize>,
    depth: usize,
    /// Shallowest in-progress node the current computation ran into. A result computed
    /// while this is set depends on where the computation started, so it is not cached.
    maybe_cycle_depth: Option<usize>,
}

impl<'a> InferenceState<'a> {
    pub fn new(
        graph: &'a NodeIdMap,
        settings: &'a InspectionSettings,
        given_types: &'a TypeById,
        given_scope: &'a ScopeById,
    ) -> Self {
        Self {
            graph,
            settings,
            given_types,
            given_scope,
            type_delta: TypeById::new(),
            scope_delta: ScopeById::new(),
            in_progress: HashMap::new(),
            depth: 0,
            maybe_cycle_depth: None,
        }
    }

    /// Types and scopes computed so far that were not in the given layers.
    pub fn into_deltas(self) -> (TypeById, ScopeById) {
        (self.type_delta, self.scope_delta)
    }

    pub fn infer(&mut self, node_id: NodeId) -> Result<Type, InspectionError> {
        let graph = self.graph;

        self.infer_xor(graph.expect_xor(node_id)?)
    }

    pub fn infer_xor(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        self.settings.check_cancellation()?;

        let node_id = node.id();
        if let Some(ty) = self
            .type_delta
            .get(&node_id)
            .or_else(|| self.given_types.get(&node_id))
        {
            return Ok(ty.clone());
        }
        if let Some(&entered_at) = self.in_progress.get(&node_id) {
            debug!("[infer] cycle through {}", node);
            self.maybe_cycle_depth = shallowest(self.maybe_cycle_depth, Some(entered_at));
            return Ok(Type::ANY);
        }
        if self.depth >= self.settings.max_depth() {
            return Err(InspectionError::recursion_limit(node_id, self.settings.max_depth()));
        }

        let entered_at = self.depth;
        let outer_cycle_depth = self.maybe_cycle_depth.take();
        self.in_progress.insert(node_id, entered_at);
        self.depth += 1;
        let result = self.dispatch(node);
        self.depth -= 1;
        self.in_progress.remove(&node_id);

        // a cycle closing at this node ends here; deeper-entered ones are already closed
        let inner_cycle_depth = self.maybe_cycle_depth.take();
        let open_cycle_depth = inner_cycle_depth.filter(|depth| *depth < entered_at);
        self.maybe_cycle_depth = shallowest(outer_cycle_depth, open_cycle_depth);

        let ty = result?;
        if inner_cycle_depth.is_some() {
            trace!("[infer] {}: {} (inside a cycle, not cached)", node, ty);
        } else {
            trace!("[infer] {}: {}", node, ty);
            self.type_delta.insert(node_id, ty.clone());
        }
        Ok(ty)
    }

    fn dispatch(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        match node.kind() {
            NodeKind::ArrayWrapper
            | NodeKind::Constant
            | NodeKind::FieldSpecificationList
            | NodeKind::GeneralizedIdentifier
            | NodeKind::ParameterList
            | NodeKind::Section => Ok(Type::NOT_APPLICABLE),

            NodeKind::EachExpression => self.infer_child(node, attr::EACH_BODY),
            NodeKind::ParenthesizedExpression => self.infer_child(node, attr::WRAPPED_CONTENT),
            NodeKind::AsType
            | NodeKind::AsNullablePrimitiveType
            | NodeKind::IsNullablePrimitiveType
            | NodeKind::FieldTypeSpecification
            | NodeKind::OtherwiseExpression => self.infer_child(node, attr::PAIRED),
            NodeKind::NullableType | NodeKind::NullablePrimitiveType => {
                Ok(self.infer_child(node, attr::PAIRED)?.with_nullable(true))
            }
            NodeKind::AsExpression => self.infer_child(node, attr::AS_RIGHT),
            NodeKind::Csv => self.infer_child(node, attr::CSV_NODE),
            NodeKind::LetExpression => self.infer_child(node, attr::LET_BODY),
            NodeKind::MetadataExpression | NodeKind::RangeExpression => {
                self.infer_child(node, attr::BIN_OP_LEFT)
            }
            NodeKind::GeneralizedIdentifierPairedAnyLiteral
            | NodeKind::GeneralizedIdentifierPairedExpression
            | NodeKind::IdentifierPairedExpression => self.infer_child(node, attr::PAIR_VALUE),
            NodeKind::SectionMember => self.infer_child(node, attr::SECTION_MEMBER_PAIR),

            NodeKind::IsExpression => Ok(Type::LOGICAL),
            NodeKind::ErrorRaisingExpression | NodeKind::NotImplementedExpression => Ok(Type::NONE),

            NodeKind::LiteralExpression => self.infer_literal(node),
            NodeKind::PrimitiveType => self.infer_primitive_type(node),
            NodeKind::ArithmeticExpression
            | NodeKind::EqualityExpression
            | NodeKind::LogicalExpression
            | NodeKind::RelationalExpression => self.infer_bin_op(node),
            NodeKind::UnaryExpression => self.infer_unary(node),
            NodeKind::NullCoalescingExpression => self.infer_null_coalescing(node),
            NodeKind::ErrorHandlingExpression => self.infer_error_handling(node),
            NodeKind::IfExpression => self.infer_if(node),

            NodeKind::ListExpression | NodeKind::ListLiteral => self.infer_list(node),
            NodeKind::RecordExpression | NodeKind::RecordLiteral => self.infer_record(node),
            NodeKind::FunctionExpression => self.infer_function(node),
            NodeKind::Parameter => self.infer_parameter(node),

            NodeKind::Identifier => self.infer_identifier(node),
            NodeKind::IdentifierExpression => self.infer_dereferenced(node),

            NodeKind::RecursivePrimaryExpression => self.infer_recursive_primary(node),
            NodeKind::InvokeExpression => self.infer_invoke(node),
            NodeKind::FieldSelector => self.infer_field_selector(node),
            NodeKind::FieldProjection => self.infer_field_projection(node),
            NodeKind::ItemAccessExpression => self.infer_item_access(node),

            NodeKind::TypePrimaryType => self.infer_type_primary(node),
            NodeKind::RecordType => self.infer_record_type(node),
            NodeKind::TableType => self.infer_table_type(node),
            NodeKind::ListType => Ok(Type::ListType {
                item_type: Box::new(self.infer_child(node, attr::WRAPPED_CONTENT)?),
                is_nullable: false,
            }),
            NodeKind::FunctionType => self.infer_function_type(node),
            NodeKind::FieldSpecification => {
                match self.optional_child(node, attr::FIELD_SPECIFICATION_TYPE)? {
                    Some(specification) => self.infer_xor(specification),
                    None => Ok(Type::ANY),
                }
            }
        }
    }

    // -- helpers

    /// A child the grammar requires once the node is complete.
    fn child(
        &self,
        parent: XorNode<'a>,
        attribute_index: u32,
    ) -> Result<Option<XorNode<'a>>, InspectionError> {
        let graph = self.graph;

        graph.maybe_required_child(parent, attribute_index, None)
    }

    /// A child that may be absent even in a complete node (`?`, `otherwise`, ...).
    fn optional_child(
        &self,
        parent: XorNode<'a>,
        attribute_index: u32,
    ) -> Result<Option<XorNode<'a>>, InspectionError> {
        let graph = self.graph;

        graph.maybe_child_by_attribute_index(parent.id(), attribute_index, None)
    }

    /// Type of a child, `unknown` while it has not been written.
    fn infer_child(
        &mut self,
        parent: XorNode<'a>,
        attribute_index: u32,
    ) -> Result<Type, InspectionError> {
        match self.child(parent, attribute_index)? {
            Some(child) => self.infer_xor(child),
            None => Ok(Type::UNKNOWN),
        }
    }

    fn is_optional(&self, node: XorNode<'a>) -> Result<bool, InspectionError> {
        Ok(self.optional_child(node, attr::WRAPPED_OPTIONAL)?.is_some())
    }

    // -- leaves

    fn infer_literal(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        match node.ast().and_then(AstNode::literal) {
            Some((LiteralKind::Logical, _)) => Ok(Type::LOGICAL),
            Some((LiteralKind::Null, _)) => Ok(Type::NULL),
            Some((LiteralKind::Numeric, _)) => Ok(Type::NUMBER),
            Some((LiteralKind::Text, _)) => Ok(Type::TEXT),
            None if node.is_ast() => Err(InspectionError::missing_payload(node.id(), node.kind())),
            None => Ok(Type::UNKNOWN),
        }
    }

    fn infer_primitive_type(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        match node.ast().and_then(AstNode::primitive_type_kind) {
            Some(kind) => Ok(Type::of(kind.into())),
            None if node.is_ast() => Err(InspectionError::missing_payload(node.id(), node.kind())),
            None => Ok(Type::UNKNOWN),
        }
    }

    // -- operators

    fn infer_bin_op(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let left = match self.child(node, attr::BIN_OP_LEFT)? {
            Some(left) => self.infer_xor(left)?,
            None => return Ok(Type::UNKNOWN),
        };
        let op = match self
            .child(node, attr::BIN_OP_OPERATOR)?
            .and_then(|n| n.constant_kind())
        {
            Some(op) => op,
            None => return Ok(Type::UNKNOWN),
        };

        match self.child(node, attr::BIN_OP_RIGHT)? {
            Some(right) => {
                let right = self.infer_xor(right)?;
                Ok(bin_op_type(&left, op, &right))
            }
            None => Ok(right_operand_hint(&left, op)),
        }
    }

    fn infer_unary(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let operand = self.infer_child(node, attr::UNARY_OPERAND)?;

        if operand.is_unknown() || operand.kind() == TypeKind::Any {
            return Ok(operand);
        }

        let operators: Vec<ConstantKind> = match self.child(node, attr::UNARY_OPERATORS)? {
            Some(wrapper) => graph
                .children(wrapper.id())?
                .iter()
                .filter_map(|op| op.constant_kind())
                .collect(),
            None => vec![],
        };
        let admissible: &[ConstantKind] = match operand.kind() {
            TypeKind::Number => &[ConstantKind::Plus, ConstantKind::Minus],
            TypeKind::Logical => &[ConstantKind::Not],
            _ => &[],
        };

        if operators.iter().all(|op| admissible.contains(op)) {
            Ok(operand)
        } else {
            Ok(Type::NONE)
        }
    }

    fn infer_null_coalescing(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let left = self.infer_child(node, attr::BIN_OP_LEFT)?;
        let right = self.infer_child(node, attr::BIN_OP_RIGHT)?;

        Ok(Type::any_union(vec![left.with_nullable(false), right]))
    }

    fn infer_error_handling(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let protected = self.infer_child(node, attr::ERROR_HANDLING_PROTECTED)?;

        match self.optional_child(node, attr::ERROR_HANDLING_OTHERWISE)? {
            Some(otherwise) => {
                let otherwise = self.infer_xor(otherwise)?;
                Ok(Type::any_union(vec![protected, otherwise]))
            }
            // `try x` without `otherwise` produces a record describing the outcome
            None => Ok(Type::RECORD),
        }
    }

    fn infer_if(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        if let Some(condition) = self.child(node, attr::IF_CONDITION)? {
            let condition = self.infer_xor(condition)?;

            if !is_logical_condition(&condition) {
                return Ok(Type::NONE);
            }
        }

        let true_branch = self.infer_child(node, attr::IF_TRUE)?;
        let false_branch = self.infer_child(node, attr::IF_FALSE)?;

        Ok(Type::any_union(vec![true_branch, false_branch]))
    }

    // -- constructors

    fn infer_list(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let elements = match self.child(node, attr::WRAPPED_CONTENT)? {
            Some(wrapper) => iter::array_wrapper_contents(graph, wrapper)?,
            None => vec![],
        };
        let mut types = Vec::with_capacity(elements.len());

        for element in elements {
            types.push(self.infer_xor(element)?);
        }

        Ok(Type::DefinedList {
            elements: types,
            is_nullable: false,
        })
    }

    fn infer_record(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let mut fields = FieldMap::new();

        for kv in iter::record_key_value_pairs(graph, node)? {
            let ty = match kv.maybe_value {
                Some(value) => self.infer_xor(value)?,
                None => Type::UNKNOWN,
            };
            fields.insert(kv.key.to_string(), ty);
        }

        Ok(Type::DefinedRecord {
            fields,
            is_open: false,
            is_nullable: false,
        })
    }

    fn infer_function(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let signature = FunctionSignature::analyze(graph, node)?;
        let body = self.infer_child(node, attr::FUNCTION_BODY)?;
        let return_type = match signature.maybe_return_type {
            Some((kind, is_nullable)) => {
                let declared = declared_type(kind, is_nullable);
                match reconcile_return_type(declared, body) {
                    Some(return_type) => return_type,
                    None => return Ok(Type::NONE),
                }
            }
            None => body,
        };

        Ok(Type::DefinedFunction {
            parameters: signature
                .parameters
                .into_iter()
                .map(function_parameter)
                .collect(),
            return_type: Box::new(return_type),
            is_nullable: false,
        })
    }

    fn infer_parameter(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;

        Ok(match ParameterSignature::analyze(graph, node)? {
            Some(parameter) => {
                parameter_type(parameter.maybe_type, parameter.is_nullable, parameter.is_optional)
            }
            None => Type::UNKNOWN,
        })
    }

    // -- identifiers

    fn infer_identifier(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;

        if let Some(parent) = graph.parent_xor(node.id())? {
            match (parent.kind(), node.maybe_attribute_index()) {
                // hovering the key of a `let` binding
                (NodeKind::IdentifierPairedExpression, Some(attr::PAIR_KEY)) => {
                    return self.infer_child(parent, attr::PAIR_VALUE)
                }
                (NodeKind::IdentifierExpression, _) | (NodeKind::Parameter, _) => {
                    return self.infer_xor(parent)
                }
                _ => {}
            }
        }

        self.infer_dereferenced(node)
    }

    fn infer_dereferenced(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        match self.dereference(node)? {
            Dereferenced::Item(item) => self.infer_scope_item(&item),
            Dereferenced::Recursive => Ok(Type::ANY),
        }
    }

    pub(super) fn infer_scope_item(&mut self, item: &ScopeItem) -> Result<Type, InspectionError> {
        match item {
            ScopeItem::Each { each_expression } => self.infer(*each_expression),
            ScopeItem::KeyValuePair { maybe_value, .. }
            | ScopeItem::SectionMember { maybe_value, .. } => match maybe_value {
                Some(value) => self.infer(*value),
                None => Ok(Type::UNKNOWN),
            },
            ScopeItem::Parameter {
                is_nullable,
                is_optional,
                maybe_type,
                ..
            } => Ok(parameter_type(*maybe_type, *is_nullable, *is_optional)),
            ScopeItem::Undefined { .. } => Ok(Type::UNKNOWN),
        }
    }

    // -- recursive primary expressions: `head tail[0] tail[1] ...`

    fn infer_recursive_primary(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;

        if let Some(tail) = self.child(node, attr::RECURSIVE_PRIMARY_TAIL)? {
            if let Some(last) = graph.child_ids(tail.id()).last() {
                return self.infer(*last);
            }
        }

        self.infer_child(node, attr::RECURSIVE_PRIMARY_HEAD)
    }

    /// The element a tail element applies to: the head or the preceding tail element.
    fn previous_in_chain(&self, node: XorNode<'a>) -> Result<Option<XorNode<'a>>, InspectionError> {
        let graph = self.graph;
        let wrapper = match graph.parent_xor(node.id())? {
            Some(wrapper)
                if wrapper.kind() == NodeKind::ArrayWrapper
                    && wrapper.maybe_attribute_index() == Some(attr::RECURSIVE_PRIMARY_TAIL) =>
            {
                wrapper
            }
            _ => return Ok(None),
        };
        let primary = match graph.parent_xor(wrapper.id())? {
            Some(primary) if primary.kind() == NodeKind::RecursivePrimaryExpression => primary,
            _ => return Ok(None),
        };
        let siblings = graph.child_ids(wrapper.id());

        match siblings.iter().position(|id| *id == node.id()) {
            Some(0) => self.child(primary, attr::RECURSIVE_PRIMARY_HEAD),
            Some(i) => graph.expect_xor(siblings[i - 1]).map(Some),
            None => Ok(None),
        }
    }

    /// Type of what `node` operates on. Outside of a chain, field access reads the
    /// implicit `_`, as in `each [a]`.
    fn chain_base(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        if let Some(previous) = self.previous_in_chain(node)? {
            return self.infer_xor(previous);
        }

        match node.kind() {
            NodeKind::FieldSelector | NodeKind::FieldProjection => {
                match self.lookup(node.id(), "_")? {
                    Some(item) => self.infer_scope_item(&item),
                    None => Ok(Type::UNKNOWN),
                }
            }
            _ => Ok(Type::UNKNOWN),
        }
    }

    fn infer_invoke(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let base = self.chain_base(node)?;

        Ok(invoke_result(&base))
    }

    fn infer_field_selector(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let name = match self
            .child(node, attr::WRAPPED_CONTENT)?
            .and_then(|n| n.identifier_literal())
        {
            Some(name) => name,
            None => return Ok(Type::UNKNOWN),
        };
        let is_optional = self.is_optional(node)?;
        let base = self.chain_base(node)?;

        Ok(select_field(&base, name, is_optional))
    }

    fn infer_field_projection(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let selectors = match self.child(node, attr::WRAPPED_CONTENT)? {
            Some(wrapper) => iter::array_wrapper_contents(graph, wrapper)?,
            None => vec![],
        };
        let mut names = Vec::with_capacity(selectors.len());

        for selector in selectors {
            let name = graph
                .maybe_child_by_attribute_index(selector.id(), attr::WRAPPED_CONTENT, None)?
                .and_then(|n| n.identifier_literal());
            if let Some(name) = name {
                names.push(name);
            }
        }

        let is_optional = self.is_optional(node)?;
        let base = self.chain_base(node)?;

        Ok(project_fields(&base, &names, is_optional))
    }

    fn infer_item_access(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let maybe_index = self
            .child(node, attr::WRAPPED_CONTENT)?
            .and_then(|n| n.ast())
            .and_then(AstNode::literal)
            .and_then(|(kind, literal)| match kind {
                LiteralKind::Numeric => literal.parse::<usize>().ok(),
                _ => None,
            });
        let is_optional = self.is_optional(node)?;
        let base = self.chain_base(node)?;

        Ok(access_item(&base, maybe_index, is_optional))
    }

    // -- type expressions

    fn infer_type_primary(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let denoted = self.infer_child(node, attr::PAIRED)?;

        if denoted.is_meta() {
            Ok(denoted)
        } else {
            Ok(Type::DefinedType {
                denoted: Box::new(denoted),
                is_nullable: false,
            })
        }
    }

    fn infer_field_specifications(
        &mut self,
        field_list: XorNode<'a>,
    ) -> Result<(FieldMap, bool), InspectionError> {
        let graph = self.graph;
        let (specifications, is_open) = iter::field_specifications(graph, field_list)?;
        let mut fields = FieldMap::new();

        for specification in specifications {
            let ty = match specification.maybe_type {
                Some(field_type) => self.infer_xor(field_type)?,
                None => Type::ANY,
            };
            let ty = if specification.is_optional {
                ty.with_nullable(true)
            } else {
                ty
            };
            fields.insert(specification.name.to_string(), ty);
        }

        Ok((fields, is_open))
    }

    fn infer_record_type(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let (fields, is_open) = match self.child(node, attr::RECORD_TYPE_FIELDS)? {
            Some(field_list) => self.infer_field_specifications(field_list)?,
            None => (FieldMap::new(), true),
        };

        Ok(Type::RecordType {
            fields,
            is_open,
            is_nullable: false,
        })
    }

    fn infer_table_type(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let (fields, is_open) = match self.child(node, attr::TABLE_ROW_TYPE)? {
            Some(row) if row.kind() == NodeKind::FieldSpecificationList => {
                self.infer_field_specifications(row)?
            }
            // `type table T` where `T` names a record type
            Some(row) => match self.infer_xor(row)? {
                Type::RecordType {
                    fields, is_open, ..
                } => (fields, is_open),
                _ => (FieldMap::new(), true),
            },
            None => (FieldMap::new(), true),
        };

        Ok(Type::TableType {
            fields,
            is_open,
            is_nullable: false,
        })
    }

    fn infer_function_type(&mut self, node: XorNode<'a>) -> Result<Type, InspectionError> {
        let graph = self.graph;
        let signature = FunctionSignature::analyze(graph, node)?;
        let return_type = match signature.maybe_return_type {
            Some((kind, is_nullable)) => declared_type(kind, is_nullable),
            None => Type::ANY,
        };

        Ok(Type::DefinedType {
            denoted: Box::new(Type::DefinedFunction {
                parameters: signature
                    .parameters
                    .into_iter()
                    .map(function_parameter)
                    .collect(),
                return_type: Box::new(return_type),
                is_nullable: false,
            }),
            is_nullable: false,
        })
    }
}

fn shallowest(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    match (left, right) {
        (Some(left), Some(right)) => Some(left.min(right)),
        (left, right) => left.or(right),
    }
}

fn declared_type(kind: PrimitiveTypeKind, is_nullable: bool) -> Type {
    let kind = TypeKind::from(kind);

    Type::primitive(kind, is_nullable || kind.is_nullable_by_default())
}

fn parameter_type(
    maybe_type: Option<PrimitiveTypeKind>,
    is_nullable: bool,
    is_optional: bool,
) -> Type {
    match maybe_type {
        Some(kind) => declared_type(kind, is_nullable || is_optional),
        None => Type::ANY,
    }
}

fn function_parameter(parameter: ParameterSignature) -> FunctionParameter {
    FunctionParameter {
        name: parameter.name,
        is_optional: parameter.is_optional,
        is_nullable: parameter.is_nullable,
        maybe_type: parameter.maybe_type.map(TypeKind::from),
    }
}

fn is_logical_condition(condition: &Type) -> bool {
    match condition.union_members() {
        Some(members) => members
            .iter()
            .all(|member| member.kind() == TypeKind::Logical || member.is_any()),
        None => matches!(
            condition.kind(),
            TypeKind::Logical | TypeKind::Any | TypeKind::Unknown
        ),
    }
}

/// Picks the return type of a function from its declared and inferred body types.
/// `None` when they contradict each other.
fn reconcile_return_type(declared: Type, body: Type) -> Option<Type> {
    if declared.kind() == TypeKind::Any || body.is_unknown() || body.is_any() {
        return Some(if declared.kind() == TypeKind::Any { body } else { declared });
    }
    if let Some(members) = body.union_members() {
        let is_compatible = members
            .iter()
            .all(|member| member.is_any() || member.kind() == declared.kind());
        return if is_compatible { Some(body) } else { None };
    }
    if body.kind() != declared.kind() {
        return None;
    }

    Some(body)
}

fn invoke_result(callee: &Type) -> Type {
    if callee.is_unknown() {
        return Type::UNKNOWN;
    }

    match callee {
        Type::DefinedFunction { return_type, .. } if return_type.is_unknown() => Type::ANY,
        Type::DefinedFunction { return_type, .. } => (**return_type).clone(),
        _ if callee.kind() == TypeKind::Any => Type::ANY,
        Type::Primitive {
            kind: TypeKind::Function,
            ..
        } => Type::ANY,
        _ => Type::NONE,
    }
}

fn select_field(base: &Type, name: &str, is_optional: bool) -> Type {
    if base.is_unknown() {
        return Type::UNKNOWN;
    }

    match base {
        _ if base.kind() == TypeKind::Any => Type::ANY,
        Type::DefinedRecord {
            fields, is_open, ..
        }
        | Type::DefinedTable {
            fields, is_open, ..
        } => match fields.get(name) {
            Some(ty) => ty.clone(),
            None if *is_open => Type::ANY,
            None if is_optional => Type::NULL,
            None => Type::NONE,
        },
        Type::Primitive {
            kind: TypeKind::Record,
            ..
        }
        | Type::Primitive {
            kind: TypeKind::Table,
            ..
        } => Type::ANY,
        _ => Type::NONE,
    }
}

fn project_fields(base: &Type, names: &[&str], is_optional: bool) -> Type {
    if base.is_unknown() {
        return Type::UNKNOWN;
    }

    let (fields, is_open) = match base {
        _ if base.kind() == TypeKind::Any => return Type::ANY,
        Type::DefinedRecord {
            fields, is_open, ..
        }
        | Type::DefinedTable {
            fields, is_open, ..
        } => (fields, *is_open),
        Type::Primitive {
            kind: TypeKind::Record,
            ..
        }
        | Type::Primitive {
            kind: TypeKind::Table,
            ..
        } => return base.clone(),
        _ => return Type::NONE,
    };

    let mut projected = FieldMap::new();
    for name in names {
        let ty = match fields.get(*name) {
            Some(ty) => ty.clone(),
            None if is_open => Type::ANY,
            None if is_optional => Type::NULL,
            None => return Type::NONE,
        };
        projected.insert(name.to_string(), ty);
    }

    if base.kind() == TypeKind::Table {
        Type::DefinedTable {
            fields: projected,
            is_open: false,
            is_nullable: false,
        }
    } else {
        Type::DefinedRecord {
            fields: projected,
            is_open: false,
            is_nullable: false,
        }
    }
}

fn access_item(base: &Type, maybe_index: Option<usize>, is_optional: bool) -> Type {
    if base.is_unknown() {
        return Type::UNKNOWN;
    }

    let ty = match base {
        _ if base.kind() == TypeKind::Any => return Type::ANY,
        Type::DefinedList { elements, .. } => match maybe_index {
            Some(index) => match elements.get(index) {
                Some(element) => element.clone(),
                None if is_optional => Type::NULL,
                None => Type::NONE,
            },
            None => Type::any_union(elements.clone()),
        },
        Type::Primitive {
            kind: TypeKind::List,
            ..
        } => Type::ANY,
        Type::DefinedTable {
            fields, is_open, ..
        } => Type::DefinedRecord {
            fields: fields.clone(),
            is_open: *is_open,
            is_nullable: false,
        },
        Type::Primitive {
            kind: TypeKind::Table,
            ..
        } => Type::RECORD,
        _ => return Type::NONE,
    };

    if is_optional && !ty.is_none() {
        ty.with_nullable(true)
    } else {
        ty
    }
}
