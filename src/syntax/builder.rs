use super::kind::attr;
use super::{
    AstNode, AstPayload, ConstantKind, ContextNode, LiteralKind, NodeId, NodeIdMap, NodeKind,
    PrimitiveTypeKind,
};

/// Builds a `NodeIdMap` bottom-up: children are created first and attached when
/// their parent is created.
///
/// ```ignore
/// // [a = b, b = 1]
/// let mut b = NodeIdMapBuilder::new();
/// let value_a = b.identifier_expression("b");
/// let value_b = b.numeric_literal("1");
/// let record = b.record_expression(&[("a", value_a), ("b", value_b)]);
/// let graph = b.finish();
/// ```
#[derive(Debug, Default)]
pub struct NodeIdMapBuilder {
    graph: NodeIdMap,
    next_id: NodeId,
}

impl NodeIdMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> NodeIdMap {
        self.graph
    }

    pub fn graph(&self) -> &NodeIdMap {
        &self.graph
    }

    fn next_id(&mut self) -> NodeId {
        self.next_id += 1;
        self.next_id
    }

    fn attach(&mut self, parent_id: NodeId, children: &[(u32, NodeId)]) {
        for (attribute_index, child_id) in children {
            self.graph.set_attribute_index(*child_id, *attribute_index);
            self.graph.link(parent_id, *child_id);
        }
    }

    // -- primitives

    pub fn ast(
        &mut self,
        kind: NodeKind,
        payload: AstPayload,
        children: &[(u32, NodeId)],
    ) -> NodeId {
        let id = self.next_id();

        self.graph.insert_ast(AstNode {
            id,
            kind,
            maybe_attribute_index: None,
            payload,
        });
        if children.is_empty() {
            self.graph.mark_leaf(id);
        }
        self.attach(id, children);
        id
    }

    /// A construct the parser has started but not finished.
    pub fn context(&mut self, kind: NodeKind, children: &[(u32, NodeId)]) -> NodeId {
        let id = self.next_id();

        self.graph.insert_context(ContextNode {
            id,
            kind,
            maybe_attribute_index: None,
        });
        self.attach(id, children);
        id
    }

    fn node(&mut self, kind: NodeKind, children: &[(u32, NodeId)]) -> NodeId {
        self.ast(kind, AstPayload::None, children)
    }

    pub fn constant(&mut self, kind: ConstantKind) -> NodeId {
        self.ast(NodeKind::Constant, AstPayload::Constant(kind), &[])
    }

    pub fn identifier(&mut self, literal: &str) -> NodeId {
        self.ast(
            NodeKind::Identifier,
            AstPayload::Identifier(literal.to_string()),
            &[],
        )
    }

    pub fn generalized_identifier(&mut self, literal: &str) -> NodeId {
        self.ast(
            NodeKind::GeneralizedIdentifier,
            AstPayload::Identifier(literal.to_string()),
            &[],
        )
    }

    pub fn identifier_expression(&mut self, literal: &str) -> NodeId {
        let identifier = self.identifier(literal);

        self.node(
            NodeKind::IdentifierExpression,
            &[(attr::IDENTIFIER_EXPRESSION_IDENTIFIER, identifier)],
        )
    }

    /// `@name`, a reference to the binding currently being defined.
    pub fn inclusive_identifier_expression(&mut self, literal: &str) -> NodeId {
        let at = self.constant(ConstantKind::AtSign);
        let identifier = self.identifier(literal);

        self.node(
            NodeKind::IdentifierExpression,
            &[
                (attr::IDENTIFIER_EXPRESSION_INCLUSIVE, at),
                (attr::IDENTIFIER_EXPRESSION_IDENTIFIER, identifier),
            ],
        )
    }

    pub fn literal(&mut self, kind: LiteralKind, literal: &str) -> NodeId {
        self.ast(
            NodeKind::LiteralExpression,
            AstPayload::Literal {
                kind,
                literal: literal.to_string(),
            },
            &[],
        )
    }

    pub fn numeric_literal(&mut self, literal: &str) -> NodeId {
        self.literal(LiteralKind::Numeric, literal)
    }

    pub fn text_literal(&mut self, literal: &str) -> NodeId {
        self.literal(LiteralKind::Text, &format!("\"{}\"", literal))
    }

    pub fn logical_literal(&mut self, value: bool) -> NodeId {
        self.literal(LiteralKind::Logical, if value { "true" } else { "false" })
    }

    pub fn null_literal(&mut self) -> NodeId {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn primitive_type(&mut self, kind: PrimitiveTypeKind) -> NodeId {
        self.ast(NodeKind::PrimitiveType, AstPayload::PrimitiveType(kind), &[])
    }

    pub fn nullable_primitive_type(&mut self, kind: PrimitiveTypeKind) -> NodeId {
        let nullable = self.constant(ConstantKind::Nullable);
        let primitive = self.primitive_type(kind);

        self.node(
            NodeKind::NullablePrimitiveType,
            &[(0, nullable), (attr::PAIRED, primitive)],
        )
    }

    /// `as [nullable] kind`
    pub fn as_nullable_primitive_type(
        &mut self,
        kind: PrimitiveTypeKind,
        nullable: bool,
    ) -> NodeId {
        let as_constant = self.constant(ConstantKind::As);
        let paired = if nullable {
            self.nullable_primitive_type(kind)
        } else {
            self.primitive_type(kind)
        };

        self.node(
            NodeKind::AsNullablePrimitiveType,
            &[(0, as_constant), (attr::PAIRED, paired)],
        )
    }

    // -- wrappers

    /// An `ArrayWrapper` whose elements are the given nodes.
    pub fn array(&mut self, elements: &[NodeId]) -> NodeId {
        let children: Vec<_> = elements
            .iter()
            .enumerate()
            .map(|(i, id)| (i as u32, *id))
            .collect();

        self.node(NodeKind::ArrayWrapper, &children)
    }

    /// An `ArrayWrapper` of comma separated `Csv` nodes.
    pub fn csv_array(&mut self, elements: &[NodeId]) -> NodeId {
        let mut csvs = Vec::with_capacity(elements.len());

        for (i, element) in elements.iter().enumerate() {
            let csv = if i + 1 < elements.len() {
                let comma = self.constant(ConstantKind::Comma);
                self.node(NodeKind::Csv, &[(attr::CSV_NODE, *element), (1, comma)])
            } else {
                self.node(NodeKind::Csv, &[(attr::CSV_NODE, *element)])
            };
            csvs.push(csv);
        }

        self.array(&csvs)
    }

    fn wrapped(
        &mut self,
        kind: NodeKind,
        open: ConstantKind,
        content: NodeId,
        close: ConstantKind,
        maybe_optional: bool,
    ) -> NodeId {
        let open = self.constant(open);
        let close = self.constant(close);
        let mut children = vec![(0, open), (attr::WRAPPED_CONTENT, content), (2, close)];

        if maybe_optional {
            let question_mark = self.constant(ConstantKind::QuestionMark);
            children.push((attr::WRAPPED_OPTIONAL, question_mark));
        }

        self.node(kind, &children)
    }

    pub fn parenthesized(&mut self, inner: NodeId) -> NodeId {
        self.wrapped(
            NodeKind::ParenthesizedExpression,
            ConstantKind::LeftParenthesis,
            inner,
            ConstantKind::RightParenthesis,
            false,
        )
    }

    // -- expressions

    pub fn list_expression(&mut self, elements: &[NodeId]) -> NodeId {
        let content = self.csv_array(elements);

        self.wrapped(
            NodeKind::ListExpression,
            ConstantKind::LeftBrace,
            content,
            ConstantKind::RightBrace,
            false,
        )
    }

    fn pair(&mut self, kind: NodeKind, key: NodeId, value: NodeId) -> NodeId {
        let equal = self.constant(ConstantKind::Equal);

        self.node(
            kind,
            &[(attr::PAIR_KEY, key), (1, equal), (attr::PAIR_VALUE, value)],
        )
    }

    fn record(&mut self, kind: NodeKind, pair_kind: NodeKind, pairs: &[(&str, NodeId)]) -> NodeId {
        let mut pair_ids = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            let key = self.generalized_identifier(key);
            pair_ids.push(self.pair(pair_kind, key, *value));
        }

        let content = self.csv_array(&pair_ids);
        self.wrapped(
            kind,
            ConstantKind::LeftBracket,
            content,
            ConstantKind::RightBracket,
            false,
        )
    }

    /// `[key = value, ...]`
    pub fn record_expression(&mut self, pairs: &[(&str, NodeId)]) -> NodeId {
        self.record(
            NodeKind::RecordExpression,
            NodeKind::GeneralizedIdentifierPairedExpression,
            pairs,
        )
    }

    pub fn record_literal(&mut self, pairs: &[(&str, NodeId)]) -> NodeId {
        self.record(
            NodeKind::RecordLiteral,
            NodeKind::GeneralizedIdentifierPairedAnyLiteral,
            pairs,
        )
    }

    /// `name = value` as written in `let` and `section`.
    pub fn identifier_paired_expression(&mut self, name: &str, value: NodeId) -> NodeId {
        let key = self.identifier(name);

        self.pair(NodeKind::IdentifierPairedExpression, key, value)
    }

    /// `let name = value, ... in body`
    pub fn let_expression(&mut self, bindings: &[(&str, NodeId)], body: NodeId) -> NodeId {
        let mut pair_ids = Vec::with_capacity(bindings.len());

        for (name, value) in bindings {
            pair_ids.push(self.identifier_paired_expression(name, *value));
        }

        let let_constant = self.constant(ConstantKind::Let);
        let variables = self.csv_array(&pair_ids);
        let in_constant = self.constant(ConstantKind::In);

        self.node(
            NodeKind::LetExpression,
            &[
                (0, let_constant),
                (attr::LET_BINDINGS, variables),
                (2, in_constant),
                (attr::LET_BODY, body),
            ],
        )
    }

    pub fn each_expression(&mut self, body: NodeId) -> NodeId {
        let each = self.constant(ConstantKind::Each);

        self.node(NodeKind::EachExpression, &[(0, each), (attr::EACH_BODY, body)])
    }

    /// `left op right` for arithmetic, equality, logical and relational expressions.
    pub fn bin_op(
        &mut self,
        kind: NodeKind,
        left: NodeId,
        operator: ConstantKind,
        right: NodeId,
    ) -> NodeId {
        let operator = self.constant(operator);

        self.node(
            kind,
            &[
                (attr::BIN_OP_LEFT, left),
                (attr::BIN_OP_OPERATOR, operator),
                (attr::BIN_OP_RIGHT, right),
            ],
        )
    }

    pub fn unary(&mut self, operators: &[ConstantKind], operand: NodeId) -> NodeId {
        let constants: Vec<_> = operators.iter().map(|op| self.constant(*op)).collect();
        let operators = self.array(&constants);

        self.node(
            NodeKind::UnaryExpression,
            &[(attr::UNARY_OPERATORS, operators), (attr::UNARY_OPERAND, operand)],
        )
    }

    pub fn if_expression(
        &mut self,
        condition: NodeId,
        true_branch: NodeId,
        false_branch: NodeId,
    ) -> NodeId {
        let if_constant = self.constant(ConstantKind::If);
        let then_constant = self.constant(ConstantKind::Then);
        let else_constant = self.constant(ConstantKind::Else);

        self.node(
            NodeKind::IfExpression,
            &[
                (0, if_constant),
                (attr::IF_CONDITION, condition),
                (2, then_constant),
                (attr::IF_TRUE, true_branch),
                (4, else_constant),
                (attr::IF_FALSE, false_branch),
            ],
        )
    }

    pub fn as_expression(&mut self, left: NodeId, right_type: NodeId) -> NodeId {
        let as_constant = self.constant(ConstantKind::As);

        self.node(
            NodeKind::AsExpression,
            &[(0, left), (1, as_constant), (attr::AS_RIGHT, right_type)],
        )
    }

    pub fn is_expression(&mut self, left: NodeId, right_type: NodeId) -> NodeId {
        let is_constant = self.constant(ConstantKind::Is);

        self.node(
            NodeKind::IsExpression,
            &[(0, left), (1, is_constant), (attr::AS_RIGHT, right_type)],
        )
    }

    /// `[optional] name [as [nullable] kind]`
    pub fn parameter(
        &mut self,
        name: &str,
        is_optional: bool,
        maybe_type: Option<(PrimitiveTypeKind, bool)>,
    ) -> NodeId {
        let mut children = Vec::with_capacity(3);

        if is_optional {
            children.push((attr::PARAMETER_OPTIONAL, self.constant(ConstantKind::Optional)));
        }
        children.push((attr::PARAMETER_NAME, self.identifier(name)));
        if let Some((kind, nullable)) = maybe_type {
            children.push((
                attr::PARAMETER_TYPE,
                self.as_nullable_primitive_type(kind, nullable),
            ));
        }

        self.node(NodeKind::Parameter, &children)
    }

    pub fn parameter_list(&mut self, parameters: &[NodeId]) -> NodeId {
        let content = self.csv_array(parameters);

        self.wrapped(
            NodeKind::ParameterList,
            ConstantKind::LeftParenthesis,
            content,
            ConstantKind::RightParenthesis,
            false,
        )
    }

    /// `(parameters) [as kind] => body`
    pub fn function_expression(
        &mut self,
        parameters: &[NodeId],
        maybe_return_type: Option<(PrimitiveTypeKind, bool)>,
        body: NodeId,
    ) -> NodeId {
        let mut children = Vec::with_capacity(4);

        children.push((attr::FUNCTION_PARAMETERS, self.parameter_list(parameters)));
        if let Some((kind, nullable)) = maybe_return_type {
            children.push((
                attr::FUNCTION_RETURN_TYPE,
                self.as_nullable_primitive_type(kind, nullable),
            ));
        }
        children.push((2, self.constant(ConstantKind::FatArrow)));
        children.push((attr::FUNCTION_BODY, body));

        self.node(NodeKind::FunctionExpression, &children)
    }

    /// `head tail[0] tail[1] ...`, e.g. `f(1)[a]`
    pub fn recursive_primary(&mut self, head: NodeId, tail: &[NodeId]) -> NodeId {
        let tail = self.array(tail);

        self.node(
            NodeKind::RecursivePrimaryExpression,
            &[
                (attr::RECURSIVE_PRIMARY_HEAD, head),
                (attr::RECURSIVE_PRIMARY_TAIL, tail),
            ],
        )
    }

    pub fn invoke(&mut self, arguments: &[NodeId]) -> NodeId {
        let content = self.csv_array(arguments);

        self.wrapped(
            NodeKind::InvokeExpression,
            ConstantKind::LeftParenthesis,
            content,
            ConstantKind::RightParenthesis,
            false,
        )
    }

    pub fn field_selector(&mut self, name: &str, is_optional: bool) -> NodeId {
        let name = self.generalized_identifier(name);

        self.wrapped(
            NodeKind::FieldSelector,
            ConstantKind::LeftBracket,
            name,
            ConstantKind::RightBracket,
            is_optional,
        )
    }

    pub fn field_projection(&mut self, names: &[&str], is_optional: bool) -> NodeId {
        let selectors: Vec<_> = names
            .iter()
            .map(|name| self.field_selector(name, false))
            .collect();
        let content = self.csv_array(&selectors);

        self.wrapped(
            NodeKind::FieldProjection,
            ConstantKind::LeftBracket,
            content,
            ConstantKind::RightBracket,
            is_optional,
        )
    }

    pub fn item_access(&mut self, index: NodeId, is_optional: bool) -> NodeId {
        self.wrapped(
            NodeKind::ItemAccessExpression,
            ConstantKind::LeftBrace,
            index,
            ConstantKind::RightBrace,
            is_optional,
        )
    }

    /// `section; shared name = value; ...`
    pub fn section(&mut self, members: &[(&str, NodeId)]) -> NodeId {
        let mut member_ids = Vec::with_capacity(members.len());

        for (name, value) in members {
            let shared = self.constant(ConstantKind::Shared);
            let pair = self.identifier_paired_expression(name, *value);
            let semicolon = self.constant(ConstantKind::Semicolon);

            member_ids.push(self.node(
                NodeKind::SectionMember,
                &[(1, shared), (attr::SECTION_MEMBER_PAIR, pair), (3, semicolon)],
            ));
        }

        let section = self.constant(ConstantKind::Section);
        let semicolon = self.constant(ConstantKind::Semicolon);
        let members = self.array(&member_ids);

        self.node(
            NodeKind::Section,
            &[(1, section), (3, semicolon), (attr::SECTION_MEMBERS, members)],
        )
    }

    // -- type expressions

    /// `[optional] name [= type]`
    pub fn field_specification(
        &mut self,
        name: &str,
        is_optional: bool,
        maybe_type: Option<NodeId>,
    ) -> NodeId {
        let mut children = Vec::with_capacity(3);

        if is_optional {
            children.push((
                attr::FIELD_SPECIFICATION_OPTIONAL,
                self.constant(ConstantKind::Optional),
            ));
        }
        children.push((attr::FIELD_SPECIFICATION_NAME, self.generalized_identifier(name)));
        if let Some(field_type) = maybe_type {
            let equal = self.constant(ConstantKind::Equal);
            let specification = self.node(
                NodeKind::FieldTypeSpecification,
                &[(0, equal), (attr::PAIRED, field_type)],
            );
            children.push((attr::FIELD_SPECIFICATION_TYPE, specification));
        }

        self.node(NodeKind::FieldSpecification, &children)
    }

    pub fn field_specification_list(
        &mut self,
        fields: &[(&str, Option<NodeId>)],
        is_open: bool,
    ) -> NodeId {
        let specifications: Vec<_> = fields
            .iter()
            .map(|(name, maybe_type)| self.field_specification(name, false, *maybe_type))
            .collect();
        let open = self.constant(ConstantKind::LeftBracket);
        let content = self.csv_array(&specifications);
        let close = self.constant(ConstantKind::RightBracket);
        let mut children = vec![(0, open), (attr::WRAPPED_CONTENT, content), (2, close)];

        if is_open {
            children.push((attr::FIELD_LIST_OPEN_MARKER, self.constant(ConstantKind::Ellipsis)));
        }

        self.node(NodeKind::FieldSpecificationList, &children)
    }

    /// `[a = number, ...]` in type position.
    pub fn record_type(&mut self, fields: &[(&str, Option<NodeId>)], is_open: bool) -> NodeId {
        let fields = self.field_specification_list(fields, is_open);

        self.node(NodeKind::RecordType, &[(attr::RECORD_TYPE_FIELDS, fields)])
    }

    pub fn table_type(&mut self, fields: &[(&str, Option<NodeId>)], is_open: bool) -> NodeId {
        let table = self.constant(ConstantKind::Table);
        let fields = self.field_specification_list(fields, is_open);

        self.node(
            NodeKind::TableType,
            &[(0, table), (attr::TABLE_ROW_TYPE, fields)],
        )
    }

    pub fn list_type(&mut self, item_type: NodeId) -> NodeId {
        self.wrapped(
            NodeKind::ListType,
            ConstantKind::LeftBrace,
            item_type,
            ConstantKind::RightBrace,
            false,
        )
    }

    pub fn nullable_type(&mut self, inner: NodeId) -> NodeId {
        let nullable = self.constant(ConstantKind::Nullable);

        self.node(NodeKind::NullableType, &[(0, nullable), (attr::PAIRED, inner)])
    }

    /// `type T`
    pub fn type_primary(&mut self, inner: NodeId) -> NodeId {
        let type_constant = self.constant(ConstantKind::Type);

        self.node(
            NodeKind::TypePrimaryType,
            &[(0, type_constant), (attr::PAIRED, inner)],
        )
    }

    pub fn as_type(&mut self, inner: NodeId) -> NodeId {
        let as_constant = self.constant(ConstantKind::As);

        self.node(NodeKind::AsType, &[(0, as_constant), (attr::PAIRED, inner)])
    }

    /// A parameter of a function type: `[optional] name as T`
    pub fn type_parameter(
        &mut self,
        name: &str,
        is_optional: bool,
        parameter_type: NodeId,
    ) -> NodeId {
        let mut children = Vec::with_capacity(3);

        if is_optional {
            children.push((attr::PARAMETER_OPTIONAL, self.constant(ConstantKind::Optional)));
        }
        children.push((attr::PARAMETER_NAME, self.identifier(name)));
        children.push((attr::PARAMETER_TYPE, self.as_type(parameter_type)));

        self.node(NodeKind::Parameter, &children)
    }

    /// `function (parameters) as T`
    pub fn function_type(&mut self, parameters: &[NodeId], return_type: NodeId) -> NodeId {
        let function = self.constant(ConstantKind::Function);
        let parameters = self.parameter_list(parameters);
        let return_type = self.as_type(return_type);

        self.node(
            NodeKind::FunctionType,
            &[
                (0, function),
                (attr::FUNCTION_TYPE_PARAMETERS, parameters),
                (attr::FUNCTION_TYPE_RETURN, return_type),
            ],
        )
    }
}
