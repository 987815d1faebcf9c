//! Iteration over the repeated parts of a construct: csv lists, key/value pairs and
//! field specifications.
use super::kind::attr;
use super::{NodeId, NodeIdMap, NodeKind, XorNode};
use crate::errors::InspectionError;

/// A `key = value` pair of a record, `let` or section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyValuePair<'a> {
    pub pair: XorNode<'a>,
    pub key: &'a str,
    pub key_node: XorNode<'a>,
    /// Absent while the user has not typed the value yet.
    pub maybe_value: Option<XorNode<'a>>,
}

impl KeyValuePair<'_> {
    pub fn key_node_id(&self) -> NodeId {
        self.key_node.id()
    }
}

/// The elements of an `ArrayWrapper`, looking through `Csv` nodes.
pub fn array_wrapper_contents<'a>(
    graph: &'a NodeIdMap,
    wrapper: XorNode<'a>,
) -> Result<Vec<XorNode<'a>>, InspectionError> {
    if wrapper.kind() != NodeKind::ArrayWrapper {
        return Err(InspectionError::unexpected_kind(
            wrapper.id(),
            &[NodeKind::ArrayWrapper],
            wrapper.kind(),
        ));
    }

    let mut contents = vec![];

    for child in graph.children(wrapper.id())? {
        if child.kind() == NodeKind::Csv {
            if let Some(node) = graph.maybe_required_child(child, attr::CSV_NODE, None)? {
                contents.push(node);
            }
        } else {
            contents.push(child);
        }
    }

    Ok(contents)
}

/// The contents of the array wrapper at `attribute_index`, or nothing if a context
/// node has not reached it yet.
fn wrapped_contents<'a>(
    graph: &'a NodeIdMap,
    node: XorNode<'a>,
    attribute_index: u32,
) -> Result<Vec<XorNode<'a>>, InspectionError> {
    match graph.maybe_required_child(node, attribute_index, Some(&[NodeKind::ArrayWrapper]))? {
        Some(wrapper) => array_wrapper_contents(graph, wrapper),
        None => Ok(vec![]),
    }
}

fn key_value_pair<'a>(
    graph: &'a NodeIdMap,
    pair: XorNode<'a>,
) -> Result<Option<KeyValuePair<'a>>, InspectionError> {
    if !pair.kind().is_key_value_pair() {
        return Err(InspectionError::unexpected_kind(
            pair.id(),
            &[
                NodeKind::GeneralizedIdentifierPairedAnyLiteral,
                NodeKind::GeneralizedIdentifierPairedExpression,
                NodeKind::IdentifierPairedExpression,
            ],
            pair.kind(),
        ));
    }

    let key_node = match graph.maybe_required_child(
        pair,
        attr::PAIR_KEY,
        Some(&[NodeKind::Identifier, NodeKind::GeneralizedIdentifier]),
    )? {
        Some(key_node) => key_node,
        None => return Ok(None),
    };
    let key = match key_node.identifier_literal() {
        Some(key) => key,
        None if key_node.is_ast() => {
            return Err(InspectionError::missing_payload(key_node.id(), key_node.kind()))
        }
        None => return Ok(None),
    };
    let maybe_value = graph.maybe_child_by_attribute_index(pair.id(), attr::PAIR_VALUE, None)?;

    Ok(Some(KeyValuePair {
        pair,
        key,
        key_node,
        maybe_value,
    }))
}

fn key_value_pairs<'a>(
    graph: &'a NodeIdMap,
    pairs: Vec<XorNode<'a>>,
) -> Result<Vec<KeyValuePair<'a>>, InspectionError> {
    let mut result = Vec::with_capacity(pairs.len());

    for pair in pairs {
        if let Some(kv) = key_value_pair(graph, pair)? {
            result.push(kv);
        }
    }

    Ok(result)
}

/// Fields of a `RecordExpression` or `RecordLiteral`.
pub fn record_key_value_pairs<'a>(
    graph: &'a NodeIdMap,
    record: XorNode<'a>,
) -> Result<Vec<KeyValuePair<'a>>, InspectionError> {
    let pairs = wrapped_contents(graph, record, attr::WRAPPED_CONTENT)?;

    key_value_pairs(graph, pairs)
}

/// Bindings of a `LetExpression`.
pub fn let_key_value_pairs<'a>(
    graph: &'a NodeIdMap,
    let_expression: XorNode<'a>,
) -> Result<Vec<KeyValuePair<'a>>, InspectionError> {
    let pairs = wrapped_contents(graph, let_expression, attr::LET_BINDINGS)?;

    key_value_pairs(graph, pairs)
}

/// Members of a `Section`. Members are not comma separated, so the wrapper holds
/// `SectionMember` nodes directly.
pub fn section_key_value_pairs<'a>(
    graph: &'a NodeIdMap,
    section: XorNode<'a>,
) -> Result<Vec<KeyValuePair<'a>>, InspectionError> {
    let mut pairs = vec![];

    for member in wrapped_contents(graph, section, attr::SECTION_MEMBERS)? {
        if member.kind() != NodeKind::SectionMember {
            return Err(InspectionError::unexpected_kind(
                member.id(),
                &[NodeKind::SectionMember],
                member.kind(),
            ));
        }
        if let Some(pair) = graph.maybe_required_child(
            member,
            attr::SECTION_MEMBER_PAIR,
            Some(&[NodeKind::IdentifierPairedExpression]),
        )? {
            pairs.push(pair);
        }
    }

    key_value_pairs(graph, pairs)
}

/// A field of a record or table type: `[optional] name [= type]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpecification<'a> {
    pub name: &'a str,
    pub is_optional: bool,
    pub maybe_type: Option<XorNode<'a>>,
}

/// Fields of a `FieldSpecificationList` and whether it ends with `...`.
pub fn field_specifications<'a>(
    graph: &'a NodeIdMap,
    field_list: XorNode<'a>,
) -> Result<(Vec<FieldSpecification<'a>>, bool), InspectionError> {
    let mut fields = vec![];

    for spec in wrapped_contents(graph, field_list, attr::WRAPPED_CONTENT)? {
        let name = graph
            .maybe_child_by_attribute_index(spec.id(), attr::FIELD_SPECIFICATION_NAME, None)?
            .and_then(|n| n.identifier_literal());
        let name = match name {
            Some(name) => name,
            None => continue,
        };
        let is_optional = graph
            .maybe_child_by_attribute_index(spec.id(), attr::FIELD_SPECIFICATION_OPTIONAL, None)?
            .is_some();
        let maybe_type = match graph.maybe_child_by_attribute_index(
            spec.id(),
            attr::FIELD_SPECIFICATION_TYPE,
            Some(&[NodeKind::FieldTypeSpecification]),
        )? {
            Some(type_spec) => {
                graph.maybe_child_by_attribute_index(type_spec.id(), attr::PAIRED, None)?
            }
            None => None,
        };

        fields.push(FieldSpecification {
            name,
            is_optional,
            maybe_type,
        });
    }

    let is_open = graph
        .maybe_child_by_attribute_index(field_list.id(), attr::FIELD_LIST_OPEN_MARKER, None)?
        .is_some();

    Ok((fields, is_open))
}
