use super::iter::array_wrapper_contents;
use super::kind::attr;
use super::{NodeId, NodeIdMap, NodeKind, PrimitiveTypeKind, XorNode};
use crate::errors::InspectionError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSignature {
    pub id: NodeId,
    pub name: String,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub maybe_type: Option<PrimitiveTypeKind>,
}

/// Parameters and declared return type of a function expression or function type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    pub parameters: Vec<ParameterSignature>,
    pub maybe_return_type: Option<(PrimitiveTypeKind, bool)>,
}

impl FunctionSignature {
    pub fn analyze(
        graph: &NodeIdMap,
        function: XorNode<'_>,
    ) -> Result<FunctionSignature, InspectionError> {
        let (parameters_attr, return_attr) = match function.kind() {
            NodeKind::FunctionExpression => (attr::FUNCTION_PARAMETERS, attr::FUNCTION_RETURN_TYPE),
            NodeKind::FunctionType => (attr::FUNCTION_TYPE_PARAMETERS, attr::FUNCTION_TYPE_RETURN),
            kind => {
                return Err(InspectionError::unexpected_kind(
                    function.id(),
                    &[NodeKind::FunctionExpression, NodeKind::FunctionType],
                    kind,
                ))
            }
        };

        let mut parameters = vec![];

        if let Some(list) = graph.maybe_required_child(
            function,
            parameters_attr,
            Some(&[NodeKind::ParameterList]),
        )? {
            if let Some(wrapper) = graph.maybe_required_child(
                list,
                attr::WRAPPED_CONTENT,
                Some(&[NodeKind::ArrayWrapper]),
            )? {
                for parameter in array_wrapper_contents(graph, wrapper)? {
                    if let Some(parameter) = ParameterSignature::analyze(graph, parameter)? {
                        parameters.push(parameter);
                    }
                }
            }
        }

        let maybe_return_type =
            match graph.maybe_child_by_attribute_index(function.id(), return_attr, None)? {
                Some(annotation) => type_annotation(graph, annotation)?,
                None => None,
            };

        Ok(FunctionSignature {
            parameters,
            maybe_return_type,
        })
    }
}

impl ParameterSignature {
    /// Reads a single `Parameter` node. Yields nothing while the name is missing.
    pub fn analyze(
        graph: &NodeIdMap,
        parameter: XorNode<'_>,
    ) -> Result<Option<ParameterSignature>, InspectionError> {
        if parameter.kind() != NodeKind::Parameter {
            return Err(InspectionError::unexpected_kind(
                parameter.id(),
                &[NodeKind::Parameter],
                parameter.kind(),
            ));
        }

        let name = graph
            .maybe_child_by_attribute_index(
                parameter.id(),
                attr::PARAMETER_NAME,
                Some(&[NodeKind::Identifier]),
            )?
            .and_then(|n| n.identifier_literal());
        let name = match name {
            Some(name) => name.to_string(),
            None => return Ok(None),
        };
        let is_optional = graph
            .maybe_child_by_attribute_index(parameter.id(), attr::PARAMETER_OPTIONAL, None)?
            .map_or(false, |n| n.kind() == NodeKind::Constant);
        let maybe_annotation =
            graph.maybe_child_by_attribute_index(parameter.id(), attr::PARAMETER_TYPE, None)?;
        let annotation = match maybe_annotation {
            Some(annotation) => type_annotation(graph, annotation)?,
            None => None,
        };
        let (maybe_type, is_nullable) = match annotation {
            Some((kind, is_nullable)) => (Some(kind), is_nullable),
            None => (None, true),
        };

        Ok(Some(ParameterSignature {
            id: parameter.id(),
            name,
            is_optional,
            is_nullable,
            maybe_type,
        }))
    }
}

/// Reads `as [nullable] kind`. Type annotations that are not primitive (`as {number}`)
/// and incomplete annotations yield nothing.
fn type_annotation(
    graph: &NodeIdMap,
    annotation: XorNode<'_>,
) -> Result<Option<(PrimitiveTypeKind, bool)>, InspectionError> {
    match annotation.kind() {
        NodeKind::AsNullablePrimitiveType | NodeKind::AsType => {}
        kind => {
            return Err(InspectionError::unexpected_kind(
                annotation.id(),
                &[NodeKind::AsNullablePrimitiveType, NodeKind::AsType],
                kind,
            ))
        }
    }

    let paired = match graph.maybe_child_by_attribute_index(annotation.id(), attr::PAIRED, None)? {
        Some(paired) => paired,
        None => return Ok(None),
    };

    match paired.kind() {
        NodeKind::PrimitiveType => Ok(primitive_kind(paired).map(|kind| (kind, false))),
        NodeKind::NullablePrimitiveType | NodeKind::NullableType => {
            let inner = graph.maybe_child_by_attribute_index(paired.id(), attr::PAIRED, None)?;

            Ok(inner
                .filter(|n| n.kind() == NodeKind::PrimitiveType)
                .and_then(primitive_kind)
                .map(|kind| (kind, true)))
        }
        _ => Ok(None),
    }
}

fn primitive_kind(node: XorNode<'_>) -> Option<PrimitiveTypeKind> {
    node.ast().and_then(|n| n.primitive_type_kind())
}
