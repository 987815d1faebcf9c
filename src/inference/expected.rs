use crate::syntax::{attr, NodeKind};
use crate::types::Type;

/// The type a parent of `parent_kind` requires of its child at `attribute_index`.
///
/// `not applicable` when the slot places no demand on its child.
pub fn expected_type(parent_kind: NodeKind, attribute_index: u32) -> Type {
    match (parent_kind, attribute_index) {
        (NodeKind::IfExpression, attr::IF_CONDITION) => Type::LOGICAL,
        (NodeKind::IfExpression, attr::IF_TRUE) => Type::ANY,
        (NodeKind::IfExpression, attr::IF_FALSE) => Type::ANY,

        (NodeKind::AsExpression, attr::AS_RIGHT) => Type::TYPE,
        (NodeKind::IsExpression, attr::AS_RIGHT) => Type::TYPE,
        (NodeKind::AsType, attr::PAIRED) => Type::TYPE,
        (NodeKind::AsNullablePrimitiveType, attr::PAIRED) => Type::TYPE,
        (NodeKind::IsNullablePrimitiveType, attr::PAIRED) => Type::TYPE,
        (NodeKind::NullableType, attr::PAIRED) => Type::TYPE,
        (NodeKind::NullablePrimitiveType, attr::PAIRED) => Type::TYPE,
        (NodeKind::TypePrimaryType, attr::PAIRED) => Type::TYPE,
        (NodeKind::FieldTypeSpecification, attr::PAIRED) => Type::TYPE,
        (NodeKind::ListType, attr::WRAPPED_CONTENT) => Type::TYPE,

        (NodeKind::ItemAccessExpression, attr::WRAPPED_CONTENT) => Type::NUMBER,
        (NodeKind::RangeExpression, attr::BIN_OP_LEFT) => Type::NUMBER,
        (NodeKind::RangeExpression, attr::BIN_OP_RIGHT) => Type::NUMBER,

        (NodeKind::LogicalExpression, attr::BIN_OP_LEFT) => Type::LOGICAL,
        (NodeKind::LogicalExpression, attr::BIN_OP_RIGHT) => Type::LOGICAL,
        (NodeKind::UnaryExpression, attr::UNARY_OPERAND) => {
            Type::any_union(vec![Type::NUMBER, Type::LOGICAL])
        }

        (NodeKind::EachExpression, attr::EACH_BODY) => Type::ANY,
        (NodeKind::FunctionExpression, attr::FUNCTION_BODY) => Type::ANY,
        (NodeKind::LetExpression, attr::LET_BODY) => Type::ANY,
        (NodeKind::ParenthesizedExpression, attr::WRAPPED_CONTENT) => Type::ANY,
        (NodeKind::GeneralizedIdentifierPairedAnyLiteral, attr::PAIR_VALUE) => Type::ANY,
        (NodeKind::GeneralizedIdentifierPairedExpression, attr::PAIR_VALUE) => Type::ANY,
        (NodeKind::IdentifierPairedExpression, attr::PAIR_VALUE) => Type::ANY,
        (NodeKind::OtherwiseExpression, attr::PAIRED) => Type::ANY,
        (NodeKind::ErrorHandlingExpression, attr::ERROR_HANDLING_PROTECTED) => Type::ANY,

        _ => Type::NOT_APPLICABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKind;

    #[test]
    fn condition_is_logical() {
        assert_eq!(expected_type(NodeKind::IfExpression, attr::IF_CONDITION), Type::LOGICAL);
        assert_eq!(expected_type(NodeKind::IfExpression, attr::IF_TRUE), Type::ANY);
    }

    #[test]
    fn type_positions() {
        assert_eq!(expected_type(NodeKind::AsExpression, attr::AS_RIGHT), Type::TYPE);
        assert_eq!(expected_type(NodeKind::ListType, attr::WRAPPED_CONTENT), Type::TYPE);
        assert_eq!(
            expected_type(NodeKind::ItemAccessExpression, attr::WRAPPED_CONTENT),
            Type::NUMBER
        );
    }

    #[test]
    fn unconstrained_slots() {
        assert_eq!(
            expected_type(NodeKind::ArithmeticExpression, attr::BIN_OP_LEFT).kind(),
            TypeKind::NotApplicable
        );
        assert_eq!(
            expected_type(NodeKind::IfExpression, 0).kind(),
            TypeKind::NotApplicable
        );
        assert_eq!(
            expected_type(NodeKind::UnaryExpression, attr::UNARY_OPERAND),
            Type::any_union(vec![Type::NUMBER, Type::LOGICAL])
        );
    }
}
