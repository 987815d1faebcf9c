//! Result kinds of binary operators.
use super::union::structural_union;
use crate::syntax::ConstantKind;
use crate::types::{Type, TypeKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

type Key = (TypeKind, ConstantKind, TypeKind);

const EQUALITY_OPERATORS: [ConstantKind; 2] = [ConstantKind::Equal, ConstantKind::NotEqual];

const RELATIONAL_OPERATORS: [ConstantKind; 4] = [
    ConstantKind::LessThan,
    ConstantKind::LessThanEqualTo,
    ConstantKind::GreaterThan,
    ConstantKind::GreaterThanEqualTo,
];

const ARITHMETIC_OPERATORS: [ConstantKind; 4] = [
    ConstantKind::Plus,
    ConstantKind::Minus,
    ConstantKind::Asterisk,
    ConstantKind::Division,
];

/// Kinds whose values can be compared with `=` and `<>`.
const EQUATABLE_KINDS: [TypeKind; 16] = [
    TypeKind::Action,
    TypeKind::Binary,
    TypeKind::Date,
    TypeKind::DateTime,
    TypeKind::DateTimeZone,
    TypeKind::Duration,
    TypeKind::Function,
    TypeKind::List,
    TypeKind::Logical,
    TypeKind::Null,
    TypeKind::Number,
    TypeKind::Record,
    TypeKind::Table,
    TypeKind::Text,
    TypeKind::Time,
    TypeKind::Type,
];

const ORDERED_KINDS: [TypeKind; 10] = [
    TypeKind::Binary,
    TypeKind::Date,
    TypeKind::DateTime,
    TypeKind::DateTimeZone,
    TypeKind::Duration,
    TypeKind::Logical,
    TypeKind::Null,
    TypeKind::Number,
    TypeKind::Text,
    TypeKind::Time,
];

const CALENDAR_KINDS: [TypeKind; 4] = [
    TypeKind::Date,
    TypeKind::DateTime,
    TypeKind::DateTimeZone,
    TypeKind::Time,
];

/// Every `(left, operator, right) -> result` entry. Each key appears once.
pub fn lookup_entries() -> Vec<(Key, TypeKind)> {
    let mut entries = vec![];

    for op in EQUALITY_OPERATORS.iter().copied() {
        for kind in EQUATABLE_KINDS.iter().copied() {
            entries.push(((kind, op, kind), TypeKind::Logical));
            if kind != TypeKind::Null {
                entries.push(((kind, op, TypeKind::Null), TypeKind::Logical));
                entries.push(((TypeKind::Null, op, kind), TypeKind::Logical));
            }
        }
    }

    for op in RELATIONAL_OPERATORS.iter().copied() {
        for kind in ORDERED_KINDS.iter().copied() {
            entries.push(((kind, op, kind), TypeKind::Logical));
        }
    }

    for op in [ConstantKind::And, ConstantKind::Or].iter().copied() {
        entries.push(((TypeKind::Logical, op, TypeKind::Logical), TypeKind::Logical));
    }

    for op in ARITHMETIC_OPERATORS.iter().copied() {
        entries.push(((TypeKind::Number, op, TypeKind::Number), TypeKind::Number));
    }

    // duration arithmetic
    entries.extend(vec![
        ((TypeKind::Duration, ConstantKind::Plus, TypeKind::Duration), TypeKind::Duration),
        ((TypeKind::Duration, ConstantKind::Minus, TypeKind::Duration), TypeKind::Duration),
        ((TypeKind::Duration, ConstantKind::Asterisk, TypeKind::Number), TypeKind::Duration),
        ((TypeKind::Number, ConstantKind::Asterisk, TypeKind::Duration), TypeKind::Duration),
        ((TypeKind::Duration, ConstantKind::Division, TypeKind::Number), TypeKind::Duration),
        ((TypeKind::Duration, ConstantKind::Division, TypeKind::Duration), TypeKind::Number),
    ]);

    for kind in CALENDAR_KINDS.iter().copied() {
        entries.push(((kind, ConstantKind::Plus, TypeKind::Duration), kind));
        entries.push(((TypeKind::Duration, ConstantKind::Plus, kind), kind));
        entries.push(((kind, ConstantKind::Minus, TypeKind::Duration), kind));
        entries.push(((kind, ConstantKind::Minus, kind), TypeKind::Duration));
    }

    // concatenation and combination
    entries.extend(vec![
        ((TypeKind::Text, ConstantKind::Ampersand, TypeKind::Text), TypeKind::Text),
        ((TypeKind::Date, ConstantKind::Ampersand, TypeKind::Time), TypeKind::DateTime),
        ((TypeKind::List, ConstantKind::Ampersand, TypeKind::List), TypeKind::List),
        ((TypeKind::Record, ConstantKind::Ampersand, TypeKind::Record), TypeKind::Record),
        ((TypeKind::Table, ConstantKind::Ampersand, TypeKind::Table), TypeKind::Table),
    ]);

    entries
}

static LOOKUP: Lazy<HashMap<Key, TypeKind>> = Lazy::new(|| lookup_entries().into_iter().collect());

/// Right-hand kinds that give a defined result for `(left, operator)`, in table order.
static PARTIAL_LOOKUP: Lazy<HashMap<(TypeKind, ConstantKind), Vec<TypeKind>>> = Lazy::new(|| {
    let mut partial: HashMap<_, Vec<_>> = HashMap::new();

    for ((left, op, right), _) in lookup_entries() {
        let rights = partial.entry((left, op)).or_default();
        if !rights.contains(&right) {
            rights.push(right);
        }
    }

    partial
});

pub fn lookup(left: TypeKind, op: ConstantKind, right: TypeKind) -> Option<TypeKind> {
    LOOKUP.get(&(left, op, right)).copied()
}

pub fn partial_lookup(left: TypeKind, op: ConstantKind) -> &'static [TypeKind] {
    PARTIAL_LOOKUP
        .get(&(left, op))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn is_equality(op: ConstantKind) -> bool {
    EQUALITY_OPERATORS.contains(&op)
}

/// Type of `left op right`. Absent combinations are `none`.
pub fn bin_op_type(left: &Type, op: ConstantKind, right: &Type) -> Type {
    if left.is_unknown() || right.is_unknown() {
        return Type::UNKNOWN;
    }
    if left.kind() == TypeKind::Any || right.kind() == TypeKind::Any {
        return Type::ANY;
    }

    let kind = match lookup(left.kind(), op, right.kind()) {
        Some(kind) => kind,
        None => return Type::NONE,
    };

    match (op, kind) {
        (ConstantKind::Ampersand, TypeKind::List)
        | (ConstantKind::Ampersand, TypeKind::Record)
        | (ConstantKind::Ampersand, TypeKind::Table) => structural_union(left, right),
        _ if is_equality(op) => Type::primitive(kind, false),
        _ => Type::primitive(kind, left.is_nullable() || right.is_nullable()),
    }
}

/// What the right operand of `left op` could be, for a binary expression that is
/// still missing it.
pub fn right_operand_hint(left: &Type, op: ConstantKind) -> Type {
    if left.is_unknown() {
        return Type::UNKNOWN;
    }
    if left.kind() == TypeKind::Any {
        return Type::ANY;
    }

    let hints = partial_lookup(left.kind(), op)
        .iter()
        .map(|kind| Type::of(*kind))
        .collect();

    Type::any_union(hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let entries = lookup_entries();
        let keys: HashSet<_> = entries.iter().map(|(key, _)| *key).collect();

        assert_eq!(keys.len(), entries.len());
    }

    #[test]
    fn every_triple_follows_the_table() {
        let operators = [
            ConstantKind::Equal,
            ConstantKind::NotEqual,
            ConstantKind::LessThan,
            ConstantKind::LessThanEqualTo,
            ConstantKind::GreaterThan,
            ConstantKind::GreaterThanEqualTo,
            ConstantKind::And,
            ConstantKind::Or,
            ConstantKind::Plus,
            ConstantKind::Minus,
            ConstantKind::Asterisk,
            ConstantKind::Division,
            ConstantKind::Ampersand,
        ];
        let short_circuit = [TypeKind::Any, TypeKind::Unknown];

        for left in TypeKind::ALL.iter().copied() {
            for right in TypeKind::ALL.iter().copied() {
                if short_circuit.contains(&left) || short_circuit.contains(&right) {
                    continue;
                }
                for op in operators.iter().copied() {
                    let actual = bin_op_type(&Type::of(left), op, &Type::of(right)).kind();
                    let expected = lookup(left, op, right).unwrap_or(TypeKind::None);

                    assert_eq!(actual, expected, "{} {} {}", left, op, right);
                }
            }
        }
    }

    #[test]
    fn calendar_arithmetic() {
        assert_eq!(
            lookup(TypeKind::Date, ConstantKind::Minus, TypeKind::Date),
            Some(TypeKind::Duration)
        );
        assert_eq!(
            lookup(TypeKind::Duration, ConstantKind::Plus, TypeKind::DateTime),
            Some(TypeKind::DateTime)
        );
        assert_eq!(
            lookup(TypeKind::Date, ConstantKind::Ampersand, TypeKind::Time),
            Some(TypeKind::DateTime)
        );
        assert_eq!(lookup(TypeKind::Number, ConstantKind::Plus, TypeKind::Text), None);
    }

    #[test]
    fn nullability() {
        let nullable_number = Type::NUMBER.with_nullable(true);

        assert!(bin_op_type(&nullable_number, ConstantKind::Plus, &Type::NUMBER).is_nullable());
        assert!(!bin_op_type(&nullable_number, ConstantKind::Equal, &Type::NUMBER).is_nullable());
    }

    #[test]
    fn partial_lookup_lists_right_kinds() {
        assert_eq!(
            partial_lookup(TypeKind::Duration, ConstantKind::Asterisk),
            &[TypeKind::Number]
        );
        assert_eq!(
            right_operand_hint(&Type::NUMBER, ConstantKind::Asterisk),
            Type::any_union(vec![Type::NUMBER, Type::DURATION])
        );
        assert_eq!(right_operand_hint(&Type::TEXT, ConstantKind::Ampersand), Type::TEXT);
        assert!(partial_lookup(TypeKind::Text, ConstantKind::Minus).is_empty());
        assert_eq!(right_operand_hint(&Type::TEXT, ConstantKind::Minus), Type::NONE);
    }
}
