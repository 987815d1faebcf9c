use crate::types::{FieldMap, Type, TypeKind};

/// Combines two lists, records or tables with `&`.
///
/// Fields of the right operand overwrite those of the left. The result is open, and
/// nullable only when both operands are.
pub fn structural_union(left: &Type, right: &Type) -> Type {
    let kind = left.kind();
    let is_nullable = left.is_nullable() && right.is_nullable();

    if kind != right.kind() {
        return Type::NONE;
    }

    match kind {
        TypeKind::List => match (left, right) {
            (
                Type::DefinedList { elements: left, .. },
                Type::DefinedList {
                    elements: right, ..
                },
            ) => Type::DefinedList {
                elements: left.iter().chain(right.iter()).cloned().collect(),
                is_nullable,
            },
            _ => Type::primitive(TypeKind::List, is_nullable),
        },
        TypeKind::Record | TypeKind::Table => {
            let fields = match (defined_fields(left), defined_fields(right)) {
                (None, None) => return Type::primitive(kind, is_nullable),
                (Some(fields), None) | (None, Some(fields)) => fields.clone(),
                (Some(left), Some(right)) => {
                    let mut fields = left.clone();
                    for (name, ty) in right {
                        fields.insert(name.clone(), ty.clone());
                    }
                    fields
                }
            };

            if kind == TypeKind::Record {
                Type::DefinedRecord {
                    fields,
                    is_open: true,
                    is_nullable,
                }
            } else {
                Type::DefinedTable {
                    fields,
                    is_open: true,
                    is_nullable,
                }
            }
        }
        _ => Type::NONE,
    }
}

fn defined_fields(ty: &Type) -> Option<&FieldMap> {
    match ty {
        Type::DefinedRecord { fields, .. } | Type::DefinedTable { fields, .. } => Some(fields),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Type)], is_open: bool) -> Type {
        Type::DefinedRecord {
            fields: fields
                .iter()
                .map(|(name, ty)| (name.to_string(), ty.clone()))
                .collect(),
            is_open,
            is_nullable: false,
        }
    }

    #[test]
    fn disjoint_fields_are_combined() {
        let union = structural_union(
            &record(&[("a", Type::NUMBER)], false),
            &record(&[("b", Type::NUMBER)], false),
        );

        assert_eq!(
            union,
            record(&[("a", Type::NUMBER), ("b", Type::NUMBER)], true)
        );
    }

    #[test]
    fn right_operand_wins() {
        let union = structural_union(
            &record(&[("a", Type::NUMBER)], false),
            &record(&[("a", Type::TEXT)], false),
        );

        assert_eq!(union.fields().map(|(f, _)| f["a"].clone()), Some(Type::TEXT));
    }

    #[test]
    fn untyped_operand_forces_open() {
        let union = structural_union(&record(&[("a", Type::NUMBER)], false), &Type::RECORD);

        assert_eq!(union, record(&[("a", Type::NUMBER)], true));
        assert_eq!(structural_union(&Type::RECORD, &Type::RECORD), Type::RECORD);
    }

    #[test]
    fn nullable_only_if_both_are() {
        let nullable = Type::RECORD.with_nullable(true);

        assert!(!structural_union(&nullable, &Type::RECORD).is_nullable());
        assert!(structural_union(&nullable, &nullable).is_nullable());
    }

    #[test]
    fn lists_concatenate() {
        let left = Type::DefinedList {
            elements: vec![Type::NUMBER],
            is_nullable: false,
        };
        let right = Type::DefinedList {
            elements: vec![Type::TEXT],
            is_nullable: false,
        };

        assert_eq!(
            structural_union(&left, &right),
            Type::DefinedList {
                elements: vec![Type::NUMBER, Type::TEXT],
                is_nullable: false
            }
        );
    }
}
