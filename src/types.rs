use crate::syntax::PrimitiveTypeKind;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Display};

/// Primitive type tag. Every `Type` has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Action,
    Any,
    AnyNonNull,
    Binary,
    Date,
    DateTime,
    DateTimeZone,
    Duration,
    Function,
    List,
    Logical,
    None,
    NotApplicable,
    Null,
    Number,
    Record,
    Table,
    Text,
    Time,
    Type,
    Unknown,
}

impl TypeKind {
    pub const ALL: [TypeKind; 21] = [
        TypeKind::Action,
        TypeKind::Any,
        TypeKind::AnyNonNull,
        TypeKind::Binary,
        TypeKind::Date,
        TypeKind::DateTime,
        TypeKind::DateTimeZone,
        TypeKind::Duration,
        TypeKind::Function,
        TypeKind::List,
        TypeKind::Logical,
        TypeKind::None,
        TypeKind::NotApplicable,
        TypeKind::Null,
        TypeKind::Number,
        TypeKind::Record,
        TypeKind::Table,
        TypeKind::Text,
        TypeKind::Time,
        TypeKind::Type,
        TypeKind::Unknown,
    ];

    /// Kinds whose values include `null` unless stated otherwise.
    pub fn is_nullable_by_default(self) -> bool {
        matches!(
            self,
            TypeKind::Any | TypeKind::Null | TypeKind::Unknown | TypeKind::NotApplicable
        )
    }

    fn name(self) -> &'static str {
        match self {
            TypeKind::Action => "action",
            TypeKind::Any => "any",
            TypeKind::AnyNonNull => "anynonnull",
            TypeKind::Binary => "binary",
            TypeKind::Date => "date",
            TypeKind::DateTime => "datetime",
            TypeKind::DateTimeZone => "datetimezone",
            TypeKind::Duration => "duration",
            TypeKind::Function => "function",
            TypeKind::List => "list",
            TypeKind::Logical => "logical",
            TypeKind::None => "none",
            TypeKind::NotApplicable => "not applicable",
            TypeKind::Null => "null",
            TypeKind::Number => "number",
            TypeKind::Record => "record",
            TypeKind::Table => "table",
            TypeKind::Text => "text",
            TypeKind::Time => "time",
            TypeKind::Type => "type",
            TypeKind::Unknown => "unknown",
        }
    }
}

impl From<PrimitiveTypeKind> for TypeKind {
    fn from(kind: PrimitiveTypeKind) -> Self {
        match kind {
            PrimitiveTypeKind::Action => TypeKind::Action,
            PrimitiveTypeKind::Any => TypeKind::Any,
            PrimitiveTypeKind::AnyNonNull => TypeKind::AnyNonNull,
            PrimitiveTypeKind::Binary => TypeKind::Binary,
            PrimitiveTypeKind::Date => TypeKind::Date,
            PrimitiveTypeKind::DateTime => TypeKind::DateTime,
            PrimitiveTypeKind::DateTimeZone => TypeKind::DateTimeZone,
            PrimitiveTypeKind::Duration => TypeKind::Duration,
            PrimitiveTypeKind::Function => TypeKind::Function,
            PrimitiveTypeKind::List => TypeKind::List,
            PrimitiveTypeKind::Logical => TypeKind::Logical,
            PrimitiveTypeKind::None => TypeKind::None,
            PrimitiveTypeKind::Null => TypeKind::Null,
            PrimitiveTypeKind::Number => TypeKind::Number,
            PrimitiveTypeKind::Record => TypeKind::Record,
            PrimitiveTypeKind::Table => TypeKind::Table,
            PrimitiveTypeKind::Text => TypeKind::Text,
            PrimitiveTypeKind::Time => TypeKind::Time,
            PrimitiveTypeKind::Type => TypeKind::Type,
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Field name to type, in declaration order.
pub type FieldMap = IndexMap<String, Type>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionParameter {
    pub name: String,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub maybe_type: Option<TypeKind>,
}

impl Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional {
            write!(f, "optional ")?;
        }
        write!(f, "{}: ", self.name)?;

        match self.maybe_type {
            Some(kind) if self.is_nullable && !kind.is_nullable_by_default() => {
                write!(f, "nullable {}", kind)
            }
            Some(kind) => write!(f, "{}", kind),
            None => write!(f, "any"),
        }
    }
}

/// Inferred static type of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant")]
pub enum Type {
    Primitive {
        kind: TypeKind,
        is_nullable: bool,
    },
    /// One of several types.
    AnyUnion {
        members: Vec<Type>,
        is_nullable: bool,
    },
    DefinedFunction {
        parameters: Vec<FunctionParameter>,
        return_type: Box<Type>,
        is_nullable: bool,
    },
    DefinedList {
        elements: Vec<Type>,
        is_nullable: bool,
    },
    DefinedRecord {
        fields: FieldMap,
        is_open: bool,
        is_nullable: bool,
    },
    DefinedTable {
        fields: FieldMap,
        is_open: bool,
        is_nullable: bool,
    },
    // Meta types: the node denotes a type rather than a value.
    ListType {
        item_type: Box<Type>,
        is_nullable: bool,
    },
    RecordType {
        fields: FieldMap,
        is_open: bool,
        is_nullable: bool,
    },
    TableType {
        fields: FieldMap,
        is_open: bool,
        is_nullable: bool,
    },
    DefinedType {
        denoted: Box<Type>,
        is_nullable: bool,
    },
}

macro_rules! primitive_constants {
    ($($name:ident => $kind:ident, $nullable:expr;)*) => {
        impl Type {
            $(
                pub const $name: Type = Type::Primitive {
                    kind: TypeKind::$kind,
                    is_nullable: $nullable,
                };
            )*
        }
    };
}

primitive_constants! {
    ACTION => Action, false;
    ANY => Any, true;
    ANY_NON_NULL => AnyNonNull, false;
    BINARY => Binary, false;
    DATE => Date, false;
    DATE_TIME => DateTime, false;
    DATE_TIME_ZONE => DateTimeZone, false;
    DURATION => Duration, false;
    FUNCTION => Function, false;
    LIST => List, false;
    LOGICAL => Logical, false;
    NONE => None, false;
    NOT_APPLICABLE => NotApplicable, true;
    NULL => Null, true;
    NUMBER => Number, false;
    RECORD => Record, false;
    TABLE => Table, false;
    TEXT => Text, false;
    TIME => Time, false;
    TYPE => Type, false;
    UNKNOWN => Unknown, true;
}

impl Type {
    pub fn primitive(kind: TypeKind, is_nullable: bool) -> Self {
        Type::Primitive { kind, is_nullable }
    }

    /// A primitive with the kind's default nullability.
    pub fn of(kind: TypeKind) -> Self {
        Type::primitive(kind, kind.is_nullable_by_default())
    }

    /// Builds a disjunction: nested unions are flattened, duplicates dropped and a
    /// single remaining member is returned as is.
    pub fn any_union(members: Vec<Type>) -> Self {
        let mut flattened: Vec<Type> = Vec::with_capacity(members.len());

        for member in members {
            let nested = match member {
                Type::AnyUnion { members, .. } => members,
                other => vec![other],
            };
            for ty in nested {
                if !flattened.contains(&ty) {
                    flattened.push(ty);
                }
            }
        }

        match flattened.len() {
            0 => Type::NONE,
            1 => flattened.remove(0),
            _ => {
                let is_nullable = flattened.iter().any(Type::is_nullable);
                Type::AnyUnion {
                    members: flattened,
                    is_nullable,
                }
            }
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Primitive { kind, .. } => *kind,
            Type::AnyUnion { .. } => TypeKind::Any,
            Type::DefinedFunction { .. } => TypeKind::Function,
            Type::DefinedList { .. } => TypeKind::List,
            Type::DefinedRecord { .. } => TypeKind::Record,
            Type::DefinedTable { .. } => TypeKind::Table,
            Type::ListType { .. }
            | Type::RecordType { .. }
            | Type::TableType { .. }
            | Type::DefinedType { .. } => TypeKind::Type,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Primitive { is_nullable, .. }
            | Type::AnyUnion { is_nullable, .. }
            | Type::DefinedFunction { is_nullable, .. }
            | Type::DefinedList { is_nullable, .. }
            | Type::DefinedRecord { is_nullable, .. }
            | Type::DefinedTable { is_nullable, .. }
            | Type::ListType { is_nullable, .. }
            | Type::RecordType { is_nullable, .. }
            | Type::TableType { is_nullable, .. }
            | Type::DefinedType { is_nullable, .. } => *is_nullable,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        match &mut self {
            Type::Primitive { is_nullable, .. }
            | Type::AnyUnion { is_nullable, .. }
            | Type::DefinedFunction { is_nullable, .. }
            | Type::DefinedList { is_nullable, .. }
            | Type::DefinedRecord { is_nullable, .. }
            | Type::DefinedTable { is_nullable, .. }
            | Type::ListType { is_nullable, .. }
            | Type::RecordType { is_nullable, .. }
            | Type::TableType { is_nullable, .. }
            | Type::DefinedType { is_nullable, .. } => *is_nullable = nullable,
        }
        self
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive { .. })
    }

    /// Bare `any`, not a union.
    pub fn is_any(&self) -> bool {
        matches!(self, Type::Primitive { kind: TypeKind::Any, .. })
    }

    pub fn is_unknown(&self) -> bool {
        self.kind() == TypeKind::Unknown
    }

    pub fn is_none(&self) -> bool {
        self.kind() == TypeKind::None
    }

    pub fn is_meta(&self) -> bool {
        self.kind() == TypeKind::Type
    }

    pub fn union_members(&self) -> Option<&[Type]> {
        if let Type::AnyUnion { members, .. } = self {
            Some(members)
        } else {
            None
        }
    }

    /// Fields of a defined record or table, with the open flag.
    pub fn fields(&self) -> Option<(&FieldMap, bool)> {
        match self {
            Type::DefinedRecord {
                fields, is_open, ..
            }
            | Type::DefinedTable {
                fields, is_open, ..
            }
            | Type::RecordType {
                fields, is_open, ..
            }
            | Type::TableType {
                fields, is_open, ..
            } => Some((fields, *is_open)),
            _ => None,
        }
    }
}

fn write_separated<T: Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
    separator: &str,
) -> fmt::Result {
    let mut it = items.peekable();

    while let Some(item) = it.next() {
        write!(f, "{}", item)?;
        if it.peek().is_some() {
            write!(f, "{}", separator)?;
        }
    }
    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &FieldMap, is_open: bool) -> fmt::Result {
    write!(f, "[")?;
    write_separated(
        f,
        fields.iter().map(|(name, ty)| format!("{}: {}", name, ty)),
        ", ",
    )?;
    if is_open {
        if !fields.is_empty() {
            write!(f, ", ")?;
        }
        write!(f, "...")?;
    }
    write!(f, "]")
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Type::Primitive { kind, is_nullable } = self {
            if *is_nullable && !kind.is_nullable_by_default() {
                write!(f, "nullable ")?;
            }
            return write!(f, "{}", kind);
        }
        if let Type::AnyUnion { members, .. } = self {
            return write_separated(f, members.iter(), " | ");
        }

        if self.is_nullable() {
            write!(f, "nullable ")?;
        }

        match self {
            Type::DefinedFunction {
                parameters,
                return_type,
                ..
            } => {
                write!(f, "(")?;
                write_separated(f, parameters.iter(), ", ")?;
                write!(f, ") => {}", return_type)
            }
            Type::DefinedList { elements, .. } => {
                write!(f, "{{")?;
                write_separated(f, elements.iter(), ", ")?;
                write!(f, "}}")
            }
            Type::DefinedRecord {
                fields, is_open, ..
            } => write_fields(f, fields, *is_open),
            Type::DefinedTable {
                fields, is_open, ..
            } => {
                write!(f, "table ")?;
                write_fields(f, fields, *is_open)
            }
            Type::ListType { item_type, .. } => write!(f, "type {{{}}}", item_type),
            Type::RecordType {
                fields, is_open, ..
            } => {
                write!(f, "type ")?;
                write_fields(f, fields, *is_open)
            }
            Type::TableType {
                fields, is_open, ..
            } => {
                write!(f, "type table ")?;
                write_fields(f, fields, *is_open)
            }
            Type::DefinedType { denoted, .. } => write!(f, "type {}", denoted),
            Type::Primitive { .. } | Type::AnyUnion { .. } => Ok(()),
        }
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
    fn kind_follows_variant() {
        assert_eq!(record(&[], false).kind(), TypeKind::Record);
        assert_eq!(Type::any_union(vec![Type::NUMBER, Type::TEXT]).kind(), TypeKind::Any);
        assert_eq!(
            Type::ListType {
                item_type: Box::new(Type::NUMBER),
                is_nullable: false
            }
            .kind(),
            TypeKind::Type
        );
    }

    #[test]
    fn default_nullability() {
        assert!(Type::of(TypeKind::Any).is_nullable());
        assert!(Type::of(TypeKind::Unknown).is_nullable());
        assert!(!Type::of(TypeKind::None).is_nullable());
        assert!(!Type::of(TypeKind::Number).is_nullable());
    }

    #[test]
    fn union_flattens_and_dedups() {
        let inner = Type::any_union(vec![Type::NUMBER, Type::TEXT]);
        let union = Type::any_union(vec![inner, Type::NUMBER, Type::LOGICAL]);

        assert_eq!(
            union.union_members(),
            Some(&[Type::NUMBER, Type::TEXT, Type::LOGICAL][..])
        );
        assert_eq!(Type::any_union(vec![Type::TEXT, Type::TEXT]), Type::TEXT);
    }

    #[test]
    fn display() {
        assert_eq!(Type::NUMBER.with_nullable(true).to_string(), "nullable number");
        assert_eq!(Type::ANY.to_string(), "any");
        assert_eq!(record(&[("a", Type::NUMBER)], true).to_string(), "[a: number, ...]");
        assert_eq!(
            Type::DefinedList {
                elements: vec![Type::NUMBER, Type::TEXT],
                is_nullable: false
            }
            .to_string(),
            "{number, text}"
        );
        assert_eq!(
            Type::DefinedFunction {
                parameters: vec![FunctionParameter {
                    name: "x".to_string(),
                    is_optional: false,
                    is_nullable: false,
                    maybe_type: Some(TypeKind::Number),
                }],
                return_type: Box::new(Type::ANY),
                is_nullable: false,
            }
            .to_string(),
            "(x: number) => any"
        );
        assert_eq!(
            Type::any_union(vec![Type::NUMBER, Type::TEXT]).to_string(),
            "number | text"
        );
        assert_eq!(
            Type::RecordType {
                fields: record(&[("a", Type::NUMBER)], false)
                    .fields()
                    .map(|(f, _)| f.clone())
                    .unwrap_or_default(),
                is_open: false,
                is_nullable: false,
            }
            .to_string(),
            "type [a: number]"
        );
    }
}
