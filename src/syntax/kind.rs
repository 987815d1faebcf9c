use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic kind tag shared by resolved and context nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    ArithmeticExpression,
    ArrayWrapper,
    AsExpression,
    AsNullablePrimitiveType,
    AsType,
    Constant,
    Csv,
    EachExpression,
    EqualityExpression,
    ErrorHandlingExpression,
    ErrorRaisingExpression,
    FieldProjection,
    FieldSelector,
    FieldSpecification,
    FieldSpecificationList,
    FieldTypeSpecification,
    FunctionExpression,
    FunctionType,
    GeneralizedIdentifier,
    GeneralizedIdentifierPairedAnyLiteral,
    GeneralizedIdentifierPairedExpression,
    Identifier,
    IdentifierExpression,
    IdentifierPairedExpression,
    IfExpression,
    InvokeExpression,
    IsExpression,
    IsNullablePrimitiveType,
    ItemAccessExpression,
    LetExpression,
    ListExpression,
    ListLiteral,
    ListType,
    LiteralExpression,
    LogicalExpression,
    MetadataExpression,
    NotImplementedExpression,
    NullCoalescingExpression,
    NullablePrimitiveType,
    NullableType,
    OtherwiseExpression,
    Parameter,
    ParameterList,
    ParenthesizedExpression,
    PrimitiveType,
    RangeExpression,
    RecordExpression,
    RecordLiteral,
    RecordType,
    RecursivePrimaryExpression,
    RelationalExpression,
    Section,
    SectionMember,
    TableType,
    TypePrimaryType,
    UnaryExpression,
}

impl NodeKind {
    /// Binary operator expressions share the `left operator right` layout.
    pub fn is_bin_op_expression(self) -> bool {
        matches!(
            self,
            NodeKind::ArithmeticExpression
                | NodeKind::EqualityExpression
                | NodeKind::LogicalExpression
                | NodeKind::RelationalExpression
        )
    }

    pub fn is_key_value_pair(self) -> bool {
        matches!(
            self,
            NodeKind::GeneralizedIdentifierPairedAnyLiteral
                | NodeKind::GeneralizedIdentifierPairedExpression
                | NodeKind::IdentifierPairedExpression
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Keywords, operators and punctuation carried by `Constant` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantKind {
    // keywords
    And,
    As,
    Each,
    Else,
    Error,
    If,
    In,
    Is,
    Let,
    Meta,
    Not,
    Nullable,
    Optional,
    Or,
    Otherwise,
    Section,
    Shared,
    Table,
    Then,
    Try,
    Type,
    Function,
    // arithmetic
    Asterisk,
    Division,
    Plus,
    Minus,
    Ampersand,
    // equality / relational
    Equal,
    NotEqual,
    LessThan,
    LessThanEqualTo,
    GreaterThan,
    GreaterThanEqualTo,
    // misc
    AtSign,
    Comma,
    DotDot,
    Ellipsis,
    FatArrow,
    LeftBrace,
    LeftBracket,
    LeftParenthesis,
    NullCoalescing,
    QuestionMark,
    RightBrace,
    RightBracket,
    RightParenthesis,
    Semicolon,
}

impl fmt::Display for ConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstantKind::And => "and",
            ConstantKind::As => "as",
            ConstantKind::Each => "each",
            ConstantKind::Else => "else",
            ConstantKind::Error => "error",
            ConstantKind::If => "if",
            ConstantKind::In => "in",
            ConstantKind::Is => "is",
            ConstantKind::Let => "let",
            ConstantKind::Meta => "meta",
            ConstantKind::Not => "not",
            ConstantKind::Nullable => "nullable",
            ConstantKind::Optional => "optional",
            ConstantKind::Or => "or",
            ConstantKind::Otherwise => "otherwise",
            ConstantKind::Section => "section",
            ConstantKind::Shared => "shared",
            ConstantKind::Table => "table",
            ConstantKind::Then => "then",
            ConstantKind::Try => "try",
            ConstantKind::Type => "type",
            ConstantKind::Function => "function",
            ConstantKind::Asterisk => "*",
            ConstantKind::Division => "/",
            ConstantKind::Plus => "+",
            ConstantKind::Minus => "-",
            ConstantKind::Ampersand => "&",
            ConstantKind::Equal => "=",
            ConstantKind::NotEqual => "<>",
            ConstantKind::LessThan => "<",
            ConstantKind::LessThanEqualTo => "<=",
            ConstantKind::GreaterThan => ">",
            ConstantKind::GreaterThanEqualTo => ">=",
            ConstantKind::AtSign => "@",
            ConstantKind::Comma => ",",
            ConstantKind::DotDot => "..",
            ConstantKind::Ellipsis => "...",
            ConstantKind::FatArrow => "=>",
            ConstantKind::LeftBrace => "{",
            ConstantKind::LeftBracket => "[",
            ConstantKind::LeftParenthesis => "(",
            ConstantKind::NullCoalescing => "??",
            ConstantKind::QuestionMark => "?",
            ConstantKind::RightBrace => "}",
            ConstantKind::RightBracket => "]",
            ConstantKind::RightParenthesis => ")",
            ConstantKind::Semicolon => ";",
        };

        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Logical,
    Null,
    Numeric,
    Text,
}

/// Primitive type names as written in source (`number`, `nullable text`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTypeKind {
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
    Null,
    Number,
    Record,
    Table,
    Text,
    Time,
    Type,
}

/// Attribute indices of the child slots the engine inspects.
pub mod attr {
    pub const EACH_BODY: u32 = 1;

    pub const FUNCTION_PARAMETERS: u32 = 0;
    pub const FUNCTION_RETURN_TYPE: u32 = 1;
    pub const FUNCTION_BODY: u32 = 3;

    pub const LET_BINDINGS: u32 = 1;
    pub const LET_BODY: u32 = 3;

    pub const IF_CONDITION: u32 = 1;
    pub const IF_TRUE: u32 = 3;
    pub const IF_FALSE: u32 = 5;

    pub const BIN_OP_LEFT: u32 = 0;
    pub const BIN_OP_OPERATOR: u32 = 1;
    pub const BIN_OP_RIGHT: u32 = 2;

    pub const UNARY_OPERATORS: u32 = 0;
    pub const UNARY_OPERAND: u32 = 1;

    /// Content slot of every `open content close` wrapped construct.
    pub const WRAPPED_CONTENT: u32 = 1;
    /// Trailing `?` of field selectors, projections and item access.
    pub const WRAPPED_OPTIONAL: u32 = 3;
    /// Trailing `...` of a field specification list.
    pub const FIELD_LIST_OPEN_MARKER: u32 = 3;

    pub const CSV_NODE: u32 = 0;

    pub const PAIR_KEY: u32 = 0;
    pub const PAIR_VALUE: u32 = 2;

    pub const IDENTIFIER_EXPRESSION_INCLUSIVE: u32 = 0;
    pub const IDENTIFIER_EXPRESSION_IDENTIFIER: u32 = 1;

    pub const SECTION_MEMBERS: u32 = 4;
    pub const SECTION_MEMBER_PAIR: u32 = 2;

    pub const PARAMETER_OPTIONAL: u32 = 0;
    pub const PARAMETER_NAME: u32 = 1;
    pub const PARAMETER_TYPE: u32 = 2;

    pub const RECURSIVE_PRIMARY_HEAD: u32 = 0;
    pub const RECURSIVE_PRIMARY_TAIL: u32 = 1;

    /// Second slot of `keyword paired` constructs (`as T`, `nullable T`, `type T`, ...).
    pub const PAIRED: u32 = 1;

    pub const FIELD_SPECIFICATION_OPTIONAL: u32 = 0;
    pub const FIELD_SPECIFICATION_NAME: u32 = 1;
    pub const FIELD_SPECIFICATION_TYPE: u32 = 2;

    pub const RECORD_TYPE_FIELDS: u32 = 0;
    pub const TABLE_ROW_TYPE: u32 = 1;
    pub const FUNCTION_TYPE_PARAMETERS: u32 = 1;
    pub const FUNCTION_TYPE_RETURN: u32 = 2;

    pub const ERROR_HANDLING_PROTECTED: u32 = 1;
    pub const ERROR_HANDLING_OTHERWISE: u32 = 2;

    pub const AS_RIGHT: u32 = 2;
}
