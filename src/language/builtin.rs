use std::collections::HashSet;
use std::sync::OnceLock;

/// Every keyword and operator glyph of the language, as a closed
/// enumeration. One surface text may map to several kinds (`-` is both
/// `Subtraction` and `Negation`, `(` opens parentheses, calls, argument
/// lists and conditions); the parser resolves the ambiguity positionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Assignment,
    AccessMember,
    StatementDelimiter,
    ArgumentDelimiter,
    PairSeparator,

    OpenParen,
    CloseParen,

    OpenFunctionCall,
    CloseFunctionCall,

    OpenCondition,
    CloseCondition,

    OpenBlock,
    CloseBlock,

    Addition,
    AdditionAssignment,
    Increment,

    Subtraction,
    SubtractionAssignment,
    Decrement,
    Negation,

    Multiplication,
    MultiplicationAssignment,

    Division,
    DivisionAssignment,

    Modulus,
    ModulusAssignment,

    Exponent,
    ExponentAssignment,

    LessThan,
    LessThanOrEqual,

    GreaterThan,
    GreaterThanOrEqual,

    EqualTo,
    NotEqualTo,

    LogicalAnd,
    LogicalOr,
    LogicalNot,

    Exists,

    VariableDeclarator,
    ConstantDeclarator,
    VariableDeclarationOperator,

    IfStatement,
    ElseStatement,
    WhileStatement,
    ForStatement,

    TrueLiteral,
    FalseLiteral,
    NullLiteral,

    FunctionDeclaration,
    FunctionOpenArgumentList,
    FunctionCloseArgumentList,
    Return,
    Break,
    Continue,

    OpenArrayLiteral,
    CloseArrayLiteral,
    OpenSubscript,
    CloseSubscript,
    ElementDelimiter,

    OpenObjectLiteral,
    CloseObjectLiteral,
}

/// How an operator binds to its operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingDirection {
    None,
    LeftAssociative,
    RightAssociative,
    Prefix,
    Postfix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltinInfo {
    pub is_operator: bool,
    pub is_binary: bool,
    pub precedence: i32,
    pub binding_direction: BindingDirection,
}

impl BuiltinInfo {
    const NOT_AN_OPERATOR: BuiltinInfo = BuiltinInfo {
        is_operator: false,
        is_binary: false,
        precedence: -1,
        binding_direction: BindingDirection::None,
    };

    const fn binary(precedence: i32, binding_direction: BindingDirection) -> Self {
        Self {
            is_operator: true,
            is_binary: true,
            precedence,
            binding_direction,
        }
    }

    const fn unary(precedence: i32, binding_direction: BindingDirection) -> Self {
        Self {
            is_operator: true,
            is_binary: false,
            precedence,
            binding_direction,
        }
    }
}

// The precedence ladder, lowest binding first. Exponentiation is
// right-associative; everything else on a binary level is left-associative.
pub const ASSIGNMENT_LEVEL: i32 = 0;
pub const LOGICAL_OR_LEVEL: i32 = ASSIGNMENT_LEVEL + 1;
pub const LOGICAL_AND_LEVEL: i32 = LOGICAL_OR_LEVEL + 1;
pub const EQUALITY_LEVEL: i32 = LOGICAL_AND_LEVEL + 1;
pub const ORDERING_LEVEL: i32 = EQUALITY_LEVEL + 1;
pub const ADDITIVE_LEVEL: i32 = ORDERING_LEVEL + 1;
pub const MULTIPLICATIVE_LEVEL: i32 = ADDITIVE_LEVEL + 1;
pub const NEGATION_LEVEL: i32 = MULTIPLICATIVE_LEVEL + 1;
pub const EXPONENT_LEVEL: i32 = NEGATION_LEVEL + 1;
pub const LOGICAL_NOT_LEVEL: i32 = EXPONENT_LEVEL + 1;
pub const EXISTENTIAL_LEVEL: i32 = LOGICAL_NOT_LEVEL + 1;
pub const INCREMENT_LEVEL: i32 = EXISTENTIAL_LEVEL + 1;
pub const MEMBER_ACCESS_LEVEL: i32 = INCREMENT_LEVEL + 1;

/// Canonical texts in resolution order: when a text maps to several kinds,
/// the earlier entry wins for that lookup class.
const CANONICAL_TEXTS: &[(Builtin, &str)] = &[
    (Builtin::Assignment, "="),
    (Builtin::AccessMember, "."),
    (Builtin::StatementDelimiter, ";"),
    (Builtin::ArgumentDelimiter, ","),
    (Builtin::PairSeparator, ":"),
    (Builtin::OpenParen, "("),
    (Builtin::CloseParen, ")"),
    (Builtin::OpenFunctionCall, "("),
    (Builtin::CloseFunctionCall, ")"),
    (Builtin::OpenCondition, "("),
    (Builtin::CloseCondition, ")"),
    (Builtin::OpenBlock, "{"),
    (Builtin::CloseBlock, "}"),
    (Builtin::Addition, "+"),
    (Builtin::AdditionAssignment, "+="),
    (Builtin::Increment, "++"),
    (Builtin::Subtraction, "-"),
    (Builtin::SubtractionAssignment, "-="),
    (Builtin::Decrement, "--"),
    (Builtin::Negation, "-"),
    (Builtin::Multiplication, "*"),
    (Builtin::MultiplicationAssignment, "*="),
    (Builtin::Division, "/"),
    (Builtin::DivisionAssignment, "/="),
    (Builtin::Modulus, "%"),
    (Builtin::ModulusAssignment, "%="),
    (Builtin::Exponent, "^"),
    (Builtin::ExponentAssignment, "^="),
    (Builtin::LessThan, "<"),
    (Builtin::LessThanOrEqual, "<="),
    (Builtin::GreaterThan, ">"),
    (Builtin::GreaterThanOrEqual, ">="),
    (Builtin::EqualTo, "=="),
    (Builtin::NotEqualTo, "!="),
    (Builtin::LogicalAnd, "and"),
    (Builtin::LogicalOr, "or"),
    (Builtin::LogicalNot, "not"),
    (Builtin::Exists, "exists"),
    (Builtin::VariableDeclarator, "var"),
    (Builtin::ConstantDeclarator, "let"),
    (Builtin::VariableDeclarationOperator, "="),
    (Builtin::IfStatement, "if"),
    (Builtin::ElseStatement, "else"),
    (Builtin::WhileStatement, "while"),
    (Builtin::ForStatement, "for"),
    (Builtin::TrueLiteral, "true"),
    (Builtin::FalseLiteral, "false"),
    (Builtin::NullLiteral, "null"),
    (Builtin::FunctionDeclaration, "func"),
    (Builtin::FunctionOpenArgumentList, "("),
    (Builtin::FunctionCloseArgumentList, ")"),
    (Builtin::Return, "return"),
    (Builtin::Break, "break"),
    (Builtin::Continue, "continue"),
    (Builtin::OpenArrayLiteral, "["),
    (Builtin::CloseArrayLiteral, "]"),
    (Builtin::OpenSubscript, "["),
    (Builtin::CloseSubscript, "]"),
    (Builtin::ElementDelimiter, ","),
    (Builtin::OpenObjectLiteral, "{"),
    (Builtin::CloseObjectLiteral, "}"),
];

pub fn canonical_text(builtin: Builtin) -> &'static str {
    CANONICAL_TEXTS
        .iter()
        .find(|(kind, _)| *kind == builtin)
        .map(|(_, text)| *text)
        .unwrap_or("(unknown builtin)")
}

pub fn info(builtin: Builtin) -> BuiltinInfo {
    use BindingDirection::{LeftAssociative, Prefix, Postfix, RightAssociative};

    match builtin {
        Builtin::Assignment
        | Builtin::AdditionAssignment
        | Builtin::SubtractionAssignment
        | Builtin::MultiplicationAssignment
        | Builtin::DivisionAssignment
        | Builtin::ModulusAssignment
        | Builtin::ExponentAssignment => {
            BuiltinInfo::binary(ASSIGNMENT_LEVEL, RightAssociative)
        }

        Builtin::LogicalOr => BuiltinInfo::binary(LOGICAL_OR_LEVEL, LeftAssociative),
        Builtin::LogicalAnd => BuiltinInfo::binary(LOGICAL_AND_LEVEL, LeftAssociative),

        Builtin::EqualTo | Builtin::NotEqualTo => {
            BuiltinInfo::binary(EQUALITY_LEVEL, LeftAssociative)
        }

        Builtin::LessThan
        | Builtin::LessThanOrEqual
        | Builtin::GreaterThan
        | Builtin::GreaterThanOrEqual => BuiltinInfo::binary(ORDERING_LEVEL, LeftAssociative),

        Builtin::Addition | Builtin::Subtraction => {
            BuiltinInfo::binary(ADDITIVE_LEVEL, LeftAssociative)
        }

        Builtin::Multiplication | Builtin::Division | Builtin::Modulus => {
            BuiltinInfo::binary(MULTIPLICATIVE_LEVEL, LeftAssociative)
        }

        Builtin::Negation => BuiltinInfo::unary(NEGATION_LEVEL, Prefix),
        Builtin::Exponent => BuiltinInfo::binary(EXPONENT_LEVEL, RightAssociative),
        Builtin::LogicalNot => BuiltinInfo::unary(LOGICAL_NOT_LEVEL, Prefix),
        Builtin::Exists => BuiltinInfo::unary(EXISTENTIAL_LEVEL, Postfix),
        Builtin::Increment | Builtin::Decrement => BuiltinInfo::unary(INCREMENT_LEVEL, Prefix),
        Builtin::AccessMember => BuiltinInfo::binary(MEMBER_ACCESS_LEVEL, LeftAssociative),

        _ => BuiltinInfo::NOT_AN_OPERATOR,
    }
}

/// Is `text` the canonical text of any builtin?
pub fn is_builtin_text(text: &str) -> bool {
    CANONICAL_TEXTS.iter().any(|(_, canonical)| *canonical == text)
}

/// Is `text` the canonical text of this particular builtin?
pub fn builtin_has_text(builtin: Builtin, text: &str) -> bool {
    canonical_text(builtin) == text
}

/// The binary operator spelled `text`, if any.
pub fn binary_builtin_for(text: &str) -> Option<Builtin> {
    CANONICAL_TEXTS
        .iter()
        .find(|(kind, canonical)| *canonical == text && info(*kind).is_binary)
        .map(|(kind, _)| *kind)
}

/// The unary operator spelled `text`, if any.
pub fn unary_builtin_for(text: &str) -> Option<Builtin> {
    CANONICAL_TEXTS
        .iter()
        .find(|(kind, canonical)| {
            let op = info(*kind);
            *canonical == text && op.is_operator && !op.is_binary
        })
        .map(|(kind, _)| *kind)
}

pub fn is_assignment_operator(op: BuiltinInfo) -> bool {
    op.precedence == ASSIGNMENT_LEVEL
}

/// The arithmetic operator applied by a compound assignment (`+=` applies
/// `+`, and so on). Plain `=` has no arithmetic step.
pub fn compound_assignment_arithmetic(builtin: Builtin) -> Option<Builtin> {
    match builtin {
        Builtin::AdditionAssignment => Some(Builtin::Addition),
        Builtin::SubtractionAssignment => Some(Builtin::Subtraction),
        Builtin::MultiplicationAssignment => Some(Builtin::Multiplication),
        Builtin::DivisionAssignment => Some(Builtin::Division),
        Builtin::ModulusAssignment => Some(Builtin::Modulus),
        Builtin::ExponentAssignment => Some(Builtin::Exponent),
        _ => None,
    }
}

fn symbol_chars() -> &'static HashSet<char> {
    static SYMBOL_CHARS: OnceLock<HashSet<char>> = OnceLock::new();
    SYMBOL_CHARS.get_or_init(|| {
        CANONICAL_TEXTS
            .iter()
            .filter(|(_, text)| !text.starts_with(|c: char| c.is_ascii_alphabetic()))
            .flat_map(|(_, text)| text.chars())
            .collect()
    })
}

/// Characters that can start or extend an operator token, derived from the
/// canonical texts of the non-keyword builtins.
pub fn is_symbol_char(c: char) -> bool {
    symbol_chars().contains(&c)
}

fn keywords() -> &'static HashSet<&'static str> {
    static KEYWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        CANONICAL_TEXTS
            .iter()
            .filter(|(_, text)| text.starts_with(|c: char| c.is_ascii_alphabetic()))
            .map(|(_, text)| *text)
            .collect()
    })
}

/// Builtins whose canonical text begins with a letter.
pub fn is_keyword(text: &str) -> bool {
    keywords().contains(text)
}
