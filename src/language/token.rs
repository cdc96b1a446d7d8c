use crate::language::builtin::{self, Builtin};
use crate::language::location::SourceLocation;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Builtin,
    NumberLiteral,
    StringLiteral,
    Identifier,
    Comment,
    Invalid,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Builtin => "builtin",
            TokenKind::NumberLiteral => "number",
            TokenKind::StringLiteral => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// One lexeme: its classification, raw text (decoded text for string
/// literals), and where it started. Immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Does this token spell the given builtin? Keywords and operator
    /// glyphs both lex as `TokenKind::Builtin`; the positional ambiguity
    /// of shared texts is resolved by the caller asking for the kind it
    /// expects here.
    pub fn is(&self, builtin: Builtin) -> bool {
        self.kind == TokenKind::Builtin && builtin::builtin_has_text(builtin, &self.text)
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:?}\t{}", self.kind, self.text, self.location)
    }
}
