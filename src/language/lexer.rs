use crate::language::builtin;
use crate::language::location::SourceLocation;
use crate::language::token::{Token, TokenKind};
use crate::tools::diagnostics;
use std::rc::Rc;

/// Lex `source` into a flat token sequence. Lexical errors are reported
/// through the diagnostic sink and counted; lexing always consumes the
/// whole input.
pub fn tokenize(source: &str, filename: &str) -> (Vec<Token>, usize) {
    let lexer = Lexer::new(source, filename);
    lexer.run()
}

struct Lexer<'a> {
    chars: std::str::Chars<'a>,
    current: Option<char>,
    file: Rc<str>,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    error_count: usize,
}

fn is_identifier_char(c: char, allow_digits: bool) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (allow_digits && c.is_ascii_digit())
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, filename: &str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            chars,
            current,
            file: Rc::from(filename),
            line: 0,
            column: 0,
            tokens: Vec::new(),
            error_count: 0,
        }
    }

    fn run(mut self) -> (Vec<Token>, usize) {
        while let Some(c) = self.current {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                c if is_identifier_char(c, false) => self.lex_identifier(),
                c if c.is_ascii_digit() => self.lex_number(),
                quote @ ('"' | '\'') => self.lex_string(quote),
                '#' => self.lex_comment(),
                c if builtin::is_symbol_char(c) => self.lex_operator(c),
                _ => self.lex_invalid(),
            }
        }

        (self.tokens, self.error_count)
    }

    /// Consume the current character, keeping the line/column counters in
    /// step with it.
    fn bump(&mut self) -> Option<char> {
        if let Some(c) = self.current {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.current = self.chars.next();
        self.current
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(Rc::clone(&self.file), self.line, self.column)
    }

    fn push_token(&mut self, kind: TokenKind, text: String, location: SourceLocation) {
        self.tokens.push(Token::new(kind, text, location));
    }

    fn error(&mut self, location: &SourceLocation, message: &str) {
        self.error_count += 1;
        diagnostics::report_error(location, message);
    }

    fn lex_identifier(&mut self) {
        let start = self.location();
        let mut identifier = String::new();

        while let Some(c) = self.current {
            if is_identifier_char(c, true) {
                identifier.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let kind = if builtin::is_keyword(&identifier) {
            TokenKind::Builtin
        } else {
            TokenKind::Identifier
        };
        self.push_token(kind, identifier, start);
    }

    fn lex_number(&mut self) {
        let start = self.location();
        let mut literal = String::new();

        while let Some(c) = self.current {
            if c.is_ascii_digit() {
                literal.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let mut missing_fractional_part = false;
        if self.current == Some('.') {
            literal.push('.');
            missing_fractional_part = true;
            self.bump();

            while let Some(c) = self.current {
                if c.is_ascii_digit() {
                    missing_fractional_part = false;
                    literal.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        if missing_fractional_part {
            self.error(&start, "missing fractional part of number literal");
        } else {
            self.push_token(TokenKind::NumberLiteral, literal, start);
        }
    }

    fn lex_string(&mut self, quote: char) {
        let start = self.location();
        let unterminated = if quote == '"' {
            "expected closing double quote"
        } else {
            "expected closing single quote"
        };
        self.bump();

        let mut literal = String::new();
        loop {
            match self.current {
                None => {
                    self.error(&start, unterminated);
                    return;
                }
                Some('\\') => {
                    self.bump();
                    match self.current {
                        None => {
                            self.error(&start, unterminated);
                            return;
                        }
                        Some(escaped) => {
                            literal.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                '\\' => '\\',
                                '\'' => '\'',
                                '"' => '"',
                                other => other,
                            });
                            self.bump();
                        }
                    }
                }
                Some('\n') => {
                    self.error(&start, unterminated);
                    return;
                }
                Some(c) if c == quote => {
                    self.bump();
                    self.push_token(TokenKind::StringLiteral, literal, start);
                    return;
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_comment(&mut self) {
        let start = self.location();
        let mut comment = String::from('#');
        self.bump();

        if self.current == Some('-') {
            // Block comment, closed by `-#` or end of input.
            loop {
                match self.current {
                    None => break,
                    Some(c) => {
                        let after_hyphen = comment.ends_with('-');
                        comment.push(c);
                        self.bump();
                        if after_hyphen && c == '#' {
                            break;
                        }
                    }
                }
            }
        } else {
            loop {
                match self.current {
                    None => break,
                    Some('\n') => {
                        self.bump();
                        break;
                    }
                    Some(c) => {
                        comment.push(c);
                        self.bump();
                    }
                }
            }
        }

        self.push_token(TokenKind::Comment, comment, start);
    }

    /// Maximal munch: greedily extend the glyph run while the text is still
    /// a prefix of some builtin, emitting the longest known operator.
    fn lex_operator(&mut self, first: char) {
        let start = self.location();
        let mut op = String::from(first);
        self.bump();
        let mut matched = builtin::is_builtin_text(&op);

        loop {
            match self.current {
                Some(c) if builtin::is_symbol_char(c) => {
                    let mut extended = op.clone();
                    extended.push(c);

                    if matched && !builtin::is_builtin_text(&extended) {
                        self.push_token(TokenKind::Builtin, op, start);
                        return;
                    }

                    self.bump();
                    matched = builtin::is_builtin_text(&extended);
                    op = extended;
                }
                _ => {
                    if matched {
                        self.push_token(TokenKind::Builtin, op, start);
                    } else {
                        let message = format!("unknown operator: {op}");
                        self.error(&start, &message);
                    }
                    return;
                }
            }
        }
    }

    fn lex_invalid(&mut self) {
        let start = self.location();
        let mut text = String::new();

        while let Some(c) = self.current {
            if c.is_whitespace() {
                break;
            }
            text.push(c);
            self.bump();
        }

        let message = format!("invalid text: {text}");
        self.error(&start, &message);
    }
}
