use crate::language::location::SourceLocation;
use crate::language::token::Token;

/// Forward cursor over the lexer's output; the parser's only view of the
/// token sequence. With `skip_comments` set, comment tokens are invisible
/// to `peek`/`eat`.
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
    skip_comments: bool,
    last_location: SourceLocation,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, filename: &str) -> Self {
        let mut stream = Self {
            tokens,
            position: 0,
            skip_comments: true,
            last_location: SourceLocation::start_of(filename),
        };
        stream.skip_ignored();
        stream
    }

    pub fn with_comments(tokens: Vec<Token>, filename: &str) -> Self {
        Self {
            tokens,
            position: 0,
            skip_comments: false,
            last_location: SourceLocation::start_of(filename),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn has_next(&self) -> bool {
        !self.is_empty()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Advance past the current token (and any comments behind it).
    pub fn eat(&mut self) {
        if let Some(token) = self.tokens.get(self.position) {
            self.last_location = token.location.clone();
            self.position += 1;
            self.skip_ignored();
        }
    }

    /// The current token's location, or the last seen one once the input
    /// is exhausted, so diagnostics at end-of-input still point somewhere
    /// useful. Never fails.
    pub fn current_location(&self) -> SourceLocation {
        match self.peek() {
            Some(token) => token.location.clone(),
            None => self.last_location.clone(),
        }
    }

    fn skip_ignored(&mut self) {
        if !self.skip_comments {
            return;
        }
        while let Some(token) = self.tokens.get(self.position) {
            if !token.is_comment() {
                break;
            }
            self.last_location = token.location.clone();
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lexer::tokenize;

    fn stream(source: &str) -> TokenStream {
        let (tokens, errors) = tokenize(source, "test");
        assert_eq!(errors, 0);
        TokenStream::new(tokens, "test")
    }

    #[test]
    fn comments_are_invisible_when_skipped() {
        let mut s = stream("1 # comment\n2 #- c -# 3");
        let mut seen = Vec::new();
        while let Some(token) = s.peek() {
            seen.push(token.text.clone());
            s.eat();
        }
        assert_eq!(seen, ["1", "2", "3"]);
    }

    #[test]
    fn comments_are_visible_on_request() {
        let (tokens, _) = tokenize("1 # comment", "test");
        let mut s = TokenStream::with_comments(tokens, "test");
        s.eat();
        assert!(s.peek().is_some_and(|t| t.is_comment()));
    }

    #[test]
    fn location_survives_end_of_input() {
        let mut s = stream("a b");
        let last = loop {
            let location = s.current_location();
            if !s.has_next() {
                break location;
            }
            s.eat();
        };
        assert_eq!(s.current_location(), last);
        assert_eq!(last.column, 2);
    }

    #[test]
    fn leading_comments_are_skipped_immediately() {
        let s = stream("# lead\nx");
        assert_eq!(s.peek().unwrap().text, "x");
    }
}
