use std::fmt;
use std::rc::Rc;

/// Position of a token or AST node in its source text. Lines and columns
/// are zero-based; the filename is whatever the driver handed to the lexer
/// (`(command line)` for `-r` input, `(stdin)` for piped input).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: Rc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    pub fn start_of(file: &str) -> Self {
        Self {
            file: Rc::from(file),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_file_line_column() {
        let loc = SourceLocation::new(Rc::from("demo.rill"), 3, 14);
        assert_eq!(loc.to_string(), "demo.rill:3:14");
    }
}
