use std::fmt;

/// Markup that could not be read into an element tree.
///
/// `line` and `col` point at the character where the offending tag, attribute
/// or comment starts, counting both from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl ParseError {
    pub(crate) fn new(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self { message: msg.into(), line, col }
    }

    /// `(line, col)` of the error.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.col)
    }
}

impl std::error::Error for ParseError {}
