use crate::ast::{ElementNode, Fragment, Node, is_void};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Where errors are reported: the token under the cursor, or the last
    /// one once the cursor has run off the end.
    fn here(&self) -> Option<&TokenWithPos> {
        self.tokens.get(self.pos).or(self.tokens.last())
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&Token::Eof, |t| &t.token)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        self.pos = (self.pos + 1).min(self.tokens.len());
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.here().map_or((1, 1), |t| (t.line, t.col));
        ParseError::new(msg, line, col)
    }

    // ── Fragment ──────────────────────────────────────────────────────────

    pub fn parse_fragment(&mut self) -> Result<Fragment, ParseError> {
        let nodes = self.parse_nodes(None)?;
        Ok(Fragment { nodes })
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Parse sibling nodes until the closing tag of `parent` (or EOF at the
    /// top level).
    fn parse_nodes(&mut self, parent: Option<&str>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            match self.peek() {
                Token::Eof => {
                    if let Some(tag) = parent {
                        return Err(self.err(format!("unclosed <{tag}> at end of input")));
                    }
                    break;
                }
                Token::CloseTag(name) => {
                    if parent == Some(name.as_str()) {
                        self.advance();
                        break;
                    }
                    return Err(match parent {
                        Some(tag) => self.err(format!("expected </{tag}>, got </{name}>")),
                        None => self.err(format!("unexpected closing tag </{name}>")),
                    });
                }
                Token::Text(text) => {
                    // Indentation between elements carries no content.
                    if !text.trim().is_empty() {
                        nodes.push(Node::Text(text.clone()));
                    }
                    self.advance();
                }
                Token::OpenTag { .. } => nodes.push(Node::Element(self.parse_element()?)),
            }
        }

        Ok(nodes)
    }

    // ── Element ───────────────────────────────────────────────────────────

    fn parse_element(&mut self) -> Result<ElementNode, ParseError> {
        let Token::OpenTag { name, attrs, self_closing } = self.advance() else {
            return Err(self.err("expected an opening tag"));
        };

        let children = if self_closing || is_void(&name) {
            Vec::new()
        } else {
            self.parse_nodes(Some(&name))?
        };

        Ok(ElementNode { tag: name, attrs, children })
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse a markup source string into a [`Fragment`].
pub fn parse_str(src: &str) -> Result<Fragment, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_fragment()
}
