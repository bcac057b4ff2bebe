use crate::ast::Attr;
use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<tag attr="v">` or `<tag/>`
    OpenTag { name: String, attrs: Vec<Attr>, self_closing: bool },
    /// `</tag>`
    CloseTag(String),
    /// Decoded character data between tags.
    Text(String),
    // Sentinel
    Eof,
}

/// A token plus the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPos {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.token == Token::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.line, self.col)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skips `<!-- ... -->` and `<!doctype ...>` declarations.
    fn skip_declarations(&mut self) -> Result<(), ParseError> {
        loop {
            if self.rest().starts_with("<!--") {
                let (line, col) = (self.line, self.col);
                self.advance_n(4);
                loop {
                    if self.rest().starts_with("-->") {
                        self.advance_n(3);
                        break;
                    }
                    if self.advance().is_none() {
                        return Err(ParseError::new("unterminated comment", line, col));
                    }
                }
            } else if self.rest().starts_with("<!") {
                let (line, col) = (self.line, self.col);
                while self.peek() != Some('>') {
                    if self.advance().is_none() {
                        return Err(ParseError::new("unterminated declaration", line, col));
                    }
                }
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    fn next_token(&mut self) -> Result<TokenWithPos, ParseError> {
        self.skip_declarations()?;

        let (line, col) = (self.line, self.col);
        let token = match (self.peek(), self.peek_second()) {
            (None, _) => Token::Eof,
            (Some('<'), Some('/')) => self.lex_close_tag()?,
            (Some('<'), Some(c)) if c.is_ascii_alphabetic() => self.lex_open_tag()?,
            _ => self.lex_text(),
        };
        Ok(TokenWithPos { token, line, col })
    }

    fn lex_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_') {
            self.advance();
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn lex_close_tag(&mut self) -> Result<Token, ParseError> {
        self.advance_n(2); // consume `</`
        let name = self.lex_name();
        if name.is_empty() {
            return Err(self.err("expected a tag name after `</`"));
        }
        self.skip_whitespace();
        match self.advance() {
            Some('>') => Ok(Token::CloseTag(name)),
            Some(c) => Err(self.err(format!("unexpected {c:?} in closing tag </{name}>"))),
            None => Err(self.err(format!("unterminated closing tag </{name}>"))),
        }
    }

    fn lex_open_tag(&mut self) -> Result<Token, ParseError> {
        self.advance(); // consume `<`
        let name = self.lex_name();
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.advance_n(2);
                return Ok(Token::OpenTag { name, attrs, self_closing: true });
            }
            match self.peek() {
                Some('>') => {
                    self.advance();
                    return Ok(Token::OpenTag { name, attrs, self_closing: false });
                }
                None => return Err(self.err(format!("unterminated tag <{name}>"))),
                Some(_) => attrs.push(self.lex_attr(&name)?),
            }
        }
    }

    fn lex_attr(&mut self, tag: &str) -> Result<Attr, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\''))
        {
            self.advance();
        }
        if start == self.pos {
            let c = self.peek().unwrap_or(' ');
            return Err(self.err(format!("unexpected {c:?} inside <{tag}>")));
        }
        let name = self.src[start..self.pos].to_ascii_lowercase();

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Ok(Attr { name, value: String::new() });
        }
        self.advance(); // consume `=`
        self.skip_whitespace();

        let raw = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                let (line, col) = (self.line, self.col);
                self.advance();
                let begin = self.pos;
                loop {
                    match self.peek() {
                        None => {
                            return Err(ParseError::new(
                                format!("unterminated value for attribute `{name}`"),
                                line,
                                col,
                            ));
                        }
                        Some(c) if c == q => break,
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                let raw = &self.src[begin..self.pos];
                self.advance(); // closing quote
                raw
            }
            _ => {
                let begin = self.pos;
                while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '>') {
                    if self.rest().starts_with("/>") {
                        break;
                    }
                    self.advance();
                }
                &self.src[begin..self.pos]
            }
        };

        Ok(Attr { name, value: decode_entities(raw) })
    }

    fn lex_text(&mut self) -> Token {
        let start = self.pos;
        // A `<` that does not open a tag, a closing tag or a declaration is
        // plain character data.
        self.advance();
        loop {
            match (self.peek(), self.peek_second()) {
                (None, _) => break,
                (Some('<'), Some(c)) if c.is_ascii_alphabetic() || c == '/' || c == '!' => break,
                _ => {
                    self.advance();
                }
            }
        }
        Token::Text(decode_entities(&self.src[start..self.pos]))
    }
}

// ── Entities ──────────────────────────────────────────────────────────────

/// Decodes the named and numeric character references markup authors use in
/// practice. Unknown references are kept verbatim.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let name = &tail[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse::<u32>().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
