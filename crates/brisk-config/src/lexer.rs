//! Configuration Lexer
//!
//! Tokenizes attribute text: object/list punctuation, quoted strings,
//! numbers, identifiers and `{{name}}` interpolation tokens.

use crate::ConfigError;

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Semicolon,
    Str(String),
    Num(f64),
    /// Identifier, possibly dotted (`app.save`)
    Ident(String),
    /// `{{name}}` token, kept verbatim
    Interp(String),
    Eof,
}

impl TokenKind {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Colon => "':'".into(),
            Self::Comma => "','".into(),
            Self::Semicolon => "';'".into(),
            Self::Str(s) => format!("string \"{s}\""),
            Self::Num(n) => format!("number {n}"),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Interp(t) => format!("token {t}"),
            Self::Eof => "end of input".into(),
        }
    }
}

/// Token with its byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Configuration lexer
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    /// Tokenize the whole input, ending with `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>, ConfigError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<Token, ConfigError> {
        self.skip_whitespace();
        let offset = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token { kind: TokenKind::Eof, offset });
        };

        let kind = match c {
            '{' => {
                if let Some(len) = self.interp_len() {
                    let text = self.rest()[..len].to_string();
                    self.pos += len;
                    TokenKind::Interp(text)
                } else {
                    self.advance();
                    TokenKind::LBrace
                }
            }
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '"' | '\'' => TokenKind::Str(self.string(c)?),
            '0'..='9' | '-' | '+' | '.' => TokenKind::Num(self.number()?),
            c if is_ident_start(c) => TokenKind::Ident(self.identifier()),
            other => return Err(ConfigError::UnexpectedChar { ch: other, offset }),
        };
        Ok(Token { kind, offset })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Length of a `{{name}}` token at the cursor, if one starts here.
    /// `{{{` never starts a token; names are identifier-like so that
    /// `{{a:1}}` still lexes as nested braces.
    fn interp_len(&self) -> Option<usize> {
        let rest = self.rest();
        if !rest.starts_with("{{") || rest.starts_with("{{{") {
            return None;
        }
        let close = rest[2..].find('}')?;
        if close == 0 || !rest[2 + close..].starts_with("}}") {
            return None;
        }
        let name = rest[2..2 + close].trim();
        let valid = !name.is_empty()
            && name.chars().all(|c| is_ident_part(c) || c == '-' || c == '.');
        if !valid {
            return None;
        }
        Some(close + 4)
    }

    fn string(&mut self, quote: char) -> Result<String, ConfigError> {
        let start = self.pos;
        self.advance();
        let mut out = String::new();
        while let Some(c) = self.advance() {
            match c {
                c if c == quote => return Ok(out),
                '\\' => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('u') => out.push(self.unicode_escape(start)?),
                    Some(other) => out.push(other),
                    None => break,
                },
                _ => out.push(c),
            }
        }
        Err(ConfigError::UnterminatedString(start))
    }

    fn unicode_escape(&mut self, start: usize) -> Result<char, ConfigError> {
        let hex: String = (0..4).filter_map(|_| self.advance()).collect();
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ConfigError::InvalidEscape(start))
    }

    fn number(&mut self) -> Result<f64, ConfigError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        if matches!(self.peek(), Some('e' | 'E'))
            && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+')
        {
            self.advance();
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber(text.to_string()))
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| is_ident_part(c) || c == '.') {
            self.advance();
        }
        self.source[start..self.pos].to_string()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
