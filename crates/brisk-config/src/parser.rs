//! Literal Parser
//!
//! Recursive descent over the token stream. The grammar is data only:
//! objects, lists, strings, numbers, booleans, null, function references
//! and interpolation tokens. Nothing is executed while parsing.

use crate::lexer::{Lexer, Token, TokenKind};
use crate::{ConfigError, FuncRef, Options, Value};

/// Deepest object/list nesting accepted in one text
const MAX_NESTING: usize = 64;

/// Statement in a call list: `name(arg, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub func: FuncRef,
    pub args: Vec<Value>,
}

/// Parser over a tokenized input
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            tokens: Lexer::new(source).tokenize()?,
            pos: 0,
            depth: 0,
        })
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.offset).unwrap_or(0)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> ConfigError {
        ConfigError::UnexpectedToken {
            found: self.peek().describe(),
            expected,
            offset: self.offset(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ConfigError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Parse the input as the contents of a list literal
    pub fn parse_sequence(&mut self) -> Result<Vec<Value>, ConfigError> {
        let items = self.parse_items(&TokenKind::Eof)?;
        self.expect(&TokenKind::Eof, "end of input")?;
        Ok(items)
    }

    /// Comma-separated values up to (not consuming) `end`; trailing comma allowed
    fn parse_items(&mut self, end: &TokenKind) -> Result<Vec<Value>, ConfigError> {
        let mut items = Vec::new();
        while self.peek() != end {
            items.push(self.parse_value()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Parse a single value
    pub fn parse_value(&mut self) -> Result<Value, ConfigError> {
        match self.peek().clone() {
            TokenKind::LBrace => self.nested(Self::parse_object),
            TokenKind::LBracket => self.nested(|parser| {
                parser.advance();
                let items = parser.parse_items(&TokenKind::RBracket)?;
                parser.expect(&TokenKind::RBracket, "',' or ']'")?;
                Ok(Value::List(items))
            }),
            TokenKind::Str(s) | TokenKind::Interp(s) => {
                self.advance();
                Ok(Value::Str(s))
            }
            TokenKind::Num(n) => {
                self.advance();
                Ok(Value::Number(n))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(match name.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" | "undefined" => Value::Null,
                    "NaN" => Value::Number(f64::NAN),
                    _ => Value::Func(FuncRef::new(name)),
                })
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested<F>(&mut self, parse: F) -> Result<Value, ConfigError>
    where
        F: FnOnce(&mut Self) -> Result<Value, ConfigError>,
    {
        if self.depth >= MAX_NESTING {
            return Err(ConfigError::TooDeep);
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_object(&mut self) -> Result<Value, ConfigError> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut options = Options::new();
        while self.peek() != &TokenKind::RBrace {
            let key = match self.advance() {
                TokenKind::Ident(k) | TokenKind::Str(k) => k,
                TokenKind::Num(n) => crate::coerce::format_number(n),
                _ => {
                    self.pos -= 1;
                    return Err(self.unexpected("a field name"));
                }
            };
            self.expect(&TokenKind::Colon, "':'")?;
            let value = self.parse_value()?;
            options.insert(key, value);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "',' or '}'")?;
        Ok(Value::Options(options))
    }

    /// Parse `name(args); name(args)` statements
    pub fn parse_statements(&mut self) -> Result<Vec<Statement>, ConfigError> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&TokenKind::Semicolon) {}
            if self.peek() == &TokenKind::Eof {
                return Ok(statements);
            }
            let TokenKind::Ident(name) = self.peek().clone() else {
                return Err(self.unexpected("a function name"));
            };
            self.advance();
            let args = if self.eat(&TokenKind::LParen) {
                let args = self.parse_items(&TokenKind::RParen)?;
                self.expect(&TokenKind::RParen, "',' or ')'")?;
                args
            } else {
                Vec::new()
            };
            statements.push(Statement { func: FuncRef::new(name), args });
            if !matches!(self.peek(), TokenKind::Semicolon | TokenKind::Eof) {
                return Err(self.unexpected("';'"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> Value {
        Parser::new(text)
            .unwrap()
            .parse_sequence()
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_parse_object() {
        let value = parse_one("{url: '/x', refreshInterval: 5, delayed: true, 'quoted key': null,}");
        let opts = value.as_options().unwrap();
        assert_eq!(opts.get("url"), Some(&Value::from("/x")));
        assert_eq!(opts.get("refreshinterval"), Some(&Value::Number(5.0)));
        assert_eq!(opts.get("delayed"), Some(&Value::Bool(true)));
        assert_eq!(opts.get("quoted key"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_nested() {
        let value = parse_one("{headers: {Accept: 'text/html'}, ids: [1, 'a', [true]]}");
        let opts = value.as_options().unwrap();
        assert!(opts.get("headers").and_then(Value::as_options).is_some());
        assert_eq!(
            opts.get("ids"),
            Some(&Value::List(vec![
                Value::Number(1.0),
                Value::from("a"),
                Value::List(vec![Value::Bool(true)]),
            ]))
        );
    }

    #[test]
    fn test_function_reference() {
        let value = parse_one("{callback: app.done}");
        assert_eq!(
            value.as_options().and_then(|o| o.get("callback")),
            Some(&Value::Func(FuncRef::new("app.done")))
        );
    }

    #[test]
    fn test_missing_colon() {
        let err = Parser::new("{url '/x'}").unwrap().parse_sequence().unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedToken { expected: "':'", .. }));
    }

    #[test]
    fn test_trailing_garbage() {
        let err = Parser::new("{a:1} }").unwrap().parse_sequence().unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_statements() {
        let statements = Parser::new("save(1, {{form}}); ;notify")
            .unwrap()
            .parse_statements()
            .unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].func.name(), "save");
        assert_eq!(statements[0].args[1], Value::from("{{form}}"));
        assert!(statements[1].args.is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
        let err = Parser::new(&deep).unwrap().parse_sequence().unwrap_err();
        assert_eq!(err, ConfigError::TooDeep);

        let objects = format!("{}1{}", "{a: ".repeat(MAX_NESTING + 1), "}".repeat(MAX_NESTING + 1));
        assert_eq!(Parser::new(&objects).unwrap().parse_sequence(), Err(ConfigError::TooDeep));

        let fits = format!("{}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(Parser::new(&fits).unwrap().parse_sequence().is_ok());
    }

    #[test]
    fn test_statement_requires_separator() {
        assert!(Parser::new("a() b()").unwrap().parse_statements().is_err());
    }
}
