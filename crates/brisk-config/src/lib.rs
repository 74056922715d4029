//! brisk Config - Attribute Configuration Language
//!
//! Marker attributes carry small literal texts such as
//! `{url: '/items', refreshInterval: 30, target: {{list}}}`. This crate
//! turns that text into [`Options`] or a list of [`Value`]s, resolving
//! `{{name}}` tokens to elements through a [`Scope`].
//!
//! Parsing never executes code. Bare identifiers become [`FuncRef`]s that
//! the scope resolves to host-registered functions.

mod lexer;
mod parser;
mod value;
mod scope;
mod json;
pub mod coerce;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, Statement};
pub use value::{FuncRef, Options, Parsed, Value};
pub use scope::{MapScope, Scope};

use coerce::bare_token;

/// Nested literal texts are re-parsed at most this deep
const MAX_DEPTH: usize = 8;

/// Configuration error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape in string starting at offset {0}")]
    InvalidEscape(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{name}' failed: {message}")]
    Delegate { name: String, message: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("configuration nested too deeply")]
    TooDeep,
}

/// Parse attribute text into options or a list.
///
/// A top-level function reference is invoked with [`Scope::origin`] and its
/// result used instead. A string result that itself looks like an object
/// or list literal is parsed again. Scalars become one-item lists. Finally
/// every string field that is exactly a `{{name}}` token is replaced by the
/// element the scope resolves; unresolved tokens stay as text and are
/// reported once each.
pub fn parse(text: &str, scope: &mut dyn Scope) -> Result<Parsed, ConfigError> {
    parse_at_depth(text, scope, 0)
}

fn parse_at_depth(text: &str, scope: &mut dyn Scope, depth: usize) -> Result<Parsed, ConfigError> {
    if depth > MAX_DEPTH {
        return Err(ConfigError::TooDeep);
    }
    let mut value = match Parser::new(text)?.parse_sequence()?.into_iter().next() {
        Some(value) => value,
        None => return Ok(Parsed::List(Vec::new())),
    };

    if let Value::Func(func) = &value {
        let args = scope.origin();
        value = scope.invoke(func, args)?;
    }

    if let Value::Str(s) = &value {
        let trimmed = s.trim();
        if (trimmed.starts_with('{') || trimmed.starts_with('[')) && bare_token(trimmed).is_none() {
            let nested = trimmed.to_string();
            return parse_at_depth(&nested, scope, depth + 1);
        }
    }

    let mut parsed = match value {
        Value::Options(options) => Parsed::Options(options),
        Value::List(items) => Parsed::List(items),
        other => Parsed::List(vec![other]),
    };
    match &mut parsed {
        Parsed::Options(options) => options.values_mut().for_each(|v| resolve_tokens(v, scope)),
        Parsed::List(items) => items.iter_mut().for_each(|v| resolve_tokens(v, scope)),
    }
    Ok(parsed)
}

/// Replace whole-field `{{name}}` tokens inside `value`
fn resolve_tokens(value: &mut Value, scope: &mut dyn Scope) {
    match value {
        Value::Str(text) => {
            let Some(name) = bare_token(text).map(str::to_string) else {
                return;
            };
            match scope.resolve(&name) {
                Some(element) => *value = Value::Element(element),
                None => {
                    let message = format!("{{{{{name}}}}} not found");
                    tracing::warn!("{}", message);
                    scope.report(message);
                }
            }
        }
        Value::List(items) => items.iter_mut().for_each(|v| resolve_tokens(v, scope)),
        Value::Options(options) => options.values_mut().for_each(|v| resolve_tokens(v, scope)),
        _ => {}
    }
}

/// Parse a call list and resolve its `{{name}}` arguments.
///
/// Tokens that do not resolve become null arguments.
pub fn parse_statements(text: &str, scope: &mut dyn Scope) -> Result<Vec<Statement>, ConfigError> {
    let mut statements = Parser::new(text)?.parse_statements()?;
    for statement in &mut statements {
        for arg in &mut statement.args {
            resolve_statement_arg(arg, scope);
        }
    }
    Ok(statements)
}

fn resolve_statement_arg(value: &mut Value, scope: &dyn Scope) {
    match value {
        Value::Str(text) => {
            if let Some(name) = bare_token(text).map(str::to_string) {
                *value = scope.resolve(&name).map(Value::Element).unwrap_or(Value::Null);
            }
        }
        Value::List(items) => items.iter_mut().for_each(|v| resolve_statement_arg(v, scope)),
        Value::Options(options) => options.values_mut().for_each(|v| resolve_statement_arg(v, scope)),
        _ => {}
    }
}
