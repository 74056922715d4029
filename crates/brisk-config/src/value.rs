//! Configuration Values
//!
//! [`Value`] is what attribute text evaluates to. Objects become
//! [`Options`]: ordered fields with case-insensitive lookup and typed
//! accessors that invoke delegate fields before coercing.

use crate::coerce::{format_number, truthy};
use crate::{ConfigError, Scope};
use brisk_dom::NodeId;
use std::collections::HashMap;

/// Reference to a host-registered function, by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncRef(String);

impl FuncRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FuncRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Evaluated configuration value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Options(Options),
    Func(FuncRef),
    /// Element resolved from a `{{name}}` token
    Element(NodeId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Value::Element(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncRef> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&Options> {
        match self {
            Value::Options(o) => Some(o),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Options(_) => "object",
            Value::Func(_) => "function",
            Value::Element(_) => "element",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Element(id)
    }
}

impl From<Options> for Value {
    fn from(o: Options) -> Self {
        Value::Options(o)
    }
}

/// Object value: declared fields in order plus a lowercase lookup
#[derive(Debug, Clone, Default)]
pub struct Options {
    fields: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl PartialEq for Options {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field; a replaced field keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let lower = key.to_lowercase();
        if let Some(&i) = self.index.get(&lower) {
            self.fields[i].1 = value;
        } else {
            self.index.insert(lower, self.fields.len());
            self.fields.push((key, value));
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Case-insensitive field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index
            .get(&key.to_lowercase())
            .map(|&i| &self.fields[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self.index.get(&key.to_lowercase()) {
            Some(&i) => Some(&mut self.fields[i].1),
            None => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_lowercase())
    }

    /// Declared name of the field at `position`
    pub fn key_at(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(|(k, _)| k.as_str())
    }

    /// Value of the field at `position`
    pub fn value_at(&self, position: usize) -> Option<&Value> {
        self.fields.get(position).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.fields.iter_mut().map(|(_, v)| v)
    }

    /// Field value after invoking a delegate field with these options
    fn effective(&self, field: &str, scope: &mut dyn Scope) -> Result<Option<Value>, ConfigError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Func(func)) => {
                let result = scope.invoke(func, vec![Value::Options(self.clone())])?;
                Ok(Some(result).filter(|v| !v.is_null()))
            }
            Some(other) => Ok(Some(other.clone())),
        }
    }

    /// Boolean field; strings use the truthy word list
    pub fn expect_bool(&self, field: &str, scope: &mut dyn Scope) -> Result<Option<bool>, ConfigError> {
        Ok(self.effective(field, scope)?.map(|v| match v {
            Value::Bool(b) => b,
            Value::Str(s) => truthy(&s),
            Value::Number(n) => n == 1.0,
            _ => false,
        }))
    }

    /// Numeric field; numeric text is accepted
    pub fn expect_num(&self, field: &str, scope: &mut dyn Scope) -> Result<Option<f64>, ConfigError> {
        match self.effective(field, scope)? {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n)),
            Some(Value::Bool(b)) => Ok(Some(if b { 1.0 } else { 0.0 })),
            Some(Value::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::Str(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{s}' is not a number"),
                }
            }),
            Some(other) => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected a number, found {}", other.kind()),
            }),
        }
    }

    /// String field; numbers and booleans are rendered as text
    pub fn expect_str(&self, field: &str, scope: &mut dyn Scope) -> Result<Option<String>, ConfigError> {
        match self.effective(field, scope)? {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(format_number(n))),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected text, found {}", other.kind()),
            }),
        }
    }

    /// Function-reference field; anything else set there is an error
    pub fn expect_func(&self, field: &str) -> Result<Option<FuncRef>, ConfigError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Func(func)) => Ok(Some(func.clone())),
            Some(other) => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected a function, found {}", other.kind()),
            }),
        }
    }
}

/// Result of parsing one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Options(Options),
    List(Vec<Value>),
}

impl Parsed {
    /// Number of top-level entries (fields or list items)
    pub fn len(&self) -> usize {
        match self {
            Parsed::Options(o) => o.len(),
            Parsed::List(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_options(&self) -> Option<&Options> {
        match self {
            Parsed::Options(o) => Some(o),
            Parsed::List(_) => None,
        }
    }

    /// First entry, whichever shape
    pub fn first(&self) -> Option<&Value> {
        match self {
            Parsed::Options(o) => o.value_at(0),
            Parsed::List(l) => l.first(),
        }
    }

    /// Options view; list items are keyed by their position
    pub fn into_options(self) -> Options {
        match self {
            Parsed::Options(o) => o,
            Parsed::List(items) => items
                .into_iter()
                .enumerate()
                .fold(Options::new(), |opts, (i, v)| opts.with(i.to_string(), v)),
        }
    }
}
