//! Resolution Scope
//!
//! The parser needs three things from its host: identifier lookup for
//! `{{name}}` tokens, invocation of function references, and somewhere to
//! report non-fatal diagnostics.

use crate::{ConfigError, FuncRef, Value};
use brisk_dom::NodeId;
use std::collections::HashMap;

/// Host services used while parsing and reading options
pub trait Scope {
    /// Look up an element by its assigned identifier
    fn resolve(&self, name: &str) -> Option<NodeId>;

    /// Call a function reference
    fn invoke(&mut self, func: &FuncRef, args: Vec<Value>) -> Result<Value, ConfigError>;

    /// Record a non-fatal problem
    fn report(&mut self, message: String);

    /// Arguments passed to a top-level function reference
    fn origin(&self) -> Vec<Value> {
        Vec::new()
    }
}

type Function = Box<dyn Fn(&[Value]) -> Value>;

/// Self-contained scope backed by maps
#[derive(Default)]
pub struct MapScope {
    ids: HashMap<String, NodeId>,
    functions: HashMap<String, Function>,
    diagnostics: Vec<String>,
}

impl MapScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, name: &str, element: NodeId) -> Self {
        self.ids.insert(name.to_string(), element);
        self
    }

    pub fn with_function(mut self, name: &str, f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        self.functions.insert(name.to_string(), Box::new(f));
        self
    }

    /// Diagnostics reported so far
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

impl Scope for MapScope {
    fn resolve(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    fn invoke(&mut self, func: &FuncRef, args: Vec<Value>) -> Result<Value, ConfigError> {
        let f = self
            .functions
            .get(func.name())
            .ok_or_else(|| ConfigError::UnknownFunction(func.name().to_string()))?;
        Ok(f(&args))
    }

    fn report(&mut self, message: String) {
        self.diagnostics.push(message);
    }
}
