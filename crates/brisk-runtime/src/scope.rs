//! Configuration scope over the runtime
//!
//! `{{name}}` tokens resolve through the identifier index and function
//! references call registered delegates. A top-level function reference
//! receives the element and the marker name.

use crate::{BindError, Runtime};
use brisk_config::{ConfigError, FuncRef, Scope, Value};
use brisk_dom::NodeId;

pub(crate) struct RuntimeScope<'a> {
    rt: &'a mut Runtime,
    element: NodeId,
    marker: String,
}

impl<'a> RuntimeScope<'a> {
    pub(crate) fn new(rt: &'a mut Runtime, element: NodeId, marker: &str) -> Self {
        Self {
            rt,
            element,
            marker: marker.to_string(),
        }
    }
}

impl Scope for RuntimeScope<'_> {
    fn resolve(&self, name: &str) -> Option<NodeId> {
        self.rt.ids.get(name)
    }

    fn invoke(&mut self, func: &FuncRef, args: Vec<Value>) -> Result<Value, ConfigError> {
        self.rt.call_func(func, &args).map_err(|err| match err {
            BindError::UnknownDelegate(name) => ConfigError::UnknownFunction(name),
            BindError::Delegate { name, message } => ConfigError::Delegate { name, message },
            other => ConfigError::Delegate {
                name: func.name().to_string(),
                message: other.to_string(),
            },
        })
    }

    fn report(&mut self, message: String) {
        self.rt
            .report(format!("[{}] on {}: {}", self.marker, self.element, message));
    }

    fn origin(&self) -> Vec<Value> {
        vec![Value::Element(self.element), Value::Str(self.marker.clone())]
    }
}
