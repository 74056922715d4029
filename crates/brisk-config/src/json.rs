//! Conversion between configuration values and JSON.

use crate::{Options, Value};
use brisk_dom::NodeId;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                let mut options = Options::new();
                for (k, v) in map {
                    options.insert(k, Value::from(v));
                }
                Value::Options(options)
            }
        }
    }
}

impl Value {
    /// Convert to JSON; elements are mapped by `element`, function
    /// references become null
    pub fn to_json(&self, element: &dyn Fn(NodeId) -> serde_json::Value) -> serde_json::Value {
        match self {
            Value::Null | Value::Func(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json(element)).collect())
            }
            Value::Options(options) => serde_json::Value::Object(
                options
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json(element)))
                    .collect(),
            ),
            Value::Element(id) => element(*id),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
