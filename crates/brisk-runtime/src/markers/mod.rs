//! Built-in markers
//!
//! Every handler here follows the same shape: claim the element's processed
//! flag, parse the attribute into options, validate them into settings and
//! install listeners or timers. On success the attribute value is cleared;
//! on failure the bind pass writes the error into it instead.

pub mod ajax;
pub mod instrument;
pub mod load;
pub mod refresh;
pub mod script;
pub mod selection;
pub mod view;

pub use ajax::{AjaxMarker, AjaxSettings};
pub use selection::Suppress;

use crate::{BindError, Runtime};
use brisk_config::{FuncRef, Options, Value};
use brisk_dom::{Document, NodeId};
use brisk_net::{Method, NetError, Response, ReturnFormat};

/// Register the built-in markers in processing order
pub(crate) fn install(rt: &mut Runtime) -> Result<(), BindError> {
    let names = rt.markers().clone();

    rt.register_marker_fn(&names.view, view::bind)?;
    rt.register_marker_fn(&names.refresh, refresh::bind)?;
    rt.register_marker(&names.ajax, AjaxMarker::new())?;
    rt.register_marker(&names.rest_get, AjaxMarker::with_verb(Method::Get))?;
    rt.register_marker(&names.rest_put, AjaxMarker::with_verb(Method::Put))?;
    rt.register_marker(&names.rest_post, AjaxMarker::with_verb(Method::Post))?;
    rt.register_marker(&names.rest_patch, AjaxMarker::with_verb(Method::Patch))?;
    rt.register_marker(&names.rest_delete, AjaxMarker::with_verb(Method::Delete))?;
    rt.register_marker(&names.no_select, Suppress::Select)?;
    rt.register_marker(&names.no_drag, Suppress::Drag)?;
    rt.register_marker_fn(&names.load, load::bind)?;
    rt.register_marker_fn(&names.click, script::bind_click)?;
    Ok(())
}

/// One-time setup of an options-style marker.
///
/// Does nothing when `element` was already processed for `marker`.
/// Otherwise parses the attribute, hands the options to `setup` and clears
/// the attribute once setup succeeded.
pub(crate) fn configure<F>(rt: &mut Runtime, element: NodeId, marker: &str, setup: F) -> Result<(), BindError>
where
    F: FnOnce(&mut Runtime, Options) -> Result<(), BindError>,
{
    if !rt.first_time(element, marker) {
        return Ok(());
    }
    let options = rt.parse_options(element, marker)?;
    setup(rt, options)?;
    rt.document_mut().set_attribute(element, marker, "")?;
    Ok(())
}

/// Tell a start/stop callback that a request began or ended
pub(crate) fn start_stop(rt: &mut Runtime, element: NodeId, callback: Option<&FuncRef>, started: bool) {
    let Some(callback) = callback else {
        return;
    };
    if let Err(err) = rt.call_func(callback, &[Value::Element(element), Value::Bool(started)]) {
        tracing::warn!("start/stop callback on {} failed: {}", element, err);
        rt.report(err.to_string());
    }
}

/// Response as handed to callbacks: `{status, data, text}`.
///
/// `data` is the decoded body when JSON was asked for and the body parses,
/// the raw text otherwise.
pub(crate) fn response_value(response: &Response, format: ReturnFormat) -> Value {
    let text = response.text();
    let data = match format {
        ReturnFormat::Json => serde_json::from_str::<serde_json::Value>(&text)
            .map(Value::from)
            .unwrap_or_else(|_| Value::Str(text.clone())),
        _ => Value::Str(text.clone()),
    };
    Value::Options(
        Options::new()
            .with("status", f64::from(response.status))
            .with("data", data)
            .with("text", text),
    )
}

/// Failure as handed to error callbacks: `{status, data, text, error}`
pub(crate) fn error_value(err: &NetError) -> Value {
    let status = err.status().map_or(Value::Null, |s| Value::Number(f64::from(s)));
    let body = err.body().unwrap_or_default().to_string();
    Value::Options(
        Options::new()
            .with("status", status)
            .with("data", body.clone())
            .with("text", body)
            .with("error", err.to_string()),
    )
}

/// Action of the closest enclosing form, else `.`
pub(crate) fn form_action(document: &Document, element: NodeId) -> String {
    document
        .closest(element, "form")
        .and_then(|form| document.get_attribute(form, "action"))
        .filter(|action| !action.is_empty())
        .unwrap_or(".")
        .to_string()
}

/// JSON form of a configuration value; elements become their current
/// value (form controls) or text
pub(crate) fn to_json(document: &Document, value: &Value) -> serde_json::Value {
    value.to_json(&|id| element_json(document, id))
}

fn element_json(document: &Document, id: NodeId) -> serde_json::Value {
    match document.element(id) {
        Some(data) if data.is_form_input() => serde_json::Value::String(document.value(id)),
        Some(_) => serde_json::Value::String(document.text_content(id)),
        None => serde_json::Value::Null,
    }
}

/// Values of every input, textarea and select in the form enclosing
/// `element`, keyed by name, then id, then `{type}_{index}`.
///
/// Checkboxes report their checkedness and unchecked radios are skipped.
pub(crate) fn gather_inputs(document: &Document, element: NodeId) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    let Some(form) = document.closest(element, "form") else {
        return serde_json::Value::Object(fields);
    };

    let mut index = 0;
    for input in document.elements_by_tag(form, &["input", "textarea", "select"]) {
        let Some(data) = document.element(input) else {
            continue;
        };
        let kind = if data.is("input") {
            data.attrs
                .get_attribute("type")
                .filter(|t| !t.is_empty())
                .unwrap_or("text")
                .to_ascii_lowercase()
        } else {
            data.tag.clone()
        };
        // Only what a user could see and fill in
        if kind == "hidden" || data.attrs.has_attribute("hidden") {
            continue;
        }
        let checked = document.is_checked(input);
        if kind == "radio" && !checked {
            continue;
        }

        let name = [data.attrs.get_attribute("name"), data.attrs.get_attribute("id")]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{kind}_{index}"));
        let value = if kind == "checkbox" {
            serde_json::Value::Bool(checked)
        } else {
            serde_json::Value::String(document.value(input))
        };
        fields.insert(name, value);
        index += 1;
    }
    serde_json::Value::Object(fields)
}
