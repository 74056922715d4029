//! Ajax marker
//!
//! Binds one or more events on the element to a network request. The REST
//! aliases (`br-restget`, `br-restpost`, ...) are the same marker with the
//! verb forced. `crossDomain` is accepted and ignored: cross-origin rules
//! belong to the transport.

use super::{configure, error_value, form_action, gather_inputs, response_value, start_stop, to_json};
use crate::registry::Handler;
use crate::{BindError, Notice, Runtime};
use brisk_config::coerce::format_number;
use brisk_config::{FuncRef, Options, Value};
use brisk_dom::{Event, EventType, NodeId};
use brisk_net::{Method, Negotiation, NetError, Request, Response, ReturnFormat, SendFormat};
use std::rc::Rc;

/// Handler for the ajax marker and its verb aliases
#[derive(Debug, Clone, Copy, Default)]
pub struct AjaxMarker {
    verb: Option<Method>,
}

impl AjaxMarker {
    pub fn new() -> Self {
        Self { verb: None }
    }

    /// Alias that always sends `verb`; the `method` option is ignored
    pub fn with_verb(verb: Method) -> Self {
        Self { verb: Some(verb) }
    }
}

impl Handler for AjaxMarker {
    fn bind(&self, rt: &mut Runtime, element: NodeId, marker: &str) -> Result<(), BindError> {
        let verb = self.verb;
        configure(rt, element, marker, |rt, options| {
            let settings = Rc::new(AjaxSettings::parse(rt, element, marker, verb, options)?);
            tracing::debug!(
                "[{}] on {}: {} {} on {:?}",
                marker,
                element,
                settings.method,
                settings.url,
                settings.bind_events
            );
            for event_type in settings.bind_events.clone() {
                let settings = Rc::clone(&settings);
                rt.listen(element, event_type, move |rt, event| trigger(rt, event, &settings));
            }
            Ok(())
        })
    }
}

/// Validated ajax marker options
#[derive(Debug, Clone)]
pub struct AjaxSettings {
    pub method: Method,
    pub url: String,
    pub negotiation: Negotiation,
    /// Payload value; a function reference is called with the element and
    /// the options each time the request fires
    pub data: Option<Value>,
    pub bind_events: Vec<EventType>,
    /// Ignore triggers while a request from this element is outstanding
    pub blocking: bool,
    pub callback: Option<FuncRef>,
    pub error_callback: Option<FuncRef>,
    pub start_stop: Option<FuncRef>,
    /// Explicit headers replace the negotiated ones
    pub headers: Option<Vec<(String, String)>>,
    pub gather_inputs: bool,
    /// Options as parsed, handed back to callbacks
    pub options: Options,
}

impl AjaxSettings {
    pub fn parse(
        rt: &mut Runtime,
        element: NodeId,
        marker: &str,
        verb: Option<Method>,
        options: Options,
    ) -> Result<Self, BindError> {
        let mut scope = rt.scope(element, marker);

        let blocking = options.expect_bool("blocking", &mut scope)?.unwrap_or(true);
        let mut bind_events: Vec<EventType> = options
            .expect_str("bindEvent", &mut scope)?
            .map(|names| names.split_whitespace().map(EventType::from_name).collect())
            .unwrap_or_default();
        if bind_events.is_empty() {
            bind_events.push(EventType::Click);
        }

        let return_format = match options.expect_str("returnFormat", &mut scope)? {
            Some(name) => ReturnFormat::from_name(&name)
                .map_err(|_| BindError::invalid("returnFormat", "must be one of `html`, `xml`, `json` or `text`"))?,
            None => ReturnFormat::Json,
        };
        let send_format = match options.expect_str("sendFormat", &mut scope)? {
            Some(name) => SendFormat::from_name(&name).map_err(|_| {
                BindError::invalid("sendFormat", "must be one of `html`, `form`, `xml`, `json` or `text`")
            })?,
            None => SendFormat::Json,
        };
        let encoding = options
            .expect_str("encoding", &mut scope)?
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "utf-8".to_string());

        let method = match (verb, options.expect_str("method", &mut scope)?) {
            (Some(verb), _) => verb,
            (None, Some(name)) => Method::from_name(&name)?,
            (None, None) => Method::Get,
        };

        let callback = match options.get("callback") {
            Some(Value::Func(func)) => Some(func.clone()),
            None | Some(Value::Null) if verb.is_some() => None,
            _ if verb.is_some() => {
                return Err(BindError::invalid("callback", "must be a function reference"));
            }
            _ => return Err(BindError::MissingOption("callback")),
        };
        let error_callback = options.expect_func("errorCallback")?;
        let start_stop = options.get("startStopCallback").and_then(Value::as_func).cloned();

        let url = options
            .expect_str("url", &mut scope)?
            .filter(|u| !u.trim().is_empty());
        let gather = options.expect_bool("gatherInputs", &mut scope)?.unwrap_or(false);

        let headers = match options.get("headers") {
            None | Some(Value::Null) => None,
            Some(Value::Options(headers)) => Some(header_pairs(headers)?),
            Some(_) => {
                return Err(BindError::invalid("headers", "must be an object of header names and values"));
            }
        };

        let data = match options.get("data") {
            None | Some(Value::Null) => None,
            Some(Value::Str(s)) if s.is_empty() => None,
            Some(value) => Some(value.clone()),
        };

        let url = url.unwrap_or_else(|| form_action(rt.document(), element));

        Ok(Self {
            method,
            url,
            negotiation: Negotiation {
                send_format,
                return_format,
                encoding,
            },
            data,
            bind_events,
            blocking,
            callback,
            error_callback,
            start_stop,
            headers,
            gather_inputs: gather,
            options,
        })
    }
}

fn header_pairs(headers: &Options) -> Result<Vec<(String, String)>, BindError> {
    headers
        .iter()
        .map(|(name, value)| {
            let text = match value {
                Value::Str(s) => s.clone(),
                Value::Number(n) => format_number(*n),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(BindError::invalid(
                        "headers",
                        format!("value of '{name}' must be text, found {}", other.kind()),
                    ));
                }
            };
            Ok((name.to_string(), text))
        })
        .collect()
}

fn trigger(rt: &mut Runtime, event: &mut Event, settings: &Rc<AjaxSettings>) -> Result<(), BindError> {
    let element = event.current_target;
    let busy = rt.state(element).is_some_and(|s| s.ajax_busy);
    if settings.blocking && busy {
        tracing::debug!("request from {} still outstanding", element);
        event.prevent_default();
        event.stop_propagation();
        return Ok(());
    }

    let payload = payload(rt, element, settings)?;
    let request = Request::new(settings.method, &settings.url).with_payload(
        &payload,
        &settings.negotiation,
        settings.headers.clone(),
    )?;

    start_stop(rt, element, settings.start_stop.as_ref(), true);
    rt.state_mut(element).ajax_busy = true;
    let settings = Rc::clone(settings);
    rt.submit(request, move |rt, result| finish(rt, element, &settings, result));
    Ok(())
}

/// Request body: the result of a data function as is, otherwise an
/// envelope describing the sender
fn payload(rt: &mut Runtime, element: NodeId, settings: &AjaxSettings) -> Result<serde_json::Value, BindError> {
    if let Some(Value::Func(func)) = &settings.data {
        let args = [Value::Element(element), Value::Options(settings.options.clone())];
        let data = rt.call_func(func, &args)?;
        return Ok(to_json(rt.document(), &data));
    }

    let document = rt.document();
    let mut envelope = serde_json::Map::new();
    envelope.insert("origin".into(), document.url().into());
    for (key, attribute) in [("id", "id"), ("name", "name")] {
        if let Some(value) = document.get_attribute(element, attribute).filter(|v| !v.is_empty()) {
            envelope.insert(key.into(), value.into());
        }
    }
    if let Some(br_id) = rt.state(element).and_then(|s| s.br_id.as_deref()) {
        envelope.insert("brId".into(), br_id.into());
    }
    if let Some(data) = &settings.data {
        envelope.insert("data".into(), to_json(document, data));
    }
    if settings.gather_inputs {
        envelope.insert("fields".into(), gather_inputs(document, element));
    }
    Ok(serde_json::Value::Object(envelope))
}

fn finish(rt: &mut Runtime, element: NodeId, settings: &AjaxSettings, result: Result<Response, NetError>) {
    if let Some(state) = rt.states.get_mut(element) {
        state.ajax_busy = false;
    }

    let options = Value::Options(settings.options.clone());
    let outcome = match result {
        Ok(response) => match &settings.callback {
            Some(callback) => {
                let value = response_value(&response, settings.negotiation.return_format);
                rt.call_func(callback, &[Value::Element(element), value, options]).map(drop)
            }
            None => Ok(()),
        },
        Err(err) => match &settings.error_callback {
            Some(callback) => rt
                .call_func(callback, &[Value::Element(element), error_value(&err), options])
                .map(drop),
            None => {
                tracing::warn!("{} {} from {} failed: {}", settings.method, settings.url, element, err);
                Ok(())
            }
        },
    };
    if let Err(err) = outcome {
        tracing::warn!("ajax callback on {} failed: {}", element, err);
        rt.report(err.to_string());
    }

    start_stop(rt, element, settings.start_stop.as_ref(), false);
    rt.notify(Notice::AjaxEnd {
        element,
        url: settings.url.clone(),
    });
}
