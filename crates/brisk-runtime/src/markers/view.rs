//! View marker
//!
//! Fetches an HTML fragment into the element, once on bind unless delayed
//! and then on a repeating interval if one is configured. Each fragment
//! replaces the element's children and is bound after the render delay.

use super::{configure, error_value, form_action, gather_inputs, start_stop, to_json};
use crate::scheduler::Task;
use crate::state::ViewState;
use crate::{BindError, Runtime};
use brisk_config::coerce::digits;
use brisk_config::{Options, Value};
use brisk_dom::NodeId;
use brisk_net::{Method, Negotiation, NetError, Request, Response, ReturnFormat, SendFormat};

pub(crate) fn bind(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().view.clone();
    configure(rt, element, &marker, |rt, options| {
        let (view, refresh_secs, delayed) = read(rt, element, &marker, options)?;
        tracing::debug!("[{}] on {}: {} every {}s", marker, element, view.url, refresh_secs);
        rt.state_mut(element).view = Some(view);

        if refresh_secs > 0.0 {
            let period = (refresh_secs * 1000.0).round() as u64;
            let timer = rt.schedule_every(Task::LoadView(element), period.max(1));
            if let Some(view) = rt.state_mut(element).view.as_mut() {
                view.interval = Some(timer);
            }
            rt.on_teardown(element, clear_interval);
        }
        if !delayed {
            load(rt, element);
        }
        Ok(())
    })
}

fn read(rt: &mut Runtime, element: NodeId, marker: &str, options: Options) -> Result<(ViewState, f64, bool), BindError> {
    let mut scope = rt.scope(element, marker);

    let error_callback = options.expect_func("errorCallback")?;
    let start_stop = options.get("startStopCallback").and_then(Value::as_func).cloned();
    let url = options
        .expect_str("url", &mut scope)?
        .filter(|u| !u.trim().is_empty());
    let method = match options.expect_str("method", &mut scope)? {
        Some(name) => Method::from_name(&name)?,
        None => Method::Get,
    };
    let refresh_secs = match options.get("refreshInterval") {
        Some(Value::Str(text)) => digits(text).parse::<f64>().unwrap_or(0.0),
        _ => options.expect_num("refreshInterval", &mut scope)?.unwrap_or(0.0),
    };
    let delayed = options.expect_bool("delayed", &mut scope)?.unwrap_or(false);
    let gather = options.expect_bool("gatherInputs", &mut scope)?.unwrap_or(false);
    let data = options.get("data").filter(|d| !d.is_null()).cloned();

    let url = url.unwrap_or_else(|| form_action(rt.document(), element));
    let view = ViewState {
        url,
        method,
        data,
        gather_inputs: gather,
        error_callback,
        start_stop,
        options,
        loading: false,
        loaded: false,
        interval: None,
        refresh_callback: None,
    };
    Ok((view, refresh_secs, delayed))
}

fn clear_interval(rt: &mut Runtime, element: NodeId) {
    let timer = rt
        .states
        .get_mut(element)
        .and_then(|s| s.view.as_mut())
        .and_then(|v| v.interval.take());
    if let Some(timer) = timer {
        rt.clear_timer(timer);
        tracing::debug!("view {} torn down", element);
    }
}

/// Start a load of the view on `element` unless one is already in flight
pub(crate) fn load(rt: &mut Runtime, element: NodeId) {
    let Some(view) = rt.states.get_mut(element).and_then(|s| s.view.as_mut()) else {
        tracing::warn!("no view on {}", element);
        return;
    };
    if view.loading {
        tracing::debug!("view {} already loading", element);
        return;
    }
    view.loading = true;
    view.loaded = false;
    let (method, url, data, gather, start) = (
        view.method,
        view.url.clone(),
        view.data.clone(),
        view.gather_inputs,
        view.start_stop.clone(),
    );

    let document = rt.document();
    let data = data.map(|d| to_json(document, &d));
    let payload = match (data, gather) {
        (data, true) => serde_json::json!({ "data": data, "fields": gather_inputs(document, element) }),
        (Some(data), false) => data,
        (None, false) => serde_json::Value::Null,
    };
    let negotiation = Negotiation {
        send_format: SendFormat::Json,
        return_format: ReturnFormat::Html,
        ..Negotiation::default()
    };
    let request = match Request::new(method, &url).with_payload(&payload, &negotiation, None) {
        Ok(request) => request,
        Err(err) => {
            finish(rt, element, Err(err));
            return;
        }
    };

    start_stop(rt, element, start.as_ref(), true);
    rt.submit(request, move |rt, result| finish(rt, element, result));
}

fn finish(rt: &mut Runtime, element: NodeId, result: Result<Response, NetError>) {
    let Some(view) = rt.states.get_mut(element).and_then(|s| s.view.as_mut()) else {
        // Torn down while the request was out
        return;
    };
    view.loading = false;
    let error_callback = view.error_callback.clone();
    let start = view.start_stop.clone();
    let options = view.options.clone();

    match result {
        Ok(response) => {
            if let Err(err) = brisk_html::set_inner_html(rt.document_mut(), element, &response.text()) {
                tracing::warn!("cannot render view {}: {}", element, err);
            }
            if let Some(view) = rt.states.get_mut(element).and_then(|s| s.view.as_mut()) {
                view.loaded = true;
            }
            let delay = rt.config().render_delay_ms;
            rt.set_timeout(delay, move |rt| rendered(rt, element));
        }
        Err(err) => {
            tracing::debug!("view {} failed: {}", element, err);
            match error_callback {
                Some(callback) => {
                    let args = [Value::Element(element), error_value(&err), Value::Options(options)];
                    if let Err(err) = rt.call_func(&callback, &args) {
                        tracing::warn!("view error callback on {} failed: {}", element, err);
                        rt.report(err.to_string());
                    }
                }
                None => {
                    let body = err.body().map_or_else(|| err.to_string(), str::to_string);
                    if let Err(err) = brisk_html::set_inner_html(rt.document_mut(), element, &body) {
                        tracing::warn!("cannot render view {}: {}", element, err);
                    }
                }
            }
        }
    }
    start_stop(rt, element, start.as_ref(), false);
}

/// Bind freshly rendered content, then run a pending refresh callback
fn rendered(rt: &mut Runtime, element: NodeId) {
    if !rt.document().is_connected(element) {
        return;
    }
    rt.bind(element, false);
    let callback = rt
        .states
        .get_mut(element)
        .and_then(|s| s.view.as_mut())
        .and_then(|v| v.refresh_callback.take());
    if let Some(callback) = callback {
        callback(rt, element);
    }
}

impl Runtime {
    /// Reload the view on `element`
    pub fn refresh_view(&mut self, element: NodeId) -> Result<(), BindError> {
        if self.state(element).and_then(|s| s.view.as_ref()).is_none() {
            return Err(BindError::NoView(element));
        }
        load(self, element);
        Ok(())
    }

    /// Reload the view on `element` and run `then` once the new content is
    /// rendered and bound
    pub fn refresh_view_then<F>(&mut self, element: NodeId, then: F) -> Result<(), BindError>
    where
        F: FnOnce(&mut Runtime, NodeId) + 'static,
    {
        let view = self
            .states
            .get_mut(element)
            .and_then(|s| s.view.as_mut())
            .ok_or(BindError::NoView(element))?;
        view.refresh_callback = Some(Box::new(then));
        load(self, element);
        Ok(())
    }

    /// Point the view on `element` at `url` and reload it.
    ///
    /// An element without a view gets a view marker written and bound.
    pub fn set_view(
        &mut self,
        element: NodeId,
        url: &str,
        delayed: bool,
        refresh_secs: Option<u32>,
    ) -> Result<(), BindError> {
        if let Some(view) = self.states.get_mut(element).and_then(|s| s.view.as_mut()) {
            view.url = url.to_string();
            load(self, element);
            return Ok(());
        }

        let mut text = format!("{{url: {}", serde_json::Value::from(url));
        if delayed {
            text.push_str(", delayed: true");
        }
        if let Some(secs) = refresh_secs.filter(|&s| s > 0) {
            text.push_str(&format!(", refreshInterval: {secs}"));
        }
        text.push('}');

        let marker = self.markers().view.clone();
        self.document.set_attribute(element, &marker, &text)?;
        self.bind(element, false);
        Ok(())
    }

    /// Change the URL the view on `element` loads from, without loading
    pub fn set_view_url(&mut self, element: NodeId, url: &str) -> Result<(), BindError> {
        let view = self
            .states
            .get_mut(element)
            .and_then(|s| s.view.as_mut())
            .ok_or(BindError::NoView(element))?;
        view.url = url.to_string();
        Ok(())
    }
}
