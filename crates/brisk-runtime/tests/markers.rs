//! Built-in markers driven end to end through a mock transport

mod common;

use brisk_runtime::config_lang::{Options, Value};
use brisk_runtime::net::{Method, MockTransport};
use brisk_runtime::{Notice, Runtime};
use common::{first, started};
use std::cell::RefCell;
use std::rc::Rc;

/// Register a delegate that records its arguments and returns `answer`
fn recorder(rt: &mut Runtime, name: &str, answer: Value) -> Rc<RefCell<Vec<Vec<Value>>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = calls.clone();
    rt.register_delegate(name, move |_rt: &mut Runtime, args: &[Value]| {
        log.borrow_mut().push(args.to_vec());
        Ok(answer.clone())
    });
    calls
}

fn body_json(mock: &MockTransport) -> serde_json::Value {
    let requests = mock.requests();
    let body = requests[0].body.clone().unwrap_or_default();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// ERROR ISOLATION
// ============================================================================

#[test]
fn test_bad_marker_does_not_block_others() {
    let mock = MockTransport::new().with_body("/v", "view body");
    let mut rt = started(
        r#"<body><button br-ajax="{url: '/x'}">b</button><div br-view="{url: '/v'}"></div></body>"#,
        &mock,
    );
    rt.advance(5);

    let button = first(&rt, "button");
    let div = first(&rt, "div");
    assert_eq!(
        rt.document().get_attribute(button, "br-ajax"),
        Some("ERROR: [callback] option is required")
    );
    assert_eq!(rt.document().text_content(div), "view body");
    assert!(rt
        .notices()
        .iter()
        .any(|n| matches!(n, Notice::HandlerFailed { marker, .. } if marker == "br-ajax")));
}

// ============================================================================
// AJAX
// ============================================================================

#[test]
fn test_ajax_envelope_and_callback() {
    let mock = MockTransport::new().with_body("/save", r#"{"ok": true}"#);
    let html = concat!(
        r#"<body><form action="/save"><input name="q" value="hello">"#,
        r#"<button br-id="saver" br-restpost="{data: {n: 1}, gatherInputs: true, callback: saved}">go</button>"#,
        "</form></body>",
    );
    let mut rt = common::runtime(html, &mock);
    let calls = recorder(&mut rt, "saved", Value::Null);
    rt.start();

    let button = first(&rt, "button");
    rt.click(button);
    // Blocking: the second click is swallowed while the first is out
    rt.click(button);
    smol::block_on(rt.settle());

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    let body = body_json(&mock);
    assert_eq!(body["brId"], "saver");
    assert_eq!(body["data"]["n"], 1);
    assert_eq!(body["fields"]["q"], "hello");

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0], Value::Element(button));
    let response = calls[0][1].as_options().unwrap();
    assert_eq!(response.get("status"), Some(&Value::Number(200.0)));
    let data = response.get("data").and_then(Value::as_options).unwrap();
    assert_eq!(data.get("ok"), Some(&Value::Bool(true)));
    assert!(rt.notices().iter().any(|n| matches!(n, Notice::AjaxEnd { url, .. } if url == "/save")));
}

#[test]
fn test_ajax_data_function_sent_as_is() {
    let mock = MockTransport::new().with_body("/put", "{}");
    let mut rt = common::runtime(r#"<body><button br-restput="{url: '/put', data: build}">go</button></body>"#, &mock);
    let calls = recorder(&mut rt, "build", Value::Options(Options::new().with("k", "v")));
    rt.start();
    rt.click(first(&rt, "button"));
    smol::block_on(rt.settle());

    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(body_json(&mock), serde_json::json!({"k": "v"}));
}

#[test]
fn test_ajax_error_callback() {
    let mock = MockTransport::new();
    let mut rt = common::runtime(
        r#"<body><button br-restget="{url: '/missing', errorCallback: failed}">go</button></body>"#,
        &mock,
    );
    let calls = recorder(&mut rt, "failed", Value::Null);
    rt.start();
    let button = first(&rt, "button");
    rt.click(button);
    smol::block_on(rt.settle());

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    let error = calls[0][1].as_options().unwrap();
    assert_eq!(error.get("status"), Some(&Value::Number(404.0)));

    // Not busy any more
    drop(calls);
    rt.click(button);
    smol::block_on(rt.settle());
    assert_eq!(mock.requests().len(), 2);
}

// ============================================================================
// VIEWS
// ============================================================================

#[test]
fn test_view_start_stop_and_rebind() {
    let mock = MockTransport::new()
        .with_body("/outer", r#"<p br-view="{url: '/inner'}"></p>"#)
        .with_body("/inner", "inner");
    let mut rt = common::runtime(r#"<body><div br-view="{url: '/outer', startStopCallback: busy}"></div></body>"#, &mock);
    let calls = recorder(&mut rt, "busy", Value::Null);
    rt.start();
    smol::block_on(rt.settle());
    rt.advance(5);
    smol::block_on(rt.settle());

    let flags: Vec<Value> = calls.borrow().iter().map(|args| args[1].clone()).collect();
    assert_eq!(flags, [Value::Bool(true), Value::Bool(false)]);
    let p = first(&rt, "p");
    assert_eq!(rt.document().text_content(p), "inner");
}

#[test]
fn test_refresh_marker_by_name() {
    let mock = MockTransport::new().with_body("/a", "a").with_body("/b", "b");
    let mut rt = started(
        concat!(
            r#"<body><div br-id="panel" br-view="{url: '/a'}"></div>"#,
            r#"<button br-refresh="{id: 'panel', url: '/b'}">r</button></body>"#,
        ),
        &mock,
    );
    let div = first(&rt, "div");
    assert_eq!(rt.document().text_content(div), "a");

    rt.click(first(&rt, "button"));
    smol::block_on(rt.settle());
    assert_eq!(rt.document().text_content(div), "b");
}
