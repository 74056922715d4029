//! Scan/bind ordering, idempotence, registry rules and mutation re-scans

mod common;

use brisk_runtime::config_lang::Value;
use brisk_runtime::dom::NodeId;
use brisk_runtime::net::MockTransport;
use brisk_runtime::{BindError, Runtime};
use common::{first, runtime, started, Spy};

// ============================================================================
// IDEMPOTENCE
// ============================================================================

#[test]
fn test_rebind_is_idempotent() {
    let mock = MockTransport::new();
    let mut rt = runtime(r#"<body><div x-spy></div><div x-spy></div></body>"#, &mock);
    let spy = Spy::default();
    rt.register_marker("x-spy", spy.clone()).unwrap();
    rt.start();
    rt.bind(NodeId::ROOT, false);
    rt.bind(NodeId::ROOT, false);
    assert_eq!(spy.entries().len(), 2);
}

#[test]
fn test_listeners_installed_once() {
    let mock = MockTransport::new();
    let mut rt = started(r#"<body><a href="/x">x</a></body>"#, &mock);
    let a = first(&rt, "a");
    rt.bind(NodeId::ROOT, false);
    rt.bind(NodeId::ROOT, true);
    rt.click(a);
    assert_eq!(rt.take_notices().len(), 1);
}

// ============================================================================
// ORDER
// ============================================================================

#[test]
fn test_pass_order() {
    let mock = MockTransport::new();
    let mut rt = Runtime::builder()
        .cogs(false)
        .with_transport(mock.clone())
        .build(brisk_runtime::html::parse(concat!(
            r#"<body><div x-b></div>"#,
            r#"<div x-a br-call="trace()"></div>"#,
            r#"<div br-debug></div>"#,
            r#"<span br-id="late"></span></body>"#,
        )))
        .unwrap();

    let spy = Spy::default();
    let log = spy.log.clone();
    rt.register_marker("br-debug", spy.clone()).unwrap();
    rt.register_marker("x-a", spy.clone()).unwrap();
    rt.register_marker("x-b", spy.clone()).unwrap();
    let seen = log.clone();
    rt.register_delegate("trace", move |rt: &mut Runtime, _args: &[Value]| {
        let late = rt.element_by_id("late").is_some();
        seen.borrow_mut().push(format!("call sees late: {late}"));
        Ok(Value::Null)
    });
    rt.start();

    let markers: Vec<String> = log
        .borrow()
        .iter()
        .map(|entry| entry.split('@').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(markers, ["br-debug", "x-a", "x-b", "call sees late: true"]);
}

#[test]
fn test_identifiers_before_handlers() {
    let mock = MockTransport::new();
    let mut rt = runtime(r#"<body><div x-peek></div><p br-id=" target "></p></body>"#, &mock);
    let found = std::rc::Rc::new(std::cell::Cell::new(false));
    let flag = found.clone();
    rt.register_marker_fn("x-peek", move |rt: &mut Runtime, _element: NodeId| {
        flag.set(rt.element_by_id("target").is_some());
        Ok(())
    })
    .unwrap();
    rt.start();
    assert!(found.get());
    let p = first(&rt, "p");
    assert_eq!(rt.state(p).and_then(|s| s.br_id.as_deref()), Some("target"));
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn test_registry_rules() {
    let mock = MockTransport::new();
    let mut rt = runtime("<body></body>", &mock);

    assert!(matches!(rt.register_marker("br-id", Spy::default()), Err(BindError::Reserved(_))));
    assert!(matches!(rt.register_marker("BR-CALL", Spy::default()), Err(BindError::Reserved(_))));
    assert!(matches!(rt.register_marker("br-view", Spy::default()), Err(BindError::Duplicate(_))));
    assert!(matches!(rt.unregister_marker("br-id"), Err(BindError::Pinned(_))));
    assert!(matches!(rt.unregister_marker("br-debug"), Err(BindError::Pinned(_))));
    assert!(matches!(rt.unregister_marker("x-none"), Err(BindError::UnknownMarker(_))));
}

#[test]
fn test_unregistered_marker_ignored() {
    let mock = MockTransport::new().with_body("/part", "<i>part</i>");
    let mut rt = runtime(r#"<body><div br-load="/part">old</div></body>"#, &mock);
    rt.unregister_marker("br-load").unwrap();
    rt.start();
    smol::block_on(rt.settle());
    assert!(mock.requests().is_empty());
    let div = first(&rt, "div");
    assert_eq!(rt.document().get_attribute(div, "br-load"), Some("/part"));
}

#[test]
fn test_handler_error_written_to_attribute() {
    let mock = MockTransport::new();
    let mut rt = runtime(r#"<body><div x-bad="{a: 'open"></div><div x-spy></div></body>"#, &mock);
    rt.register_marker_fn("x-bad", |rt: &mut Runtime, element: NodeId| {
        rt.parse_options(element, "x-bad").map(drop)
    })
    .unwrap();
    let spy = Spy::default();
    rt.register_marker("x-spy", spy.clone()).unwrap();
    rt.start();

    let bad = first(&rt, "div");
    let value = rt.document().get_attribute(bad, "x-bad").unwrap_or_default();
    assert!(value.starts_with("ERROR: "), "{value}");
    assert_eq!(spy.entries().len(), 1);
    assert_eq!(rt.diagnostics().len(), 1);
}

// ============================================================================
// MUTATIONS
// ============================================================================

fn spied(html: &str) -> (Runtime, Spy) {
    let mock = MockTransport::new();
    let mut rt = runtime(html, &mock);
    let spy = Spy::default();
    rt.register_marker("x-spy", spy.clone()).unwrap();
    rt.start();
    (rt, spy)
}

fn append_spied(rt: &mut Runtime) -> NodeId {
    let body = rt.document().body();
    let div = rt.document_mut().create_element("div");
    rt.document_mut().set_attribute(div, "x-spy", "").unwrap();
    rt.document_mut().append_child(body, div).unwrap();
    div
}

#[test]
fn test_insertions_debounced() {
    let (mut rt, spy) = spied("<body></body>");

    append_spied(&mut rt);
    rt.advance(50);
    append_spied(&mut rt);
    rt.advance(60);
    assert!(spy.entries().is_empty());

    rt.advance(40);
    assert_eq!(spy.entries().len(), 2);
}

#[test]
fn test_insertions_under_two_parents() {
    let (mut rt, spy) = spied("<body><section></section><section></section></body>");
    let sections = rt.document().elements_by_tag(NodeId::ROOT, &["section"]);
    assert_eq!(sections.len(), 2);

    for &section in &sections {
        let div = rt.document_mut().create_element("div");
        rt.document_mut().set_attribute(div, "x-spy", "").unwrap();
        rt.document_mut().append_child(section, div).unwrap();
    }
    rt.advance(1_000);
    assert_eq!(spy.entries().len(), 2);
}

#[test]
fn test_removal_tears_down_view() {
    let mock = MockTransport::new().with_body("/tick", "<span br-id=\"inner\">t</span>");
    let mut rt = started(
        r#"<body><section><div br-view="{url: '/tick', refreshInterval: 1}"></div></section></body>"#,
        &mock,
    );
    rt.advance(5);
    assert_eq!(mock.take_requests().len(), 1);
    assert!(rt.element_by_id("inner").is_some());

    let div = first(&rt, "div");
    rt.document_mut().remove(div).unwrap();
    rt.advance(100);
    assert!(rt.state(div).is_none());
    assert!(rt.element_by_id("inner").is_none());

    rt.advance(3_000);
    smol::block_on(rt.settle());
    assert!(mock.requests().is_empty());
}

#[test]
fn test_mutations_ignored_before_start() {
    let mock = MockTransport::new();
    let mut rt = runtime("<body></body>", &mock);
    let spy = Spy::default();
    rt.register_marker("x-spy", spy.clone()).unwrap();
    append_spied(&mut rt);
    rt.advance(500);
    assert!(spy.entries().is_empty());
}
