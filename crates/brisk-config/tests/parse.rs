//! Integration tests for the configuration parser
//!
//! Covers the full pipeline: literal parsing, computed configuration,
//! nested literal strings and identifier resolution.

use brisk_config::*;
use brisk_dom::Document;

// ============================================================================
// IDENTIFIER RESOLUTION
// ============================================================================

#[test]
fn test_token_resolves_to_element() {
    let mut doc = Document::default();
    let x = doc.create_element("button");
    let mut scope = MapScope::new().with_id("btn1", x);

    let parsed = parse(r#"{data: "{{btn1}}"}"#, &mut scope).unwrap();
    let opts = parsed.as_options().unwrap();
    assert_eq!(opts.get("data"), Some(&Value::Element(x)));
    assert!(scope.diagnostics().is_empty());
}

#[test]
fn test_unresolved_token_left_as_text_with_one_diagnostic() {
    let mut scope = MapScope::new();

    let parsed = parse(r#"{data: "{{missing}}"}"#, &mut scope).unwrap();
    let opts = parsed.as_options().unwrap();
    assert_eq!(opts.get("data"), Some(&Value::from("{{missing}}")));
    assert_eq!(scope.diagnostics().len(), 1);
    assert!(scope.diagnostics()[0].contains("{{missing}}"));
}

#[test]
fn test_unquoted_token_in_object() {
    let mut doc = Document::default();
    let x = doc.create_element("div");
    let mut scope = MapScope::new().with_id("list", x);

    let parsed = parse("{target: {{list}}, url: '/x'}", &mut scope).unwrap();
    assert_eq!(parsed.as_options().unwrap().get("target"), Some(&Value::Element(x)));
}

#[test]
fn test_nested_tokens_resolve() {
    let mut doc = Document::default();
    let x = doc.create_element("div");
    let mut scope = MapScope::new().with_id("a", x);

    let parsed = parse("{data: {inner: '{{a}}', list: ['{{a}}', 1]}}", &mut scope).unwrap();
    let data = parsed.as_options().unwrap().get("data").and_then(Value::as_options).unwrap();
    assert_eq!(data.get("inner"), Some(&Value::Element(x)));
    assert_eq!(
        data.get("list"),
        Some(&Value::List(vec![Value::Element(x), Value::Number(1.0)]))
    );
}

#[test]
fn test_partial_text_token_untouched() {
    let mut scope = MapScope::new();
    let parsed = parse("{label: 'row {{n}} of many'}", &mut scope).unwrap();
    assert_eq!(
        parsed.as_options().unwrap().get("label"),
        Some(&Value::from("row {{n}} of many"))
    );
    assert!(scope.diagnostics().is_empty());
}

#[test]
fn test_scalar_token_at_top_level() {
    let mut doc = Document::default();
    let x = doc.create_element("div");
    let mut scope = MapScope::new().with_id("view1", x);

    let parsed = parse("{{view1}}", &mut scope).unwrap();
    assert_eq!(parsed, Parsed::List(vec![Value::Element(x)]));
}

// ============================================================================
// SHAPES
// ============================================================================

#[test]
fn test_scalar_wrapped_in_list() {
    let mut scope = MapScope::new();
    assert_eq!(parse("12", &mut scope).unwrap(), Parsed::List(vec![Value::Number(12.0)]));
    assert_eq!(parse("'on'", &mut scope).unwrap(), Parsed::List(vec![Value::from("on")]));
}

#[test]
fn test_empty_text_is_empty_list() {
    let mut scope = MapScope::new();
    let parsed = parse("   ", &mut scope).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn test_list_literal_kept_as_list() {
    let mut scope = MapScope::new();
    let parsed = parse("[1, 2]", &mut scope).unwrap();
    assert_eq!(parsed, Parsed::List(vec![Value::Number(1.0), Value::Number(2.0)]));
}

#[test]
fn test_string_literal_reparsed() {
    let mut scope = MapScope::new();
    let parsed = parse(r#""{url: '/nested'}""#, &mut scope).unwrap();
    assert_eq!(
        parsed.as_options().unwrap().get("url"),
        Some(&Value::from("/nested"))
    );
}

// ============================================================================
// COMPUTED CONFIGURATION
// ============================================================================

#[test]
fn test_top_level_function_invoked() {
    let mut scope = MapScope::new().with_function("viewConfig", |_| {
        Value::Options(Options::new().with("url", "/computed").with("refreshInterval", 10.0))
    });

    let parsed = parse("viewConfig", &mut scope).unwrap();
    let opts = parsed.as_options().unwrap();
    assert_eq!(opts.get("url"), Some(&Value::from("/computed")));
}

#[test]
fn test_function_returning_literal_text() {
    let mut scope = MapScope::new().with_function("cfg", |_| Value::from("{method: 'post'}"));
    let parsed = parse("cfg", &mut scope).unwrap();
    assert_eq!(
        parsed.as_options().unwrap().expect_str("method", &mut MapScope::new()),
        Ok(Some("post".into()))
    );
}

#[test]
fn test_unknown_function_is_error() {
    let mut scope = MapScope::new();
    assert_eq!(
        parse("nope", &mut scope),
        Err(ConfigError::UnknownFunction("nope".into()))
    );
}

#[test]
fn test_malformed_text_is_error() {
    let mut scope = MapScope::new();
    assert!(parse("{url: '/x'", &mut scope).is_err());
    assert!(parse("{url: /x}", &mut scope).is_err());
}

#[test]
fn test_deep_nesting_is_error() {
    let mut scope = MapScope::new();
    let text = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
    assert_eq!(parse(&text, &mut scope).unwrap_err(), ConfigError::TooDeep);

    let calls = format!("save({}{})", "{a: [".repeat(50_000), "]}".repeat(50_000));
    assert_eq!(parse_statements(&calls, &mut scope).unwrap_err(), ConfigError::TooDeep);
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[test]
fn test_statement_tokens_resolve_or_null() {
    let mut doc = Document::default();
    let x = doc.create_element("form");
    let mut scope = MapScope::new().with_id("form", x);

    let statements = parse_statements("submit({{form}}, {{gone}}); log('done')", &mut scope).unwrap();
    assert_eq!(statements[0].args, vec![Value::Element(x), Value::Null]);
    assert_eq!(statements[1].func.name(), "log");
}
