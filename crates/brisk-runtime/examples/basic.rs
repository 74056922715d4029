//! Bind a small page against canned responses and print what happened.
//!
//! Run with `RUST_LOG=brisk_runtime=debug` for the bind trace.

use brisk_runtime::config_lang::Value;
use brisk_runtime::net::MockTransport;
use brisk_runtime::{Notice, Runtime};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <div br-id="clock" br-view="{url: '/clock', refreshInterval: 1}"></div>
  <form action="/subscribe">
    <input name="email" value="ann@example.com">
    <input type="tel" br-phonemask>
    <button br-restpost="{gatherInputs: true, callback: subscribed}">Subscribe</button>
  </form>
  <a href="https://example.com/docs">docs</a>
</body></html>"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let transport = MockTransport::new()
        .with_body("/clock", "<b>12:00</b>")
        .with_body("/subscribe", r#"{"subscribed": true}"#);
    let mut rt = Runtime::builder()
        .with_transport(transport.clone())
        .build(brisk_runtime::html::parse(PAGE))?;

    rt.register_delegate("subscribed", |_rt: &mut Runtime, args: &[Value]| {
        tracing::info!("subscribe answered: {:?}", args.get(1));
        Ok(Value::Null)
    });
    rt.start();
    smol::block_on(rt.settle());

    let body = rt.document().body();
    let phone = rt.document().elements_by_tag(body, &["input"])[1];
    rt.focus(phone);
    rt.type_text(phone, "5551234567")?;
    println!("phone: {}", rt.document().value(phone));

    let button = rt.document().elements_by_tag(body, &["button"])[0];
    rt.click(button);
    smol::block_on(rt.settle());

    // Two refreshes of the clock view
    transport.route("/clock", Ok(brisk_runtime::net::Response::ok("<b>12:01</b>")));
    rt.advance(2_000);
    smol::block_on(rt.settle());
    if let Some(clock) = rt.element_by_id("clock") {
        println!("clock: {}", rt.document().inner_html(clock));
    }

    let anchor = rt.document().elements_by_tag(body, &["a"])[0];
    rt.click(anchor);
    for notice in rt.take_notices() {
        match notice {
            Notice::AnchorClick { href, .. } => println!("anchor: {href}"),
            Notice::AjaxEnd { url, .. } => println!("ajax done: {url}"),
            Notice::HandlerFailed { marker, message, .. } => println!("{marker}: {message}"),
        }
    }
    println!("requests sent: {}", transport.requests().len());
    Ok(())
}
