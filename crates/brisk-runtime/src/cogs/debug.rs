//! Debug marker
//!
//! A truthy value turns on verbose failure reporting for the whole runtime.
//! The value is re-read on every scan and the first element that changes
//! the setting rewrites every other debug attribute to match.

use crate::{BindError, Runtime};
use brisk_config::coerce::truthy;
use brisk_dom::NodeId;

pub fn bind(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().debug.clone();
    let enabled = truthy(rt.document().get_attribute(element, &marker).unwrap_or_default());
    if enabled == rt.is_debug() {
        return Ok(());
    }

    rt.set_debug(enabled);
    let value = enabled.to_string();
    for other in rt.document().elements_with_attribute(NodeId::ROOT, &marker) {
        rt.document_mut().set_attribute(other, &marker, &value)?;
    }
    tracing::info!("debug reporting {}", if enabled { "on" } else { "off" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Runtime;
    use brisk_dom::NodeId;
    use brisk_net::MockTransport;

    #[test]
    fn test_debug_toggles_and_syncs() {
        let html = r#"<body><div br-debug="yes"></div><p br-debug="off"></p></body>"#;
        let mut rt = Runtime::builder()
            .with_transport(MockTransport::new())
            .build(brisk_html::parse(html))
            .unwrap();
        assert!(!rt.is_debug());
        rt.start();
        assert!(rt.is_debug());

        let p = rt.document().elements_by_tag(NodeId::ROOT, &["p"])[0];
        assert_eq!(rt.document().get_attribute(p, "br-debug"), Some("true"));

        rt.document_mut().set_attribute(p, "br-debug", "false").unwrap();
        rt.bind(NodeId::ROOT, false);
        assert!(!rt.is_debug());
    }

    #[test]
    fn test_cogs_disabled() {
        let mut rt = Runtime::builder()
            .with_transport(MockTransport::new())
            .cogs(false)
            .build(brisk_html::parse(r#"<body><div br-debug="true"></div></body>"#))
            .unwrap();
        rt.start();
        assert!(!rt.is_debug());
    }
}
