//! Refresh marker
//!
//! A click reloads another element's view, optionally pointing it at a new
//! URL first.

use super::configure;
use crate::{BindError, Runtime};
use brisk_config::Value;
use brisk_dom::{EventType, NodeId};
use std::fmt;

/// View to refresh: a resolved element or a name looked up at click time
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Element(NodeId),
    Name(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Element(id) => write!(f, "{id}"),
            Target::Name(name) => write!(f, "'{name}'"),
        }
    }
}

pub(crate) fn bind(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().refresh.clone();
    configure(rt, element, &marker, |rt, options| {
        let target = match options.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::Element(id)) => Some(Target::Element(*id)),
            Some(Value::Str(name)) if !name.trim().is_empty() => Some(Target::Name(name.trim().to_string())),
            Some(other) => {
                return Err(BindError::invalid(
                    "id",
                    format!("expected an element or identifier, found {}", other.kind()),
                ));
            }
        };
        let url = options
            .expect_str("url", &mut rt.scope(element, &marker))?
            .filter(|u| !u.trim().is_empty());

        let Some(target) = target else {
            return Ok(());
        };
        let label = marker.clone();
        rt.listen(element, EventType::Click, move |rt, _event| {
            refresh(rt, &target, url.as_deref(), &label)
        });
        Ok(())
    })
}

fn refresh(rt: &mut Runtime, target: &Target, url: Option<&str>, marker: &str) -> Result<(), BindError> {
    let element = match target {
        Target::Element(id) => Some(*id),
        Target::Name(name) => rt.element_by_id(name),
    };
    let view = element.filter(|&e| rt.state(e).is_some_and(|s| s.view.is_some()));
    let Some(view) = view else {
        tracing::warn!("[{}]: view {} not found", marker, target);
        rt.report(format!("[{marker}] view {target} not found"));
        return Ok(());
    };
    if let Some(url) = url {
        rt.set_view_url(view, url)?;
    }
    rt.refresh_view(view)
}

#[cfg(test)]
mod tests {
    use crate::Runtime;
    use brisk_dom::NodeId;
    use brisk_net::MockTransport;

    #[test]
    fn test_click_refreshes_with_url() {
        let mock = MockTransport::new().with_body("/a", "A").with_body("/b", "B");
        let html = concat!(
            "<body>",
            r#"<div br-id="panel" br-view="{url: '/a'}"></div>"#,
            r#"<button br-refresh="{id: '{{panel}}', url: '/b'}"></button>"#,
            "</body>",
        );
        let mut rt = Runtime::builder()
            .with_transport(mock.clone())
            .build(brisk_html::parse(html))
            .unwrap();
        rt.start();
        smol::block_on(rt.settle());
        let panel = rt.element_by_id("panel").unwrap();
        assert_eq!(rt.document().text_content(panel), "A");

        let button = rt.document().elements_by_tag(NodeId::ROOT, &["button"])[0];
        rt.click(button);
        smol::block_on(rt.settle());
        assert_eq!(rt.document().text_content(panel), "B");
    }

    #[test]
    fn test_missing_target_reported() {
        let mut rt = Runtime::builder()
            .with_transport(MockTransport::new())
            .build(brisk_html::parse(r#"<body><button br-refresh="{id: 'nowhere'}"></button></body>"#))
            .unwrap();
        rt.start();
        let button = rt.document().elements_by_tag(NodeId::ROOT, &["button"])[0];
        rt.click(button);
        assert!(rt.diagnostics().iter().any(|d| d.contains("'nowhere' not found")));
    }
}
