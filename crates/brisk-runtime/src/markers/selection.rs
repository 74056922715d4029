//! No-select and no-drag markers
//!
//! The boolean value applies to the element and everything under it. Text
//! fields start out exempt. The value is re-read on every scan, so changing
//! the attribute toggles the behavior without installing listeners twice.

use crate::registry::Handler;
use crate::state::ElementState;
use crate::{BindError, Runtime};
use brisk_config::coerce::truthy;
use brisk_dom::{Event, EventType, NodeId};

/// Which default action a suppress marker cancels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppress {
    /// `selectstart`
    Select,
    /// `dragstart`; the target is clicked instead
    Drag,
}

impl Suppress {
    pub fn event_type(self) -> EventType {
        match self {
            Suppress::Select => EventType::SelectStart,
            Suppress::Drag => EventType::DragStart,
        }
    }

    fn flag(self, state: &ElementState) -> Option<bool> {
        match self {
            Suppress::Select => state.no_select,
            Suppress::Drag => state.no_drag,
        }
    }

    fn flag_mut(self, state: &mut ElementState) -> &mut Option<bool> {
        match self {
            Suppress::Select => &mut state.no_select,
            Suppress::Drag => &mut state.no_drag,
        }
    }
}

impl Handler for Suppress {
    fn bind(&self, rt: &mut Runtime, element: NodeId, marker: &str) -> Result<(), BindError> {
        let text = rt.document().get_attribute(element, marker).unwrap_or_default();
        let enabled = text.trim().is_empty() || truthy(text);

        for node in rt.document().descendants(element) {
            let Some(data) = rt.document().element(node) else {
                continue;
            };
            let exempt = node != element && (data.is("input") || data.is("textarea"));
            self.apply(rt, node, enabled, exempt);
        }
        Ok(())
    }
}

impl Suppress {
    fn apply(self, rt: &mut Runtime, node: NodeId, enabled: bool, exempt: bool) {
        let slot = self.flag_mut(rt.state_mut(node));
        if slot.is_some() {
            *slot = Some(enabled);
            return;
        }
        *slot = Some(enabled && !exempt);
        rt.listen(node, self.event_type(), move |rt, event| self.prevent(rt, event));
    }

    fn prevent(self, rt: &mut Runtime, event: &mut Event) -> Result<(), BindError> {
        let target = event.target;
        let suppressed = rt.state(target).and_then(|s| self.flag(s)).unwrap_or(false);
        if !suppressed {
            return Ok(());
        }
        event.prevent_default();
        event.stop_propagation();
        if self == Suppress::Drag {
            rt.click(target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Runtime;
    use brisk_dom::NodeId;
    use brisk_net::MockTransport;

    fn runtime(html: &str) -> Runtime {
        let mut rt = Runtime::builder()
            .with_transport(MockTransport::new())
            .build(brisk_html::parse(html))
            .unwrap();
        rt.start();
        rt
    }

    #[test]
    fn test_no_select_recursive_with_exempt_inputs() {
        let mut rt = runtime(r#"<body><div br-noselect><span>a</span><input></div><p>b</p></body>"#);
        let div = rt.document().elements_by_tag(NodeId::ROOT, &["div"])[0];
        let span = rt.document().elements_by_tag(NodeId::ROOT, &["span"])[0];
        let input = rt.document().elements_by_tag(NodeId::ROOT, &["input"])[0];
        let p = rt.document().elements_by_tag(NodeId::ROOT, &["p"])[0];

        assert!(!rt.select_start(div));
        assert!(!rt.select_start(span));
        assert!(rt.select_start(input));
        assert!(rt.select_start(p));
    }

    #[test]
    fn test_toggle_on_rescan() {
        let mut rt = runtime(r#"<body><div br-noselect="true"><span>a</span></div></body>"#);
        let div = rt.document().elements_by_tag(NodeId::ROOT, &["div"])[0];
        let span = rt.document().elements_by_tag(NodeId::ROOT, &["span"])[0];
        assert!(!rt.select_start(span));

        rt.document_mut().set_attribute(div, "br-noselect", "false").unwrap();
        rt.bind(NodeId::ROOT, false);
        assert!(rt.select_start(span));
        assert_eq!(rt.listeners.count(span), 1);
    }

    #[test]
    fn test_no_drag_clicks_target() {
        let mut rt = runtime(r#"<body><a br-nodrag href="/x">x</a></body>"#);
        let a = rt.document().elements_by_tag(NodeId::ROOT, &["a"])[0];
        assert!(!rt.drag_start(a));
        assert_eq!(rt.take_notices().len(), 1);
    }
}
