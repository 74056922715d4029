//! Caret and anchor tracking
//!
//! Installed on every text control and anchor the bind pass walks over,
//! whether or not it carries a marker. The masked-input cog reads the caret
//! cached here.

use crate::{BindError, Notice, Runtime};
use brisk_dom::{Event, EventType, NodeId};
use brisk_net::Url;

const CARET: &str = "#caret";
const ANCHOR: &str = "#anchor";

pub(crate) fn install(rt: &mut Runtime, element: NodeId) {
    let (text_control, anchor) = match rt.document().element(element) {
        Some(data) => (data.is_text_control(), data.is("a")),
        None => return,
    };

    if text_control && rt.first_time(element, CARET) {
        for event_type in [EventType::FocusIn, EventType::KeyUp, EventType::Input] {
            rt.listen(element, event_type, track_caret);
        }
    } else if anchor && rt.first_time(element, ANCHOR) {
        rt.listen(element, EventType::Click, track_anchor);
    }
}

fn track_caret(rt: &mut Runtime, event: &mut Event) -> Result<(), BindError> {
    let element = event.current_target;
    let selection = rt.document().selection(element);
    rt.state_mut(element).caret = selection;
    Ok(())
}

fn track_anchor(rt: &mut Runtime, event: &mut Event) -> Result<(), BindError> {
    let element = event.current_target;
    let href = match rt.document().get_attribute(element, "href") {
        Some(href) if !href.trim().is_empty() => href.trim().to_string(),
        _ => return Ok(()),
    };
    let url = Url::parse(&href).ok();
    tracing::debug!("anchor {} clicked: {}", element, href);
    rt.notify(Notice::AnchorClick { element, href, url });
    Ok(())
}
