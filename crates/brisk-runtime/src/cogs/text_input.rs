//! Text-input restriction markers: no-paste, limit-text and
//! only-allow-chars

use crate::{BindError, Runtime};
use brisk_config::coerce::digits;
use brisk_dom::{Event, EventType, NodeId};
use regex::Regex;

/// Attribute value of `marker` after claiming the element; None when it
/// was already processed
fn claim(rt: &mut Runtime, element: NodeId, marker: &str) -> Result<Option<String>, BindError> {
    if !rt.first_time(element, marker) {
        return Ok(None);
    }
    let text = rt
        .document()
        .get_attribute(element, marker)
        .unwrap_or_default()
        .trim()
        .to_string();
    rt.document_mut().set_attribute(element, marker, "")?;
    Ok(Some(text))
}

pub fn bind_no_paste(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().no_paste.clone();
    if claim(rt, element, &marker)?.is_some() {
        rt.listen(element, EventType::Paste, |_rt: &mut Runtime, event: &mut Event| {
            event.prevent_default();
            Ok(())
        });
    }
    Ok(())
}

pub fn bind_limit_text(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().limit_text.clone();
    let Some(text) = claim(rt, element, &marker)? else {
        return Ok(());
    };
    let limit = digits(&text).parse::<usize>().unwrap_or(0);
    rt.listen(element, EventType::KeyPress, move |rt, event| {
        if rt.document().value(event.current_target).chars().count() >= limit {
            event.prevent_default();
        }
        Ok(())
    });
    Ok(())
}

pub fn bind_only_allow_chars(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().only_allow_chars.clone();
    let Some(text) = claim(rt, element, &marker)? else {
        return Ok(());
    };
    if !(text.starts_with('[') && text.ends_with(']')) {
        return Err(BindError::InvalidCharSet(text));
    }
    let allowed = Regex::new(&text).map_err(|_| BindError::InvalidCharSet(text.clone()))?;
    rt.listen(element, EventType::KeyPress, move |_rt, event| {
        let rejected = event
            .key_name()
            .filter(|key| key.chars().count() == 1)
            .is_some_and(|key| !allowed.is_match(key));
        if rejected {
            event.prevent_default();
        }
        Ok(())
    });
    Ok(())
}
