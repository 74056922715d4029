//! Phone-mask marker
//!
//! The value is the expected digit count (10 to 12, default 10). Every edit
//! on the field is cancelled and replayed through a [`Mask`] using the
//! caret cached by caret tracking.

use crate::mask::{Edit, Mask, Outcome};
use crate::{BindError, Runtime};
use brisk_config::coerce::digits;
use brisk_dom::{Event, EventDetail, EventType, InputKind, NodeId, TextSelection};
use std::rc::Rc;

pub fn bind(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().phone_mask.clone();
    if !rt.first_time(element, &marker) {
        return Ok(());
    }
    let requested = digits(rt.document().get_attribute(element, &marker).unwrap_or_default())
        .parse::<usize>()
        .unwrap_or(0);
    rt.document_mut().set_attribute(element, &marker, "")?;

    let mask = Rc::new(Mask::phone(requested));
    tracing::debug!("[{}] on {}: {}", marker, element, mask.pattern());
    let input_mask = Rc::clone(&mask);
    rt.listen(element, EventType::Input, move |rt, event| on_input(rt, event, &input_mask));
    rt.listen(element, EventType::KeyDown, move |rt, event| on_key_down(rt, event, &mask));
    Ok(())
}

fn on_input(rt: &mut Runtime, event: &mut Event, mask: &Mask) -> Result<(), BindError> {
    event.prevent_default();
    let edit = match &event.detail {
        EventDetail::Input {
            kind: InputKind::InsertText,
            data,
        } => Edit::Insert(data.clone().unwrap_or_default()),
        EventDetail::Input {
            kind: InputKind::DeleteBackward,
            ..
        } => Edit::DeleteBackward,
        EventDetail::Input {
            kind: InputKind::DeleteForward,
            ..
        } => Edit::DeleteForward,
        _ => return Ok(()),
    };
    apply(rt, event.current_target, mask, &edit)
}

fn on_key_down(rt: &mut Runtime, event: &mut Event, mask: &Mask) -> Result<(), BindError> {
    if event.key_name() != Some("Delete") {
        return Ok(());
    }
    event.prevent_default();
    apply(rt, event.current_target, mask, &Edit::DeleteForward)
}

fn apply(rt: &mut Runtime, element: NodeId, mask: &Mask, edit: &Edit) -> Result<(), BindError> {
    let value = rt.document().value(element);
    let caret = rt.state(element).map(|s| s.caret).unwrap_or_default();
    let (value, caret) = match mask.apply(&value, caret, edit) {
        Outcome::Rejected => return Ok(()),
        Outcome::Inserted { value, caret } | Outcome::Deleted { value, caret } => (value, caret),
    };
    rt.document_mut().set_value(element, &value)?;
    rt.document_mut().set_selection_range(element, caret, caret)?;
    rt.state_mut(element).caret = TextSelection::collapsed_at(caret);
    Ok(())
}
