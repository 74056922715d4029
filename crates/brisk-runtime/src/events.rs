//! Event listeners
//!
//! Listeners are kept per element and per event type, in the order they
//! were added. Delivery walks from the target up through its ancestors.
//! The input helpers at the bottom play the part of the host's input
//! pipeline: key events first, then a cancelable input event, then the
//! default edit.

use crate::{BindError, Runtime};
use brisk_dom::{Event, EventType, InputKind, NodeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Event callback; errors are logged and never stop delivery
pub type Listener = Rc<dyn Fn(&mut Runtime, &mut Event) -> Result<(), BindError>>;

#[derive(Default)]
pub struct ListenerMap {
    listeners: HashMap<NodeId, Vec<(EventType, Listener)>>,
}

impl ListenerMap {
    pub fn add(&mut self, element: NodeId, event_type: EventType, listener: Listener) {
        self.listeners
            .entry(element)
            .or_default()
            .push((event_type, listener));
    }

    /// Listeners on `element` for `event_type`, in order
    pub fn get(&self, element: NodeId, event_type: &EventType) -> Vec<Listener> {
        self.listeners
            .get(&element)
            .map(|list| {
                list.iter()
                    .filter(|(t, _)| t == event_type)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners on `element`
    pub fn count(&self, element: NodeId) -> usize {
        self.listeners.get(&element).map_or(0, Vec::len)
    }

    pub fn remove_element(&mut self, element: NodeId) {
        self.listeners.remove(&element);
    }

    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.listeners.retain(|&id, _| keep(id));
    }
}

impl std::fmt::Debug for ListenerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerMap")
            .field("elements", &self.listeners.len())
            .finish()
    }
}

impl Runtime {
    /// Deliver `event` to listeners on its target and then each ancestor
    /// until propagation stops; returns the event after delivery
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        let mut path = vec![event.target];
        let mut node = event.target;
        while let Some(parent) = self.document.parent(node) {
            path.push(parent);
            node = parent;
        }

        for node in path {
            event.current_target = node;
            for listener in self.listeners.get(node, &event.event_type) {
                if let Err(err) = listener(self, &mut event) {
                    let name = event.event_type.name().to_string();
                    tracing::warn!("{} listener on {} failed: {}", name, node, err);
                    self.report(format!("{name} on {node}: {err}"));
                }
            }
            if event.is_propagation_stopped() || !event.bubbles {
                break;
            }
        }
        event
    }

    pub fn click(&mut self, element: NodeId) -> Event {
        self.dispatch(Event::click(element))
    }

    pub fn focus(&mut self, element: NodeId) -> Event {
        self.dispatch(Event::new(EventType::FocusIn, element))
    }

    /// Whether a selection may start on `element`
    pub fn select_start(&mut self, element: NodeId) -> bool {
        !self
            .dispatch(Event::new(EventType::SelectStart, element))
            .is_default_prevented()
    }

    /// Whether a drag may start on `element`
    pub fn drag_start(&mut self, element: NodeId) -> bool {
        !self
            .dispatch(Event::new(EventType::DragStart, element))
            .is_default_prevented()
    }

    /// Type `text` into a text control one key at a time
    pub fn type_text(&mut self, element: NodeId, text: &str) -> Result<(), BindError> {
        for ch in text.chars() {
            self.press_key(element, &ch.to_string())?;
        }
        Ok(())
    }

    /// Press one key: a character, `"Backspace"`, `"Delete"` or any other
    /// key name (which only produces key events)
    pub fn press_key(&mut self, element: NodeId, key: &str) -> Result<(), BindError> {
        let down = self.dispatch(Event::key(EventType::KeyDown, element, key));
        if !down.is_default_prevented() {
            let deletion = match key {
                "Backspace" => Some(InputKind::DeleteBackward),
                "Delete" => Some(InputKind::DeleteForward),
                _ => None,
            };
            if let Some(kind) = deletion {
                self.delete(element, kind)?;
            } else if key.chars().count() == 1 {
                let press = self.dispatch(Event::key(EventType::KeyPress, element, key));
                if !press.is_default_prevented() {
                    self.insert(element, key)?;
                }
            }
        }
        self.dispatch(Event::key(EventType::KeyUp, element, key));
        Ok(())
    }

    /// Paste `text`; false when a listener cancelled it
    pub fn paste(&mut self, element: NodeId, text: &str) -> Result<bool, BindError> {
        let paste = self.dispatch(Event::new(EventType::Paste, element));
        if paste.is_default_prevented() {
            return Ok(false);
        }
        self.insert(element, text)
    }

    fn insert(&mut self, element: NodeId, text: &str) -> Result<bool, BindError> {
        let input = self.dispatch(Event::insert_text(element, text));
        if input.is_default_prevented() {
            return Ok(false);
        }
        let value = self.document.value(element);
        let (value, caret) = self.document.selection(element).replace(&value, text);
        self.document.set_value(element, &value)?;
        self.document.set_selection_range(element, caret.start, caret.end)?;
        Ok(true)
    }

    fn delete(&mut self, element: NodeId, kind: InputKind) -> Result<bool, BindError> {
        let input = self.dispatch(Event::delete(element, kind));
        if input.is_default_prevented() {
            return Ok(false);
        }
        let value = self.document.value(element);
        let forward = kind == InputKind::DeleteForward;
        let (value, caret) = self.document.selection(element).delete(&value, forward);
        self.document.set_value(element, &value)?;
        self.document.set_selection_range(element, caret.start, caret.end)?;
        Ok(true)
    }
}
