//! DOM Events
//!
//! User-interaction events delivered to bound elements.

use crate::NodeId;

/// Event types the runtime listens for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    /// Fired before an edit is applied to a text control
    Input,
    KeyDown,
    KeyPress,
    KeyUp,
    FocusIn,
    Paste,
    SelectStart,
    DragStart,
    /// Application-defined event name
    Custom(String),
}

impl EventType {
    /// Map an event name such as `"click"` to its type
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "click" => Self::Click,
            "input" => Self::Input,
            "keydown" => Self::KeyDown,
            "keypress" => Self::KeyPress,
            "keyup" => Self::KeyUp,
            "focusin" | "focus" => Self::FocusIn,
            "paste" => Self::Paste,
            "selectstart" => Self::SelectStart,
            "dragstart" => Self::DragStart,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Event name as used in markup
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::KeyUp => "keyup",
            Self::FocusIn => "focusin",
            Self::Paste => "paste",
            Self::SelectStart => "selectstart",
            Self::DragStart => "dragstart",
            Self::Custom(name) => name,
        }
    }
}

/// Kind of edit carried by an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    InsertText,
    DeleteBackward,
    DeleteForward,
}

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    None,
    Input { kind: InputKind, data: Option<String> },
    Key { key: String },
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
    pub detail: EventDetail,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create a bubbling, cancelable event
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            detail: EventDetail::None,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Click event
    pub fn click(target: NodeId) -> Self {
        Self::new(EventType::Click, target)
    }

    /// Text insertion about to be applied
    pub fn insert_text(target: NodeId, text: &str) -> Self {
        Self::new(EventType::Input, target).with_detail(EventDetail::Input {
            kind: InputKind::InsertText,
            data: Some(text.to_string()),
        })
    }

    /// Deletion about to be applied
    pub fn delete(target: NodeId, kind: InputKind) -> Self {
        Self::new(EventType::Input, target).with_detail(EventDetail::Input { kind, data: None })
    }

    /// Keyboard event carrying a key name (`"a"`, `"Delete"`, ...)
    pub fn key(event_type: EventType, target: NodeId, key: &str) -> Self {
        Self::new(event_type, target).with_detail(EventDetail::Key { key: key.to_string() })
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Key name for keyboard events
    pub fn key_name(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::Key { key } => Some(key),
            _ => None,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
