//! Marker Registry
//!
//! Ordered map from marker attribute name to [`Handler`]. The identifier
//! and call markers are processed by the engine itself and can never be
//! registered; the identifier and debug markers can never be removed.

use crate::{BindError, Runtime};
use brisk_dom::NodeId;
use std::rc::Rc;

/// Behavior attached to elements carrying a marker attribute
pub trait Handler {
    /// Bind `element`, which carries the attribute `marker`.
    ///
    /// Called on every scan that finds the element; one-time setup must
    /// guard itself with [`Runtime::first_time`].
    fn bind(&self, rt: &mut Runtime, element: NodeId, marker: &str) -> Result<(), BindError>;
}

impl<F> Handler for F
where
    F: Fn(&mut Runtime, NodeId) -> Result<(), BindError>,
{
    fn bind(&self, rt: &mut Runtime, element: NodeId, _marker: &str) -> Result<(), BindError> {
        self(rt, element)
    }
}

/// Registered handlers in registration order
pub struct MarkerRegistry {
    entries: Vec<(String, Rc<dyn Handler>)>,
    id_marker: String,
    call_marker: String,
    debug_marker: String,
}

impl MarkerRegistry {
    pub fn new(id_marker: &str, call_marker: &str, debug_marker: &str) -> Self {
        Self {
            entries: Vec::new(),
            id_marker: id_marker.to_ascii_lowercase(),
            call_marker: call_marker.to_ascii_lowercase(),
            debug_marker: debug_marker.to_ascii_lowercase(),
        }
    }

    /// Add a handler; an existing registration is never replaced
    pub fn register(&mut self, name: &str, handler: Rc<dyn Handler>) -> Result<(), BindError> {
        let name = name.trim().to_ascii_lowercase();
        if name == self.id_marker || name == self.call_marker {
            return Err(BindError::Reserved(name));
        }
        if self.contains(&name) {
            return Err(BindError::Duplicate(name));
        }
        self.entries.push((name, handler));
        Ok(())
    }

    /// Remove a handler
    pub fn unregister(&mut self, name: &str) -> Result<(), BindError> {
        let name = name.trim().to_ascii_lowercase();
        if name == self.id_marker || name == self.debug_marker {
            return Err(BindError::Pinned(name));
        }
        let before = self.entries.len();
        self.entries.retain(|(n, _)| *n != name);
        if self.entries.len() == before {
            return Err(BindError::UnknownMarker(name));
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.entries.iter().any(|(n, _)| *n == name)
    }

    /// Handler registered for the debug marker, if any
    pub fn debug(&self) -> Option<Rc<dyn Handler>> {
        self.get(&self.debug_marker)
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Handler>> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, h)| h.clone())
    }

    /// Every handler except the debug marker's, in registration order
    pub fn others(&self) -> Vec<(String, Rc<dyn Handler>)> {
        self.entries
            .iter()
            .filter(|(n, _)| *n != self.debug_marker)
            .map(|(n, h)| (n.clone(), h.clone()))
            .collect()
    }

    /// Registered names in order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for MarkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerRegistry")
            .field("markers", &self.names())
            .finish()
    }
}
