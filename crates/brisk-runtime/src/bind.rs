//! Scan/Bind
//!
//! A pass runs in a fixed order: identifiers, caret and anchor
//! instrumentation, the debug marker, every other registered marker in
//! registration order, and the call marker last. A failing handler never
//! stops the pass; its error is written into the marker attribute instead.

use crate::registry::Handler;
use crate::scheduler::Task;
use crate::{markers, BindError, Notice, Runtime};
use brisk_dom::NodeId;
use std::rc::Rc;

impl Runtime {
    /// Scan `root` for markers and bind them.
    ///
    /// With `down` set this is a down-rebind: elements no longer in the
    /// document are torn down and forgotten, and the identifier index is
    /// rebuilt from scratch before any handler runs. A bind requested while
    /// a pass is running is deferred to the scheduler.
    pub fn bind(&mut self, root: NodeId, down: bool) {
        if self.binding {
            tracing::debug!("bind of {} deferred (down: {})", root, down);
            self.schedule(Task::Bind { roots: vec![root], down }, 0);
            return;
        }
        self.binding = true;
        self.bind_pass(root, down);
        self.binding = false;
    }

    fn bind_pass(&mut self, root: NodeId, down: bool) {
        if down {
            self.collect_detached();
            self.ids.clear();
        }
        let scope = if down || !self.document.is_connected(root) {
            NodeId::ROOT
        } else {
            root
        };
        tracing::debug!("bind pass over {} (down: {})", scope, down);

        let id_marker = self.config.markers.id.clone();
        for element in self.document.elements_with_attribute(NodeId::ROOT, &id_marker) {
            self.bind_identifier(element, &id_marker);
        }

        for element in self.document.descendants(scope) {
            markers::instrument::install(self, element);
        }

        let debug_marker = self.config.markers.debug.clone();
        if let Some(handler) = self.registry.debug() {
            for element in self.document.elements_with_attribute(scope, &debug_marker) {
                self.run_handler(&handler, element, &debug_marker);
            }
        }

        for (marker, handler) in self.registry.others() {
            for element in self.document.elements_with_attribute(scope, &marker) {
                // An earlier handler may have moved or stripped it
                if self.document.has_attribute(element, &marker) && self.document.is_connected(element) {
                    self.run_handler(&handler, element, &marker);
                }
            }
        }

        let call_marker = self.config.markers.call.clone();
        for element in self.document.elements_with_attribute(scope, &call_marker) {
            if let Err(err) = markers::script::call(self, element, &call_marker) {
                self.handler_failed(element, &call_marker, &err);
            }
        }
    }

    fn bind_identifier(&mut self, element: NodeId, marker: &str) {
        let name = self
            .document
            .get_attribute(element, marker)
            .unwrap_or_default()
            .trim()
            .to_string();
        if name.is_empty() {
            return;
        }
        self.ids.insert(&name, element);
        self.states.entry(element).br_id = Some(name);
    }

    fn run_handler(&mut self, handler: &Rc<dyn Handler>, element: NodeId, marker: &str) {
        if let Err(err) = handler.bind(self, element, marker) {
            self.handler_failed(element, marker, &err);
        }
    }

    /// Report a handler failure and write it into the marker attribute
    pub(crate) fn handler_failed(&mut self, element: NodeId, marker: &str, err: &BindError) {
        let message = format!("ERROR: {err}");
        if self.debug {
            tracing::error!("[{}] on {}: {}", marker, element, err);
        } else {
            tracing::warn!("[{}] on {}: {}", marker, element, err);
        }
        if let Err(dom) = self.document.set_attribute(element, marker, &message) {
            tracing::debug!("cannot record failure on {}: {}", element, dom);
        }
        self.report(format!("[{marker}] {err}"));
        self.notify(Notice::HandlerFailed {
            element,
            marker: marker.to_string(),
            message,
        });
    }

    /// Run teardown hooks depth-first over each subtree
    pub(crate) fn teardown(&mut self, roots: &[NodeId]) {
        for &root in roots {
            for element in self.document.descendants(root) {
                self.run_teardown(element);
            }
        }
    }

    fn run_teardown(&mut self, element: NodeId) {
        let hooks = match self.states.get_mut(element) {
            Some(state) => std::mem::take(&mut state.teardown),
            None => return,
        };
        for hook in hooks {
            hook(self, element);
        }
    }

    /// Tear down and forget every element that left the document
    fn collect_detached(&mut self) {
        let detached: Vec<NodeId> = self
            .states
            .elements()
            .into_iter()
            .filter(|&id| !self.document.is_connected(id))
            .collect();
        for &element in &detached {
            self.run_teardown(element);
        }
        let document = &self.document;
        let purged = self.states.retain(|id| document.is_connected(id));
        self.listeners.retain(|id| document.is_connected(id));
        if purged > 0 {
            tracing::debug!("dropped state of {} detached elements", purged);
        }
    }
}
