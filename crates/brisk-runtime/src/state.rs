//! Per-element instance state
//!
//! The runtime never stores anything on the tree itself. Everything it
//! remembers about an element lives in this side table, keyed by
//! [`NodeId`], and is purged when a down-rebind finds the element detached.

use crate::scheduler::TimerId;
use crate::Runtime;
use brisk_config::{FuncRef, Options, Value};
use brisk_dom::{NodeId, TextSelection};
use brisk_net::Method;
use std::collections::{HashMap, HashSet};

/// Cleanup run before a down-rebind discards an element's state
pub type TeardownHook = Box<dyn FnOnce(&mut Runtime, NodeId)>;

/// Callback run once a view refresh has rendered and bound
pub type RefreshCallback = Box<dyn FnOnce(&mut Runtime, NodeId)>;

/// View marker state
pub struct ViewState {
    pub url: String,
    pub method: Method,
    pub data: Option<Value>,
    pub gather_inputs: bool,
    pub error_callback: Option<FuncRef>,
    pub start_stop: Option<FuncRef>,
    pub options: Options,
    /// A load is in flight
    pub loading: bool,
    /// Content from the last load has been rendered
    pub loaded: bool,
    pub interval: Option<TimerId>,
    pub refresh_callback: Option<RefreshCallback>,
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("loading", &self.loading)
            .field("loaded", &self.loaded)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ElementState {
    /// One-time setup already done, by key
    processed: HashSet<String>,
    /// Selection cached by caret tracking
    pub caret: TextSelection,
    /// Name assigned by the identifier marker
    pub br_id: Option<String>,
    pub view: Option<ViewState>,
    /// A blocking ajax request is outstanding
    pub ajax_busy: bool,
    pub no_select: Option<bool>,
    pub no_drag: Option<bool>,
    pub teardown: Vec<TeardownHook>,
}

impl std::fmt::Debug for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementState")
            .field("processed", &self.processed)
            .field("caret", &self.caret)
            .field("br_id", &self.br_id)
            .field("view", &self.view)
            .field("ajax_busy", &self.ajax_busy)
            .field("teardown", &self.teardown.len())
            .finish_non_exhaustive()
    }
}

impl ElementState {
    /// Set the processed flag for `key`; false when it was already set
    pub fn mark(&mut self, key: &str) -> bool {
        self.processed.insert(key.to_string())
    }

    pub fn is_processed(&self, key: &str) -> bool {
        self.processed.contains(key)
    }
}

/// Side table of element states
#[derive(Debug, Default)]
pub struct StateTable {
    states: HashMap<NodeId, ElementState>,
}

impl StateTable {
    pub fn get(&self, element: NodeId) -> Option<&ElementState> {
        self.states.get(&element)
    }

    pub fn get_mut(&mut self, element: NodeId) -> Option<&mut ElementState> {
        self.states.get_mut(&element)
    }

    /// State for `element`, created on first use
    pub fn entry(&mut self, element: NodeId) -> &mut ElementState {
        self.states.entry(element).or_default()
    }

    /// Elements that have state, in id order
    pub fn elements(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.states.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Drop state of every element `keep` rejects
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> usize {
        let before = self.states.len();
        self.states.retain(|&id, _| keep(id));
        before - self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
