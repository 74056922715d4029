//! brisk DOM - Rendered Document Tree
//!
//! Arena-backed document tree that the binding runtime scans and mutates.
//! Elements are addressed by [`NodeId`]; ids are never reused, so a handle to
//! a removed element stays valid and simply reports itself as detached.

mod node;
mod tree;
mod attributes;
mod document;
mod events;
mod observer;
mod selection;

pub use node::{Node, NodeData, ElementData};
pub use tree::DomTree;
pub use attributes::{Attr, NamedNodeMap};
pub use document::{Document, DomError};
pub use events::{Event, EventType, EventDetail, InputKind};
pub use observer::{MutationLog, MutationRecord, MutationType};
pub use selection::{TextSelection, SelectionDirection};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for missing links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
