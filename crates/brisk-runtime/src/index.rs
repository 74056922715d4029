//! Identifier Index
//!
//! Names assigned with the identifier marker, mapped to elements. Entries
//! never keep an element alive; a removed element stays indexed until the
//! next down-rebind clears the index.

use brisk_dom::NodeId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct IdentifierIndex {
    ids: HashMap<String, NodeId>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `name` at `element`, replacing any previous entry
    pub fn insert(&mut self, name: &str, element: NodeId) {
        self.ids.insert(name.to_string(), element);
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Name assigned to `element`, if any
    pub fn name_of(&self, element: NodeId) -> Option<&str> {
        self.ids
            .iter()
            .find(|&(_, &id)| id == element)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisk_dom::Document;

    #[test]
    fn test_redeclare_repoints() {
        let mut doc = Document::default();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let mut index = IdentifierIndex::new();
        index.insert("main", a);
        index.insert("main", b);
        assert_eq!(index.get("main"), Some(b));
        assert_eq!(index.len(), 1);
        assert_eq!(index.name_of(b), Some("main"));
        index.clear();
        assert!(index.get("main").is_none());
    }
}
