//! Document - High-level document API
//!
//! Wraps the arena tree with element accessors, form state and a mutation
//! log. Structural and attribute changes to connected nodes are recorded;
//! building a detached subtree is silent.

use crate::{
    DomTree, ElementData, MutationLog, MutationRecord, NamedNodeMap, Node, NodeData, NodeId,
    TextSelection,
};

/// DOM operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0} is not an element")]
    InvalidNodeType(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    mutations: MutationLog,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.tree.push(Node::element("html"));
        let head = doc.tree.push(Node::element("head"));
        let body = doc.tree.push(Node::element("body"));
        doc.tree.link(NodeId::ROOT, html, None);
        doc.tree.link(html, head, None);
        doc.tree.link(html, body, None);
        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create a document holding only the root node
    pub fn empty(url: &str) -> Self {
        let mut tree = DomTree::new();
        tree.push(Node::document());
        Self {
            tree,
            url: url.to_string(),
            mutations: MutationLog::new(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate `<html>`, `<head>` and `<body>` after building the tree by hand
    pub fn finalize(&mut self) {
        let find = |doc: &Self, parent: NodeId, tag: &str| {
            doc.tree
                .children(parent)
                .into_iter()
                .find(|&c| doc.tag_name(c) == Some(tag))
                .unwrap_or(NodeId::NONE)
        };
        self.html_element = find(self, NodeId::ROOT, "html");
        self.head_element = find(self, self.html_element, "head");
        self.body_element = find(self, self.html_element, "body");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    // ------------------------------------------------------------------
    // Node creation and structure
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.tree.push(Node::comment(text))
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or at the end)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if let Some(r) = reference {
            if self.tree.parent(r) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
        }
        if let Some(old_parent) = self.tree.detach(child) {
            self.record(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }
        self.tree.link(parent, child, reference);
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.tree.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.tree.detach(child);
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![child]));
        Ok(())
    }

    /// Remove a node from whatever parent holds it
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        match self.tree.parent(node) {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    /// Replace all children of `parent` with `children`, recorded as one mutation
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<(), DomError> {
        for &child in &children {
            self.check_insert(parent, child)?;
        }
        let removed = self.tree.children(parent);
        for &old in &removed {
            self.tree.detach(old);
        }
        for &child in &children {
            if let Some(old_parent) = self.tree.detach(child) {
                self.record(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
            }
            self.tree.link(parent, child, None);
        }
        if !removed.is_empty() || !children.is_empty() {
            self.record(MutationRecord::child_list(parent, children, removed));
        }
        Ok(())
    }

    /// Replace the children of `parent` with a single text node
    pub fn set_text_content(&mut self, parent: NodeId, text: &str) -> Result<(), DomError> {
        let children = if text.is_empty() {
            Vec::new()
        } else {
            vec![self.create_text(text)]
        };
        self.replace_children(parent, children)
    }

    /// Log a mutation; only changes inside the connected tree are observed
    fn record(&mut self, record: MutationRecord) {
        if self.is_connected(record.target) {
            self.mutations.push_record(record);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.tree.get(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        let node = self.tree.get(child).ok_or(DomError::NotFound(child))?;
        if matches!(node.data, NodeData::Document) || self.tree.is_inclusive_descendant(parent, child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    /// Direct children
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.children(id)
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .children(id)
            .into_iter()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// Preorder walk including `root`
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.tree.descendants(root)
    }

    /// Elements at or under `root` carrying attribute `name`, in document order
    pub fn elements_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.tree
            .descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.attrs.has_attribute(name)))
            .collect()
    }

    /// Elements at or under `root` whose tag is one of `tags`
    pub fn elements_by_tag(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.tree
            .descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| tags.iter().any(|t| e.is(t))))
            .collect()
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.tree.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.is_inclusive_descendant(node, ancestor)
    }

    /// Nearest inclusive ancestor with the given tag
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find(|&n| self.element(n).is_some_and(|e| e.is(tag)))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.tree.descendants(id) {
            if let Some(Node { data: NodeData::Text(text), .. }) = self.tree.get(node) {
                out.push_str(text);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Elements and attributes
    // ------------------------------------------------------------------

    /// Element data for an element node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.get(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        let node = self.tree.get_mut(id).ok_or(DomError::NotFound(id))?;
        node.as_element_mut().ok_or(DomError::InvalidNodeType(id))
    }

    /// Lowercase tag name
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Attribute map of an element
    pub fn attributes(&self, id: NodeId) -> Option<&NamedNodeMap> {
        self.element(id).map(|e| &e.attrs)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attrs.get_attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.attrs.has_attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let old = self.element_mut(id)?.attrs.set_attribute(name, value);
        self.record(MutationRecord::attribute(id, &name.to_ascii_lowercase(), old));
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        if let Some(old) = self.element_mut(id)?.attrs.remove_attribute(name) {
            self.record(MutationRecord::attribute(id, &old.name, Some(old.value)));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Form state
    // ------------------------------------------------------------------

    /// Current value of a form control
    pub fn value(&self, id: NodeId) -> String {
        let Some(elem) = self.element(id) else {
            return String::new();
        };
        if let Some(value) = &elem.value {
            return value.clone();
        }
        match elem.tag.as_str() {
            "textarea" => self.text_content(id),
            "select" => {
                let options = self.elements_by_tag(id, &["option"]);
                let chosen = options
                    .iter()
                    .find(|&&o| self.has_attribute(o, "selected"))
                    .or(options.first());
                chosen
                    .map(|&o| match self.get_attribute(o, "value") {
                        Some(v) => v.to_string(),
                        None => self.text_content(o),
                    })
                    .unwrap_or_default()
            }
            _ => elem.attrs.get_attribute("value").unwrap_or_default().to_string(),
        }
    }

    /// Set the value of a form control; the caret moves to the end
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        let elem = self.element_mut(id)?;
        elem.selection = TextSelection::collapsed_at(value.chars().count());
        elem.value = Some(value.to_string());
        Ok(())
    }

    /// Checkedness of a checkbox or radio input
    pub fn is_checked(&self, id: NodeId) -> bool {
        self.has_attribute(id, "checked")
    }

    /// Selection inside a text control
    pub fn selection(&self, id: NodeId) -> TextSelection {
        self.element(id).map(|e| e.selection).unwrap_or_default()
    }

    /// Set the selection inside a text control, clamped to its value
    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> Result<(), DomError> {
        let len = self.value(id).chars().count();
        self.element_mut(id)?.selection = TextSelection::new(start, end).clamp(len);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutation log
    // ------------------------------------------------------------------

    /// Drain recorded mutations
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.mutations.take_records()
    }

    /// Whether unread mutation records exist
    pub fn has_records(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Start or stop recording mutations
    pub fn set_recording(&mut self, enabled: bool) {
        self.mutations.set_enabled(enabled);
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.tree.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in self.tree.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Text(text) => escape_into(text, false, out),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for attr in elem.attrs.iter() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                    return;
                }
                for child in self.tree.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationType;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new("https://example.com/");
        assert_eq!(doc.tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert!(doc.is_connected(doc.body()));
        assert!(!doc.has_records());
    }

    #[test]
    fn test_append_records_mutation() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        doc.append_child(doc.body(), div).unwrap();

        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mutation_type, MutationType::ChildList);
        assert_eq!(records[0].added_nodes, vec![div]);
    }

    #[test]
    fn test_cannot_insert_ancestor() {
        let mut doc = Document::default();
        let body = doc.body();
        let html = doc.document_element();
        assert!(matches!(
            doc.append_child(body, html),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_removed_node_is_detached() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(doc.body(), div).unwrap();
        doc.append_child(div, span).unwrap();
        doc.remove(div).unwrap();

        assert!(!doc.is_connected(span));
        assert_eq!(doc.parent(span), Some(div));
    }

    #[test]
    fn test_form_values() {
        let mut doc = Document::default();
        let input = doc.create_element("input");
        doc.set_attribute(input, "value", "abc").unwrap();
        assert_eq!(doc.value(input), "abc");

        doc.set_value(input, "xyz").unwrap();
        assert_eq!(doc.value(input), "xyz");
        assert_eq!(doc.selection(input), TextSelection::collapsed_at(3));

        let select = doc.create_element("select");
        for (v, selected) in [("a", false), ("b", true)] {
            let option = doc.create_element("option");
            doc.set_attribute(option, "value", v).unwrap();
            if selected {
                doc.set_attribute(option, "selected", "").unwrap();
            }
            doc.append_child(select, option).unwrap();
        }
        assert_eq!(doc.value(select), "b");
    }

    #[test]
    fn test_serialize() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        doc.set_attribute(div, "title", "a\"b").unwrap();
        let text = doc.create_text("1 < 2");
        let input = doc.create_element("input");
        doc.append_child(div, text).unwrap();
        doc.append_child(div, input).unwrap();

        assert_eq!(doc.outer_html(div), "<div title=\"a&quot;b\">1 &lt; 2<input></div>");
    }

    #[test]
    fn test_closest() {
        let mut doc = Document::default();
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        doc.append_child(doc.body(), form).unwrap();
        doc.append_child(form, input).unwrap();
        assert_eq!(doc.closest(input, "form"), Some(form));
        assert_eq!(doc.closest(form, "table"), None);
    }
}
