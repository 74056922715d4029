//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena tree.

use brisk_dom::{Document, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        for child in dom.document.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, &mut document) {
                // Conversion only produces elements, text and comments
                let _ = document.append_child(NodeId::ROOT, id);
            }
        }
        document.finalize();
        // Building the initial tree is not a mutation anyone observes
        document.take_records();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse a fragment into detached nodes owned by `document`
    ///
    /// The fragment is parsed as a body's content, so `<html>`/`<body>`
    /// wrappers in the input are dropped.
    pub fn parse_fragment(&self, document: &mut Document, html: &str) -> Vec<NodeId> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let Some(body) = find_body(&dom.document) else {
            return Vec::new();
        };
        let children = body.children.borrow();
        children
            .iter()
            .filter_map(|child| self.convert_node(child, document))
            .collect()
    }

    /// Convert an RcDom node into a detached subtree
    fn convert_node(&self, handle: &Handle, document: &mut Document) -> Option<NodeId> {
        match &handle.data {
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() {
                    return None;
                }
                Some(document.create_text(&text))
            }
            RcNodeData::Comment { contents } => Some(document.create_comment(contents)),
            RcNodeData::Element { name, attrs, .. } => {
                let id = document.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    let _ = document.set_attribute(id, &attr.name.local, &attr.value);
                }
                for child in handle.children.borrow().iter() {
                    if let Some(child_id) = self.convert_node(child, document) {
                        let _ = document.append_child(id, child_id);
                    }
                }
                Some(id)
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::ProcessingInstruction { .. } => None,
        }
    }
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let RcNodeData::Element { name, .. } = &handle.data {
        if &*name.local == "body" {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(find_body)
}
