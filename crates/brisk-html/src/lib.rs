//! brisk HTML Parser
//!
//! HTML5 parsing built on html5ever. Whole documents become a
//! [`Document`]; fragments fetched by views are parsed and spliced under an
//! existing element.

mod parser;

pub use parser::HtmlParser;

use brisk_dom::{Document, DomError, NodeId};

/// Parse an HTML string into a new document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Replace the children of `element` with the parsed `html` fragment
pub fn set_inner_html(document: &mut Document, element: NodeId, html: &str) -> Result<(), DomError> {
    let nodes = HtmlParser::new().parse_fragment(document, html);
    document.replace_children(element, nodes)
}
