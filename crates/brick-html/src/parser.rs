//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use brick_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML5 parser
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = Self::parse_rcdom(html)?;

        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_children(&dom.document, document.tree_mut(), root)?;
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse a fragment and append its body-level nodes to `parent`.
    ///
    /// Returns the inserted top-level nodes in order.
    pub fn parse_into(
        &self,
        document: &mut Document,
        parent: NodeId,
        html: &str,
    ) -> Result<Vec<NodeId>, HtmlError> {
        let dom = Self::parse_rcdom(html)?;
        let Some(body) = find_element(&dom.document, "body") else {
            return Ok(Vec::new());
        };

        let tree = document.tree_mut();
        let mut inserted = Vec::new();
        for child in body.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree, parent)? {
                inserted.push(id);
            }
        }

        tracing::debug!("Inserted {} nodes under {}", inserted.len(), parent);
        Ok(inserted)
    }

    fn parse_rcdom(html: &str) -> Result<RcDom, HtmlError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        Ok(dom)
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }
        Ok(())
    }

    /// Convert an RcDom node to our DOM format, appending it to `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<Option<NodeId>, HtmlError> {
        let id = match &handle.data {
            RcNodeData::Document => {
                self.convert_children(handle, tree, parent)?;
                return Ok(None);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() {
                    return Ok(None);
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, attr.value.to_string())?;
                }
                tree.append_child(parent, id)?;
                self.convert_children(handle, tree, id)?;
                return Ok(Some(id));
            }
            // Doctype and processing instructions have no counterpart in the arena
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => return Ok(None),
        };

        tree.append_child(parent, id)?;
        Ok(Some(id))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first search for the first element with `tag`
fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let RcNodeData::Element { name, .. } = &handle.data {
        if &*name.local == tag {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(|child| find_element(child, tag))
}
