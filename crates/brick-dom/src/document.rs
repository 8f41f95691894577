//! Document - High-level document API

use crate::{DomTree, Event, EventRoute, ListenerRegistry, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Event listeners attached to nodes of this document
    listeners: ListenerRegistry,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with `html > head + body`
    pub fn new(url: &str) -> Self {
        let mut document = Self::empty(url);
        let tree = &mut document.tree;

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes under the document node cannot violate the hierarchy
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        document.html_element = html;
        document.head_element = head;
        document.body_element = body;
        document
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            listeners: ListenerRegistry::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate html/head/body after the tree was built externally
    pub fn finalize(&mut self) {
        let tree = &self.tree;
        let find_child = |parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, n)| n.as_element().is_some_and(|e| e.tag_name == tag))
                .map(|(id, _)| id)
                .unwrap_or(NodeId::NONE)
        };

        let html = find_child(tree.root(), "html");
        let (head, body) = if html.is_valid() {
            (find_child(html, "head"), find_child(html, "body"))
        } else {
            (NodeId::NONE, NodeId::NONE)
        };

        self.html_element = html;
        self.head_element = head;
        self.body_element = body;
        tracing::debug!("Document finalized: html={} head={} body={}", html, head, body);
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Event listeners
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Event listeners, mutably
    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    /// Whether `node` is connected to this document's root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.contains(self.tree.root(), node)
    }

    /// Build the propagation route of `event` through the attached listeners
    pub fn route_event(&self, event: &Event) -> EventRoute {
        let mut path: Vec<NodeId> = self.tree.ancestors(event.target).collect();
        path.reverse();
        EventRoute::build(&self.listeners, &path, event)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
