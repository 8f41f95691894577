//! brick DOM - Document Object Model
//!
//! Arena-backed DOM tree with attribute access and DOM-style event routing.

mod node;
mod tree;
mod document;
mod events;
mod operations;

pub use node::{Node, NodeData, ElementData, Attribute, TextData};
pub use tree::{DomTree, Children, Descendants, Ancestors};
pub use document::Document;
pub use events::{
    Event, EventPhase, EventRoute, RouteEntry, ListenerId, ListenerOptions, Listener,
    ListenerRegistry,
};
pub use operations::{DomError, DomResult};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert to `Option`, mapping the sentinel to `None`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        if self.is_valid() { Some(self) } else { None }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
