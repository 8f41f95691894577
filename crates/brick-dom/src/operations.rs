//! DOM Node Operations
//!
//! Error type shared by appendChild, removeChild and attribute mutation.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor)
    #[error("Hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Invalid node type
    #[error("Node {0} has the wrong type for this operation")]
    InvalidNodeType(NodeId),
    /// Node is not a child
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
