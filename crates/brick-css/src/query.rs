//! Element Queries
//!
//! querySelector / querySelectorAll over a subtree.

use brick_dom::{DomTree, NodeId};

use crate::SelectorList;

/// All descendants of `root` matching `selectors`, in document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
    tree.descendants(root)
        .filter(|&node| selectors.matches(tree, node))
        .collect()
}

/// First descendant of `root` matching `selectors`
pub fn query_selector(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
    tree.descendants(root).find(|&node| selectors.matches(tree, node))
}
