//! Selector matching
//!
//! `matches` and the two ancestor walks used by event dispatch. Walks start at
//! the given node and stop before the body element.

use brick_css::{parse_selector, query_selector_all, SelectorList};
use brick_dom::NodeId;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::identity::{ComponentId, ID_ATTRIBUTE};
use crate::{Components, Result};

/// How selectors are tested against an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Match the element directly with the selector engine
    #[default]
    Native,
    /// Query the element's parent and look for the element among the results.
    /// Parentless elements are placed in a scratch container for the query.
    Query,
}

impl Components {
    /// Whether `element` matches `selector`
    pub fn matches(&mut self, element: NodeId, selector: &str) -> Result<bool> {
        let selectors = parse_selector(selector)?;
        Ok(self.matches_compiled(element, &selectors))
    }

    pub(crate) fn matches_compiled(&mut self, element: NodeId, selectors: &SelectorList) -> bool {
        match self.config.match_strategy {
            MatchStrategy::Native => selectors.matches(self.document.tree(), element),
            MatchStrategy::Query => self.matches_by_query(element, selectors),
        }
    }

    /// Leaves the tree as it found it
    fn matches_by_query(&mut self, element: NodeId, selectors: &SelectorList) -> bool {
        let tree = self.document.tree_mut();
        if !tree.is_element(element) {
            return false;
        }

        let (parent, borrowed) = match tree.parent(element) {
            Some(parent) => (parent, false),
            None => (self.scratch, true),
        };
        if borrowed && tree.append_child(parent, element).is_err() {
            return false;
        }

        let found = query_selector_all(tree, parent, selectors).contains(&element);

        if borrowed {
            tree.detach(element);
        }
        trace!("Query match of {} against {:?}: {}", element, selectors.source(), found);
        found
    }

    /// Nearest component at or above `node`, stopping before the body.
    ///
    /// The first element carrying an id attribute decides: if its id has no
    /// live instance, the walk ends with `None`.
    pub fn closest_component(&self, node: NodeId) -> Option<ComponentId> {
        let tree = self.document.tree();
        let body = self.document.body();
        let mut current = Some(node);

        while let Some(el) = current.filter(|&el| el != body) {
            if let Some(raw) = tree.get_attribute(el, ID_ATTRIBUTE).filter(|raw| !raw.is_empty()) {
                return ComponentId::parse(raw).filter(|&id| self.registry.contains(id));
            }
            current = tree.parent_element(el);
        }
        None
    }

    /// Nearest element at or above `node` matching `selector`, stopping before the body
    pub fn closest_selector(&mut self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selectors = parse_selector(selector)?;
        Ok(self.closest_compiled(node, &selectors))
    }

    pub(crate) fn closest_compiled(&mut self, node: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        let body = self.document.body();
        let mut current = Some(node);

        while let Some(el) = current.filter(|&el| el != body) {
            if self.matches_compiled(el, selectors) {
                return Some(el);
            }
            current = self.document.tree().parent_element(el);
        }
        None
    }
}
