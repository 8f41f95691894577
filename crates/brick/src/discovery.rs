//! Component discovery
//!
//! Binds instances to markup that declares `data-component-name`. Elements
//! already carrying `data-component-id` are looked up, never rebuilt, so
//! discovery can run over the same tree any number of times.

use brick_css::{parse_selector, query_selector_all};
use brick_dom::NodeId;
use tracing::{debug, warn};

use crate::identity::{ComponentId, ID_ATTRIBUTE, NAME_ATTRIBUTE};
use crate::{ComponentError, Components, Result};

impl Components {
    /// Instance bound to `element`, constructing it if the element declares a
    /// component name but has not been bound yet.
    ///
    /// Returns `None` for elements that are not component roots and for ids
    /// with no live instance.
    pub fn from_element(&mut self, element: NodeId) -> Result<Option<ComponentId>> {
        let tree = self.document.tree();
        let Some(name) = tree.get_attribute(element, NAME_ATTRIBUTE).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if let Some(raw) = tree.get_attribute(element, ID_ATTRIBUTE).filter(|raw| !raw.is_empty()) {
            let found = ComponentId::parse(raw).filter(|&id| self.registry.contains(id));
            if found.is_none() {
                warn!("{} carries component id {:?} with no live instance", element, raw);
            }
            return Ok(found);
        }

        let class = self
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownType(name.to_string()))?;
        self.construct(&class, Some(element)).map(Some)
    }

    /// Bind every component root in the subtree of `root` (default: the body),
    /// the root included, in document order.
    ///
    /// Returns the number of instances created. The first unknown component
    /// name aborts the pass; instances created before it stay registered.
    pub fn parse(&mut self, root: Option<NodeId>) -> Result<usize> {
        let root = match root {
            Some(root) => root,
            None if self.document.body().is_valid() => self.document.body(),
            None => return Err(ComponentError::MissingBody),
        };
        let before = self.registry.allocated();

        self.from_element(root)?;

        let selectors = parse_selector(&format!("[{NAME_ATTRIBUTE}]"))?;
        let candidates = query_selector_all(self.document.tree(), root, &selectors);
        for element in candidates {
            self.from_element(element)?;
        }

        let created = (self.registry.allocated() - before) as usize;
        debug!("Parsed {}: {} new components", root, created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, Config};

    fn components(html: &str) -> Components {
        let mut components = Components::from_html(html, Config::default()).unwrap();
        components.register(ComponentType::<()>::new("widget")).unwrap();
        components
    }

    #[test]
    fn test_from_element_without_name() {
        let mut components = components(r#"<div id="plain"></div>"#);
        let plain = components.document().get_element_by_id("plain").unwrap();
        assert_eq!(components.from_element(plain).unwrap(), None);
    }

    #[test]
    fn test_from_element_empty_name() {
        let mut components = components(r#"<div id="w" data-component-name=""></div>"#);
        let w = components.document().get_element_by_id("w").unwrap();
        assert_eq!(components.from_element(w).unwrap(), None);
        assert!(components.is_empty());
    }

    #[test]
    fn test_from_element_is_stable() {
        let mut components = components(r#"<div id="w" data-component-name="widget"></div>"#);
        let w = components.document().get_element_by_id("w").unwrap();

        let first = components.from_element(w).unwrap().unwrap();
        let second = components.from_element(w).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            components.document().tree().get_attribute(w, ID_ATTRIBUTE),
            Some(first.to_string().as_str())
        );
    }

    #[test]
    fn test_from_element_stale_id() {
        let mut components =
            components(r#"<div id="w" data-component-name="widget" data-component-id="42"></div>"#);
        let w = components.document().get_element_by_id("w").unwrap();
        assert_eq!(components.from_element(w).unwrap(), None);
        assert!(components.is_empty(), "Stale ids are not rebound");
    }

    #[test]
    fn test_parse_includes_root() {
        let mut components = components(r#"<section id="root" data-component-name="widget"><p></p></section>"#);
        let root = components.document().get_element_by_id("root").unwrap();
        assert_eq!(components.parse(Some(root)).unwrap(), 1);
    }

    #[test]
    fn test_parse_document_order() {
        let mut components = components(
            r#"
            <div id="a" data-component-name="widget">
                <div id="b" data-component-name="widget"></div>
            </div>
            <div id="c" data-component-name="widget"></div>
            "#,
        );
        assert_eq!(components.parse(None).unwrap(), 3);

        let tree = components.document().tree();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| {
                let el = components.document().get_element_by_id(id).unwrap();
                tree.get_attribute(el, ID_ATTRIBUTE).unwrap().to_string()
            })
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_parse_unknown_aborts() {
        let mut components = components(
            r#"
            <div data-component-name="widget"></div>
            <div data-component-name="missing"></div>
            <div data-component-name="widget"></div>
            "#,
        );
        let err = components.parse(None).unwrap_err();
        assert_eq!(err.to_string(), "No component has been registered with name missing");
        assert_eq!(components.len(), 1);
    }
}
