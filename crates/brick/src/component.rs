//! Component instances and lifecycle
//!
//! An instance binds one state value to one element. Construction stamps the
//! name and id attributes, runs `init`, then registers the instance; it stays
//! registered until `destroy`, even when its element is detached.

use std::any::Any;

use brick_css::{parse_selector, query_selector_all};
use brick_dom::{Document, DomError, DomTree, NodeId};
use brick_html::HtmlParser;
use tracing::{debug, trace};

use crate::identity::{ComponentId, ID_ATTRIBUTE, NAME_ATTRIBUTE};
use crate::registry::{ComponentClass, EventBinding};
use crate::{ComponentError, Components, Result};

/// A live component
pub(crate) struct Instance {
    pub(crate) id: ComponentId,
    pub(crate) class: ComponentClass,
    pub(crate) element: NodeId,
    pub(crate) state: Box<dyn Any>,
}

/// What hooks and methods see of their component and the document
pub struct Context<'a> {
    document: &'a mut Document,
    id: ComponentId,
    element: NodeId,
}

impl<'a> Context<'a> {
    pub(crate) fn new(document: &'a mut Document, id: ComponentId, element: NodeId) -> Self {
        Self { document, id, element }
    }

    /// Id of the component
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Root element of the component
    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }

    pub fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        self.document.tree_mut()
    }

    /// Attribute of the component's root element
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.document.tree().get_attribute(self.element, name)
    }

    /// Set an attribute on the component's root element
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        Ok(self.document.tree_mut().set_attribute(self.element, name, value)?)
    }

    /// Replace the element's children with a single text node
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let tree = self.document.tree_mut();
        tree.clear_children(self.element);
        let node = tree.create_text(text);
        tree.append_child(self.element, node)?;
        Ok(())
    }

    /// Replace the element's children with parsed markup
    pub fn set_inner_html(&mut self, html: &str) -> Result<Vec<NodeId>> {
        self.document.tree_mut().clear_children(self.element);
        Ok(HtmlParser::new().parse_into(&mut *self.document, self.element, html)?)
    }

    /// Descendants of the element matching `selector`, in document order
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selectors = parse_selector(selector)?;
        Ok(query_selector_all(self.document.tree(), self.element, &selectors))
    }
}

/// Where `append_to` inserts an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The root element of another component
    Component(ComponentId),
    /// Any node that can hold children
    Node(NodeId),
}

impl From<ComponentId> for Target {
    fn from(id: ComponentId) -> Self {
        Target::Component(id)
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

/// Anything `append_to` accepts; `None` appends nowhere
pub trait IntoTarget {
    fn into_target(self) -> Option<Target>;
}

impl IntoTarget for Target {
    fn into_target(self) -> Option<Target> {
        Some(self)
    }
}

impl IntoTarget for ComponentId {
    fn into_target(self) -> Option<Target> {
        Some(Target::Component(self))
    }
}

impl IntoTarget for NodeId {
    fn into_target(self) -> Option<Target> {
        Some(Target::Node(self))
    }
}

impl<T: IntoTarget> IntoTarget for Option<T> {
    fn into_target(self) -> Option<Target> {
        self.and_then(IntoTarget::into_target)
    }
}

impl Components {
    /// Construct an instance of `class`, bound to `element` or to a new
    /// element created from the type's tag name.
    ///
    /// An element already owned by a live instance is rejected with
    /// [`ComponentError::AlreadyBound`]. A stale id attribute left behind by
    /// a destroyed instance is overwritten.
    pub fn construct(&mut self, class: &ComponentClass, element: Option<NodeId>) -> Result<ComponentId> {
        let tree = self.document.tree_mut();
        let element = match element {
            Some(node) if tree.is_element(node) => node,
            Some(node) => return Err(DomError::InvalidNodeType(node).into()),
            None => tree.create_element(class.tag_name()),
        };

        let owner = tree
            .get_attribute(element, ID_ATTRIBUTE)
            .and_then(ComponentId::parse)
            .filter(|&owner| self.registry.contains(owner));
        if let Some(owner) = owner {
            return Err(ComponentError::AlreadyBound { element, owner });
        }

        let id = self.registry.allocate();
        tree.set_attribute(element, NAME_ATTRIBUTE, class.name())?;
        tree.set_attribute(element, ID_ATTRIBUTE, id.to_string())?;

        let mut state = class.new_state();
        let mut cx = Context::new(&mut self.document, id, element);
        class.run_init(state.as_mut(), &mut cx);

        self.registry.insert(Instance {
            id,
            class: class.clone(),
            element,
            state,
        });
        debug!("Constructed {} component {} on {}", class.name(), id, element);
        Ok(id)
    }

    /// Construct an instance of the type registered as `name`
    pub fn construct_named(&mut self, name: &str, element: Option<NodeId>) -> Result<ComponentId> {
        let class = self
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownType(name.to_string()))?;
        self.construct(&class, element)
    }

    /// Chainable handle to a live instance
    pub fn component_mut(&mut self, id: ComponentId) -> Option<ComponentMut<'_>> {
        self.registry
            .contains(id)
            .then_some(ComponentMut { components: self, id })
    }

    /// Run the render hook of `id`; returns `false` for an unknown id
    pub fn render(&mut self, id: ComponentId) -> bool {
        let Some(instance) = self.registry.get_mut(id) else {
            return false;
        };
        let mut cx = Context::new(&mut self.document, id, instance.element);
        instance.class.run_render(instance.state.as_mut(), &mut cx);
        trace!("Rendered component {}", id);
        true
    }

    /// Insert the element of `id` as the last child of `target`.
    ///
    /// Nothing happens when the target is absent, names a component that is
    /// no longer registered, or `id` itself is unknown.
    pub fn append_to(&mut self, id: ComponentId, target: impl IntoTarget) -> Result<()> {
        let Some(element) = self.element(id) else {
            return Ok(());
        };
        let parent = match target.into_target() {
            None => return Ok(()),
            Some(Target::Node(node)) => node,
            Some(Target::Component(other)) => match self.element(other) {
                Some(node) => node,
                None => return Ok(()),
            },
        };
        self.document.tree_mut().append_child(parent, element)?;
        Ok(())
    }

    /// Detach the element of `id` from its parent; the instance stays registered
    pub fn remove(&mut self, id: ComponentId) {
        if let Some(element) = self.element(id) {
            self.document.tree_mut().detach(element);
        }
    }

    /// Detach the element and drop the instance.
    ///
    /// Returns `false` if `id` was not registered, so destroying twice is harmless.
    pub fn destroy(&mut self, id: ComponentId) -> bool {
        self.remove(id);
        match self.registry.remove(id) {
            Some(instance) => {
                debug!("Destroyed {} component {}", instance.class.name(), id);
                true
            }
            None => false,
        }
    }

    /// State of `id`, if it is registered and its state is an `S`
    pub fn state<S: 'static>(&self, id: ComponentId) -> Option<&S> {
        self.registry.get(id)?.state.downcast_ref()
    }

    /// Mutable state of `id`, if it is registered and its state is an `S`
    pub fn state_mut<S: 'static>(&mut self, id: ComponentId) -> Option<&mut S> {
        self.registry.get_mut(id)?.state.downcast_mut()
    }

    /// Root element of `id`
    pub fn element(&self, id: ComponentId) -> Option<NodeId> {
        self.registry.get(id).map(|instance| instance.element)
    }

    /// Type name of `id`
    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.registry.get(id).map(|instance| instance.class.name())
    }

    /// Type of `id`
    pub fn class_of(&self, id: ComponentId) -> Option<&ComponentClass> {
        self.registry.get(id).map(|instance| &instance.class)
    }

    /// Event bindings of `id`, in declaration order
    pub fn events(&self, id: ComponentId) -> Option<impl Iterator<Item = &EventBinding>> {
        self.class_of(id).map(|class| class.events())
    }
}

/// Chainable lifecycle handle to one registered instance
pub struct ComponentMut<'a> {
    components: &'a mut Components,
    id: ComponentId,
}

impl ComponentMut<'_> {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn element(&self) -> Option<NodeId> {
        self.components.element(self.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.components.name(self.id)
    }

    pub fn state<S: 'static>(&self) -> Option<&S> {
        self.components.state(self.id)
    }

    pub fn state_mut<S: 'static>(&mut self) -> Option<&mut S> {
        self.components.state_mut(self.id)
    }

    /// Run the render hook
    pub fn render(&mut self) -> &mut Self {
        self.components.render(self.id);
        self
    }

    /// Insert the element as the last child of `target`
    pub fn append_to(&mut self, target: impl IntoTarget) -> Result<&mut Self> {
        self.components.append_to(self.id, target)?;
        Ok(self)
    }

    /// Detach the element from its parent
    pub fn remove(&mut self) -> &mut Self {
        self.components.remove(self.id);
        self
    }

    /// Destroy the instance, ending the chain
    pub fn destroy(self) {
        self.components.destroy(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, Config};

    fn components() -> Components {
        Components::new(Config::default())
    }

    #[test]
    fn test_construct_creates_element_from_tag() {
        let mut components = components();
        let class = components
            .register(ComponentType::<()>::new("card").tag_name("section"))
            .unwrap();

        let id = components.construct(&class, None).unwrap();
        let element = components.element(id).unwrap();
        let tree = components.document().tree();

        assert_eq!(tree.tag_name(element), Some("section"));
        assert_eq!(tree.get_attribute(element, NAME_ATTRIBUTE), Some("card"));
        assert_eq!(tree.get_attribute(element, ID_ATTRIBUTE), Some("1"));
        assert_eq!(tree.parent(element), None, "New elements start detached");
    }

    #[test]
    fn test_construct_rejects_text_node() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("card")).unwrap();
        let text = components.document_mut().tree_mut().create_text("hi");

        let err = components.construct(&class, Some(text)).unwrap_err();
        assert!(matches!(err, ComponentError::Dom(DomError::InvalidNodeType(_))));
        assert!(components.is_empty());
    }

    #[test]
    fn test_construct_rejects_bound_element() {
        let mut components = components();
        let class = components.register(ComponentType::<u32>::new("card")).unwrap();
        let first = components.construct(&class, None).unwrap();
        let element = components.element(first).unwrap();

        let err = components.construct(&class, Some(element)).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::AlreadyBound { element: e, owner } if e == element && owner == first
        ));
        assert_eq!(components.len(), 1);
        assert_eq!(components.document().tree().get_attribute(element, ID_ATTRIBUTE), Some("1"));
        assert_eq!(components.closest_component(element), Some(first));
    }

    #[test]
    fn test_construct_reuses_element_after_destroy() {
        let mut components = components();
        let class = components.register(ComponentType::<u32>::new("card")).unwrap();
        let first = components.construct(&class, None).unwrap();
        let element = components.element(first).unwrap();
        components.destroy(first);

        assert_eq!(components.document().tree().get_attribute(element, ID_ATTRIBUTE), Some("1"));
        let second = components.construct(&class, Some(element)).unwrap();

        assert_ne!(first, second);
        assert_eq!(components.element(second), Some(element));
        assert_eq!(components.closest_component(element), Some(second));
    }

    #[test]
    fn test_init_runs_before_registration() {
        let mut components = components();
        let class = components
            .register(ComponentType::<String>::new("label").init(|text, cx| {
                text.push_str("ready");
                cx.set_text("Hello").unwrap();
            }))
            .unwrap();

        let id = components.construct(&class, None).unwrap();
        let element = components.element(id).unwrap();

        assert_eq!(components.state::<String>(id).map(String::as_str), Some("ready"));
        assert_eq!(components.document().tree().text_content(element), "Hello");
    }

    #[test]
    fn test_render_default_is_noop() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("plain")).unwrap();
        let id = components.construct(&class, None).unwrap();
        let element = components.element(id).unwrap();

        assert!(components.render(id));
        assert_eq!(components.document().tree().children(element).count(), 0);
    }

    #[test]
    fn test_render_hook_builds_markup() {
        let mut components = components();
        let class = components
            .register(ComponentType::<u32>::with_state("badge", || 3).render(|count, cx| {
                cx.set_inner_html(&format!("<b class=\"count\">{count}</b>")).unwrap();
            }))
            .unwrap();
        let id = components.construct(&class, None).unwrap();

        components.component_mut(id).unwrap().render().render();

        let element = components.element(id).unwrap();
        let tree = components.document().tree();
        assert_eq!(tree.children(element).count(), 1, "Rendering twice replaces markup");
        assert_eq!(tree.text_content(element), "3");
    }

    #[test]
    fn test_append_to_targets() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("box")).unwrap();
        let outer = components.construct(&class, None).unwrap();
        let inner = components.construct(&class, None).unwrap();
        let body = components.body();

        components.append_to(outer, body).unwrap();
        components.append_to(inner, outer).unwrap();
        components.append_to(inner, None::<Target>).unwrap();

        let tree = components.document().tree();
        let outer_el = components.element(outer).unwrap();
        let inner_el = components.element(inner).unwrap();
        assert_eq!(tree.parent(outer_el), Some(body));
        assert_eq!(tree.parent(inner_el), Some(outer_el));
    }

    #[test]
    fn test_append_to_destroyed_component_is_noop() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("box")).unwrap();
        let gone = components.construct(&class, None).unwrap();
        let child = components.construct(&class, None).unwrap();
        components.destroy(gone);

        components.append_to(child, gone).unwrap();
        let child_el = components.element(child).unwrap();
        assert_eq!(components.document().tree().parent(child_el), None);
    }

    #[test]
    fn test_append_into_own_subtree_fails() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("box")).unwrap();
        let id = components.construct(&class, None).unwrap();

        let err = components.append_to(id, id).unwrap_err();
        assert!(matches!(err, ComponentError::Dom(DomError::HierarchyRequest { .. })));
    }

    #[test]
    fn test_remove_keeps_instance_registered() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("box")).unwrap();
        let id = components.construct(&class, None).unwrap();
        let body = components.body();

        components.component_mut(id).unwrap().append_to(body).unwrap().remove().remove();

        let element = components.element(id).unwrap();
        assert_eq!(components.document().tree().parent(element), None);
        assert!(components.contains(id));
    }

    #[test]
    fn test_destroy_twice_is_noop() {
        let mut components = components();
        let class = components.register(ComponentType::<()>::new("box")).unwrap();
        let id = components.construct(&class, None).unwrap();
        let body = components.body();
        components.append_to(id, body).unwrap();
        let element = components.element(id).unwrap();

        assert!(components.destroy(id));
        assert!(!components.destroy(id));
        assert!(!components.contains(id));
        assert!(components.component_mut(id).is_none());
        assert_eq!(components.document().tree().parent(element), None);
    }

    #[test]
    fn test_state_type_mismatch() {
        let mut components = components();
        let class = components.register(ComponentType::<u32>::new("n")).unwrap();
        let id = components.construct(&class, None).unwrap();

        assert_eq!(components.state::<u32>(id), Some(&0));
        assert_eq!(components.state::<i64>(id), None);
        *components.state_mut::<u32>(id).unwrap() = 5;
        assert_eq!(components.component_mut(id).unwrap().state::<u32>(), Some(&5));
    }

    #[test]
    fn test_context_query() {
        let mut components = components();
        let class = components
            .register(ComponentType::<Vec<NodeId>>::new("list").init(|items, cx| {
                cx.set_inner_html("<ul><li class=\"item\">a</li><li>b</li><li class=\"item\">c</li></ul>")
                    .unwrap();
                *items = cx.query(".item").unwrap();
            }))
            .unwrap();
        let id = components.construct(&class, None).unwrap();

        let items = components.state::<Vec<NodeId>>(id).unwrap().clone();
        assert_eq!(items.len(), 2);
        let tree = components.document().tree();
        assert_eq!(tree.text_content(items[0]), "a");
        assert_eq!(tree.text_content(items[1]), "c");
    }
}
