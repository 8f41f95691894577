//! Component types
//!
//! A component type is a capability bundle merged onto the shared component
//! behavior: a tag name, ordered event bindings, a table of named methods,
//! optional `init`/`render` hooks and a factory for the per-instance state.
//!
//! Types are generic over their state while being built and are erased into
//! a [`ComponentClass`] when registered, so one registry can hold them all.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use brick_css::{parse_selector, SelectorList};
use brick_dom::{Event, NodeId};
use serde::{Deserialize, Serialize};

use crate::component::Context;
use crate::{ComponentError, Result};

/// Tag used for elements created without an explicit tag name
pub const DEFAULT_TAG: &str = "div";

type Method<S> = Box<dyn Fn(&mut S, &mut Context<'_>, &mut Event, Option<NodeId>)>;
type Hook<S> = Box<dyn Fn(&mut S, &mut Context<'_>)>;

type ErasedMethod = Box<dyn Fn(&mut dyn Any, &mut Context<'_>, &mut Event, Option<NodeId>)>;
type ErasedHook = Box<dyn Fn(&mut dyn Any, &mut Context<'_>)>;
type StateFactory = Box<dyn Fn() -> Box<dyn Any>>;

/// Declarative event binding: `(event type, optional selector, method name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub method: String,
}

impl EventBinding {
    /// Bind `event` on the component root to `method`
    pub fn new(event: &str, method: &str) -> Self {
        Self {
            event: event.to_string(),
            selector: None,
            method: method.to_string(),
        }
    }

    /// Restrict the binding to targets inside an element matching `selector`
    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_string());
        self
    }
}

/// Declarative half of a component type, authored as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeManifest {
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag_name: String,
    #[serde(default)]
    pub events: Vec<EventBinding>,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl TypeManifest {
    /// Load a manifest from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Component type under construction
pub struct ComponentType<S> {
    name: String,
    tag_name: String,
    events: Vec<EventBinding>,
    methods: HashMap<String, Method<S>>,
    init: Option<Hook<S>>,
    render: Option<Hook<S>>,
    state: Box<dyn Fn() -> S>,
}

impl<S: Default + 'static> ComponentType<S> {
    /// New type whose instances start from `S::default()`
    pub fn new(name: &str) -> Self {
        Self::with_state(name, S::default)
    }

    /// New type from a manifest; methods still have to be supplied
    pub fn from_manifest(manifest: TypeManifest) -> Self {
        let mut ty = Self::new(&manifest.name).tag_name(&manifest.tag_name);
        ty.events = manifest.events;
        ty
    }
}

impl<S: 'static> ComponentType<S> {
    /// New type whose instances start from `state()`
    pub fn with_state(name: &str, state: impl Fn() -> S + 'static) -> Self {
        Self {
            name: name.to_string(),
            tag_name: DEFAULT_TAG.to_string(),
            events: Vec::new(),
            methods: HashMap::new(),
            init: None,
            render: None,
            state: Box::new(state),
        }
    }

    /// Tag used when the component creates its own element
    pub fn tag_name(mut self, tag_name: &str) -> Self {
        self.tag_name = tag_name.to_ascii_lowercase();
        self
    }

    /// Bind `event` anywhere inside the component to `method`
    pub fn on(self, event: &str, method: &str) -> Self {
        self.binding(EventBinding::new(event, method))
    }

    /// Bind `event` inside elements matching `selector` to `method`
    pub fn on_selector(self, event: &str, selector: &str, method: &str) -> Self {
        self.binding(EventBinding::new(event, method).with_selector(selector))
    }

    /// Append an event binding; bindings fire in the order they were added
    pub fn binding(mut self, binding: EventBinding) -> Self {
        self.events.push(binding);
        self
    }

    /// Add a named method. The last argument is the element a selector
    /// binding matched, `None` for bindings without a selector.
    pub fn method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&mut S, &mut Context<'_>, &mut Event, Option<NodeId>) + 'static,
    {
        self.methods.insert(name.to_string(), Box::new(method));
        self
    }

    /// Hook run once per instance before it is registered
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut S, &mut Context<'_>) + 'static,
    {
        self.init = Some(Box::new(hook));
        self
    }

    /// Hook run by `render()`; without one, rendering does nothing
    pub fn render<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut S, &mut Context<'_>) + 'static,
    {
        self.render = Some(Box::new(hook));
        self
    }

    /// Name the type will be registered under by default
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event bindings in declaration order
    pub fn events(&self) -> &[EventBinding] {
        &self.events
    }

    /// Validate and erase the type under `name`
    pub(crate) fn into_definition(self, name: String) -> Result<Definition> {
        let mut bindings = Vec::with_capacity(self.events.len());
        for binding in self.events {
            if !self.methods.contains_key(&binding.method) {
                return Err(ComponentError::UnknownMethod {
                    component: name,
                    method: binding.method,
                });
            }
            let selector = match &binding.selector {
                Some(source) => Some(parse_selector(source).map_err(|source_err| {
                    ComponentError::InvalidSelector {
                        component: name.clone(),
                        selector: source.clone(),
                        source: source_err,
                    }
                })?),
                None => None,
            };
            bindings.push(CompiledBinding { binding, selector });
        }

        let methods = self
            .methods
            .into_iter()
            .map(|(method_name, method)| {
                let erased: ErasedMethod = Box::new(move |state, cx, event, matched| {
                    if let Some(state) = state.downcast_mut::<S>() {
                        method(state, cx, event, matched);
                    }
                });
                (method_name, erased)
            })
            .collect();

        let state = self.state;
        Ok(Definition {
            name,
            tag_name: self.tag_name,
            bindings,
            methods,
            init: self.init.map(erase_hook),
            render: self.render.map(erase_hook),
            state: Box::new(move || Box::new(state()) as Box<dyn Any>),
        })
    }
}

fn erase_hook<S: 'static>(hook: Hook<S>) -> ErasedHook {
    Box::new(move |state, cx| {
        if let Some(state) = state.downcast_mut::<S>() {
            hook(state, cx);
        }
    })
}

impl<S> fmt::Debug for ComponentType<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("tag_name", &self.tag_name)
            .field("events", &self.events)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Event binding with its selector compiled
pub(crate) struct CompiledBinding {
    pub(crate) binding: EventBinding,
    pub(crate) selector: Option<SelectorList>,
}

/// Registered, type-erased component type
pub(crate) struct Definition {
    name: String,
    tag_name: String,
    bindings: Vec<CompiledBinding>,
    methods: HashMap<String, ErasedMethod>,
    init: Option<ErasedHook>,
    render: Option<ErasedHook>,
    state: StateFactory,
}

/// Handle to a registered component type, used to construct instances
#[derive(Clone)]
pub struct ComponentClass(Rc<Definition>);

impl ComponentClass {
    /// Registered name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Tag used when constructing without an element
    pub fn tag_name(&self) -> &str {
        &self.0.tag_name
    }

    /// Event bindings in declaration order
    pub fn events(&self) -> impl Iterator<Item = &EventBinding> {
        self.0.bindings.iter().map(|b| &b.binding)
    }

    /// Check if the type defines `method`
    pub fn has_method(&self, method: &str) -> bool {
        self.0.methods.contains_key(method)
    }

    pub(crate) fn bindings(&self) -> &[CompiledBinding] {
        &self.0.bindings
    }

    pub(crate) fn new_state(&self) -> Box<dyn Any> {
        (self.0.state)()
    }

    pub(crate) fn run_init(&self, state: &mut dyn Any, cx: &mut Context<'_>) {
        if let Some(init) = &self.0.init {
            init(state, cx);
        }
    }

    pub(crate) fn run_render(&self, state: &mut dyn Any, cx: &mut Context<'_>) {
        if let Some(render) = &self.0.render {
            render(state, cx);
        }
    }

    /// Invoke `method`; returns `false` if the type has no such method
    pub(crate) fn call(
        &self,
        method: &str,
        state: &mut dyn Any,
        cx: &mut Context<'_>,
        event: &mut Event,
        matched: Option<NodeId>,
    ) -> bool {
        match self.0.methods.get(method) {
            Some(method) => {
                method(state, cx, event, matched);
                true
            }
            None => false,
        }
    }

    /// Check if two handles refer to the same registration
    pub fn ptr_eq(&self, other: &ComponentClass) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.0.name)
            .field("tag_name", &self.0.tag_name)
            .field("events", &self.events().collect::<Vec<_>>())
            .finish()
    }
}

/// Registered component types by name
#[derive(Default)]
pub(crate) struct TypeRegistry {
    types: HashMap<String, ComponentClass>,
}

impl TypeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `ty` under `name`
    pub(crate) fn define<S: 'static>(&mut self, name: &str, ty: ComponentType<S>) -> Result<ComponentClass> {
        if name.is_empty() {
            return Err(ComponentError::InvalidName);
        }
        if self.types.contains_key(name) {
            return Err(ComponentError::DuplicateType(name.to_string()));
        }

        let class = ComponentClass(Rc::new(ty.into_definition(name.to_string())?));
        self.types.insert(name.to_string(), class.clone());
        Ok(class)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ComponentClass> {
        self.types.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop<S>(_: &mut S, _: &mut Context<'_>, _: &mut Event, _: Option<NodeId>) {}

    #[test]
    fn test_define_and_lookup() {
        let mut registry = TypeRegistry::new();
        let ty = ComponentType::<u32>::new("counter").on("click", "on_click").method("on_click", noop);

        let class = registry.define("counter", ty).unwrap();
        assert_eq!(class.name(), "counter");
        assert_eq!(class.tag_name(), DEFAULT_TAG);
        assert!(class.has_method("on_click"));
        assert!(!class.has_method("on_hover"));
        assert!(registry.contains("counter"));
        assert!(registry.get("counter").unwrap().ptr_eq(&class));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = TypeRegistry::new();
        registry.define("a", ComponentType::<()>::new("a")).unwrap();

        let err = registry.define("a", ComponentType::<u8>::new("a")).unwrap_err();
        assert!(matches!(err, ComponentError::DuplicateType(ref n) if n == "a"));
        assert_eq!(err.to_string(), "A component called a already exists");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry.define("", ComponentType::<()>::new("")).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidName));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let mut registry = TypeRegistry::new();
        let ty = ComponentType::<()>::new("broken").on("click", "missing");

        let err = registry.define("broken", ty).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::UnknownMethod { ref component, ref method }
                if component == "broken" && method == "missing"
        ));
        assert!(!registry.contains("broken"));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut registry = TypeRegistry::new();
        let ty = ComponentType::<()>::new("list")
            .on_selector("click", ".item[", "pick")
            .method("pick", noop);

        let err = registry.define("list", ty).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidSelector { ref selector, .. } if selector == ".item["));
    }

    #[test]
    fn test_bindings_keep_declaration_order() {
        let mut registry = TypeRegistry::new();
        let ty = ComponentType::<()>::new("multi")
            .on("click", "first")
            .on_selector("click", "li", "second")
            .on("keyup", "third")
            .method("first", noop)
            .method("second", noop)
            .method("third", noop);

        let class = registry.define("multi", ty).unwrap();
        let methods: Vec<_> = class.events().map(|b| b.method.as_str()).collect();
        assert_eq!(methods, ["first", "second", "third"]);
        assert!(class.bindings()[1].selector.is_some());
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = TypeManifest::from_json(
            r#"{
                "name": "list",
                "tagName": "UL",
                "events": [
                    { "event": "click", "selector": ".item", "method": "onItemClick" },
                    { "event": "keyup", "method": "onKey" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.events[0], EventBinding::new("click", "onItemClick").with_selector(".item"));
        assert_eq!(manifest.events[1].selector, None);

        let ty = ComponentType::<()>::from_manifest(manifest);
        assert_eq!(ty.name(), "list");
        assert_eq!(ty.tag_name, "ul");
        assert_eq!(ty.events().len(), 2);
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest = TypeManifest::from_json(r#"{ "name": "plain" }"#).unwrap();
        assert_eq!(manifest.tag_name, "div");
        assert!(manifest.events.is_empty());
    }

    #[test]
    fn test_state_factory_runs_per_instance() {
        let mut registry = TypeRegistry::new();
        let class = registry
            .define("seeded", ComponentType::with_state("seeded", || vec![1, 2, 3]))
            .unwrap();

        let mut a = class.new_state();
        let b = class.new_state();
        a.downcast_mut::<Vec<i32>>().unwrap().push(4);
        assert_eq!(a.downcast_ref::<Vec<i32>>().unwrap().len(), 4);
        assert_eq!(b.downcast_ref::<Vec<i32>>().unwrap().len(), 3);
    }
}
