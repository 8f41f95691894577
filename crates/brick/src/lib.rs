//! brick
//!
//! Component framework that binds Rust state to DOM elements. Markup declares
//! components with `data-component-name`; the framework constructs instances,
//! tracks them by id and routes events to their methods through one delegated
//! listener per event type on the body.
//!
//! All state lives in a [`Components`] value, so independent frameworks (and
//! tests) never share a registry.
//!
//! ```no_run
//! use brick::{ComponentType, Components, Config, Event};
//!
//! # fn main() -> brick::Result<()> {
//! let mut components = Components::new(Config::default());
//! let counter = components.register(
//!     ComponentType::<u32>::new("counter")
//!         .on("click", "increment")
//!         .method("increment", |count, _cx, _event, _matched| *count += 1),
//! )?;
//!
//! let id = components.construct(&counter, None)?;
//! let body = components.body();
//! components.append_to(id, body)?;
//! components.bind_events()?;
//!
//! let element = components.element(id).unwrap_or(body);
//! components.dispatch(Event::click(element));
//! assert_eq!(components.state::<u32>(id), Some(&1));
//! # Ok(())
//! # }
//! ```

mod component;
mod config;
mod discovery;
mod dispatch;
mod error;
mod identity;
mod matching;
mod registry;

pub use component::{ComponentMut, Context, IntoTarget, Target};
pub use config::{Config, CAPTURE_FROM, DELEGATED_EVENTS};
pub use error::{ComponentError, Result};
pub use identity::{ComponentId, ID_ATTRIBUTE, NAME_ATTRIBUTE};
pub use matching::MatchStrategy;
pub use registry::{ComponentClass, ComponentType, EventBinding, TypeManifest, DEFAULT_TAG};

pub use brick_dom::{Document, Event, EventPhase, NodeId};

use brick_dom::ListenerId;
use brick_html::HtmlParser;
use tracing::{debug, info};

use identity::Registry;
use registry::TypeRegistry;

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A component framework bound to one document
pub struct Components {
    config: Config,
    document: Document,
    types: TypeRegistry,
    registry: Registry,
    /// Delegated listeners as `(node, listener)`
    delegates: Vec<(NodeId, ListenerId)>,
    events_handled: u64,
    /// Detached container for matching parentless elements
    scratch: NodeId,
}

impl Components {
    /// Create a framework over a blank document
    pub fn new(config: Config) -> Self {
        let document = Document::new(&config.document_url);
        Self::with_document(document, config)
    }

    /// Create a framework over an existing document
    pub fn with_document(mut document: Document, config: Config) -> Self {
        let scratch = document.tree_mut().create_element("div");
        info!("brick {} initialized for {}", VERSION, document.url());
        Self {
            config,
            document,
            types: TypeRegistry::new(),
            registry: Registry::new(),
            delegates: Vec::new(),
            events_handled: 0,
            scratch,
        }
    }

    /// Create a framework over a document parsed from `html`
    pub fn from_html(html: &str, config: Config) -> Result<Self> {
        let document = HtmlParser::new().parse_with_url(html, &config.document_url)?;
        Ok(Self::with_document(document, config))
    }

    /// Register `ty` under its own name
    pub fn register<S: 'static>(&mut self, ty: ComponentType<S>) -> Result<ComponentClass> {
        let name = ty.name().to_string();
        self.register_as(&name, ty)
    }

    /// Register `ty` under `name`, overriding the name it was built with
    pub fn register_as<S: 'static>(&mut self, name: &str, ty: ComponentType<S>) -> Result<ComponentClass> {
        let class = self.types.define(name, ty)?;
        debug!("Registered component type {} ({} bindings)", name, class.events().count());
        Ok(class)
    }

    /// Registered type by name
    pub fn class(&self, name: &str) -> Option<&ComponentClass> {
        self.types.get(name)
    }

    /// Whether a type is registered as `name`
    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    /// Names of all registered types, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.names().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Whether `id` is a live instance
    pub fn contains(&self, id: ComponentId) -> bool {
        self.registry.contains(id)
    }

    /// Live instance ids in construction order
    pub fn ids(&self) -> Vec<ComponentId> {
        self.registry.ids()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Body element of the document
    pub fn body(&self) -> NodeId {
        self.document.body()
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
