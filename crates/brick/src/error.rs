//! Component framework errors

use brick_css::SelectorError;
use brick_dom::{DomError, NodeId};
use brick_html::HtmlError;

use crate::identity::ComponentId;

/// Result alias used throughout the framework
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Component framework error
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("A component called {0} already exists")]
    DuplicateType(String),

    #[error("No component has been registered with name {0}")]
    UnknownType(String),

    #[error("Component name must not be empty")]
    InvalidName,

    #[error("Component {component} binds an event to undefined method {method}")]
    UnknownMethod { component: String, method: String },

    #[error("Component {component} has invalid selector {selector:?}: {source}")]
    InvalidSelector {
        component: String,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Element {element} is already bound to component {owner}")]
    AlreadyBound { element: NodeId, owner: ComponentId },

    #[error("Document has no body element")]
    MissingBody,

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Markup error: {0}")]
    Html(#[from] HtmlError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
