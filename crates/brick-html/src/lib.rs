//! brick HTML Parser
//!
//! HTML5 markup loader built on html5ever. Produces `brick-dom` documents,
//! or splices parsed fragments into an existing document.

mod parser;

pub use parser::HtmlParser;

use brick_dom::{Document, DomError};

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("Markup produced an invalid tree: {0}")]
    Dom(#[from] DomError),
}
