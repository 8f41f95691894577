//! brick CSS Selectors
//!
//! Selector parsing and matching against a `brick-dom` tree. Covers the
//! selector forms components use for event delegation and discovery:
//! type, class, id, attribute and structural pseudo-class selectors
//! joined by combinators and grouped into lists.

mod parser;
mod selectors;
mod query;

pub use parser::SelectorParser;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};
pub use query::{query_selector, query_selector_all};

/// Parse a selector list such as `ul > li.item, [data-role=button]`
pub fn parse_selector(input: &str) -> Result<SelectorList, SelectorError> {
    SelectorParser::new(input).parse()
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    #[error("Unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),

    #[error("Invalid nth expression {0:?}")]
    InvalidNth(String),
}
