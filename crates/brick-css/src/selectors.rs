//! Selector Model and Matching
//!
//! Complex selectors are matched right-to-left: the rightmost compound is
//! tested against the element, then combinators walk to parents or previous
//! siblings.

use brick_dom::{DomTree, Node, NodeData, NodeId};

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
    pub(crate) source: String,
}

impl SelectorList {
    /// Original selector text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check if `node` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

impl std::fmt::Display for SelectorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Compound selectors joined by combinators, left to right.
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Check if `node` matches this selector
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_from(tree, n - 1, node),
        }
    }

    fn matches_from(&self, tree: &DomTree, index: usize, node: NodeId) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match self.combinators[next] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|p| self.matches_from(tree, next, p)),
            Combinator::Descendant => tree
                .ancestors(node)
                .filter(|&a| tree.is_element(a))
                .any(|a| self.matches_from(tree, next, a)),
            Combinator::NextSibling => tree
                .previous_element_sibling(node)
                .is_some_and(|s| self.matches_from(tree, next, s)),
            Combinator::SubsequentSibling => {
                let mut sibling = tree.previous_element_sibling(node);
                while let Some(s) = sibling {
                    if self.matches_from(tree, next, s) {
                        return true;
                    }
                    sibling = tree.previous_element_sibling(s);
                }
                false
            }
        }
    }
}

/// Sequence of simple selectors applying to one element
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Check every component against `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.components.iter().all(|c| c.matches(tree, node))
    }
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :first-child, :nth-child(), etc.
    PseudoClass(PseudoClass),
}

impl SelectorComponent {
    /// Match a selector component against an element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        match self {
            Self::Universal => true,
            Self::Type(tag) => element.tag_name.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
            Self::PseudoClass(pseudo) => pseudo.matches(tree, node),
        }
    }
}

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    Not(Box<CompoundSelector>),
}

impl PseudoClass {
    /// Match a pseudo-class against an element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self {
            Self::Root => tree.parent(node).and_then(|p| tree.get(p)).is_some_and(Node::is_document),
            Self::Empty => !tree.children(node).any(|(_, child)| {
                matches!(child.data, NodeData::Element(_) | NodeData::Text(_))
            }),
            Self::FirstChild => tree.previous_element_sibling(node).is_none(),
            Self::LastChild => tree.next_element_sibling(node).is_none(),
            Self::OnlyChild => {
                tree.previous_element_sibling(node).is_none()
                    && tree.next_element_sibling(node).is_none()
            }
            Self::NthChild(expr) => expr.matches(sibling_index(tree, node, false)),
            Self::NthLastChild(expr) => expr.matches(sibling_index(tree, node, true)),
            Self::Not(compound) => !compound.matches(tree, node),
        }
    }
}

/// 1-based position among element siblings
fn sibling_index(tree: &DomTree, node: NodeId, from_end: bool) -> i32 {
    let mut index = 1;
    let mut current = node;
    loop {
        let sibling = if from_end {
            tree.next_element_sibling(current)
        } else {
            tree.previous_element_sibling(current)
        };
        match sibling {
            Some(s) => {
                index += 1;
                current = s;
            }
            None => return index,
        }
    }
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let s = s.replace(' ', "");
        let n_pos = s.find('n')?;

        let a_str = &s[..n_pos];
        let a = match a_str {
            "" | "+" => 1,
            "-" => -1,
            _ => a_str.parse().ok()?,
        };

        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() { 0 } else { rest.parse().ok()? };

        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        // Widened so extreme coefficients cannot overflow
        let (a, b, n) = (i64::from(self.a), i64::from(self.b), i64::from(n));
        if a == 0 {
            return n == b;
        }

        let diff = n - b;
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, value) = match (&self.matcher, value) {
            (_, None) => return false,
            (None, Some(_)) => return true,
            (Some(matcher), Some(value)) => (matcher, value),
        };

        let fold = |s: &str| if self.case_insensitive { s.to_lowercase() } else { s.to_string() };
        let val = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_expression_odd() {
        let expr = NthExpression::odd();
        assert!(expr.matches(1));
        assert!(!expr.matches(2));
        assert!(expr.matches(3));
        assert!(!expr.matches(4));
        assert!(expr.matches(5));
    }

    #[test]
    fn test_nth_expression_even() {
        let expr = NthExpression::even();
        assert!(!expr.matches(1));
        assert!(expr.matches(2));
        assert!(!expr.matches(3));
        assert!(expr.matches(4));
    }

    #[test]
    fn test_nth_expression_parse() {
        assert_eq!(NthExpression::parse("odd"), Some(NthExpression::odd()));
        assert_eq!(NthExpression::parse("even"), Some(NthExpression::even()));
        assert_eq!(NthExpression::parse("3"), Some(NthExpression::index(3)));
        assert_eq!(NthExpression::parse("2n"), Some(NthExpression::new(2, 0)));
        assert_eq!(NthExpression::parse("2n+1"), Some(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("-n+3"), Some(NthExpression::new(-1, 3)));
        assert_eq!(NthExpression::parse("banana"), None);
    }

    #[test]
    fn test_nth_expression_extreme_coefficients() {
        let expr = NthExpression::parse("n-2147483648").unwrap();
        assert_eq!(expr, NthExpression::new(1, i32::MIN));
        assert!(expr.matches(1));
        assert!(expr.matches(i32::MAX));

        // n - b lands exactly on i32::MIN with a = -1
        let expr = NthExpression::new(-1, i32::MAX);
        assert!(expr.matches(-1));
        assert!(expr.matches(1));

        let expr = NthExpression::new(i32::MIN, i32::MAX);
        assert!(expr.matches(i32::MAX));
        assert!(!expr.matches(1));
        assert!(!NthExpression::index(i32::MIN).matches(i32::MAX));
    }

    #[test]
    fn test_attribute_selector_exact() {
        let sel = AttributeSelector {
            name: "type".to_string(),
            matcher: Some(AttributeMatcher::Exact("text".to_string())),
            case_insensitive: false,
        };

        assert!(sel.matches(Some("text")));
        assert!(!sel.matches(Some("TEXT")));
        assert!(!sel.matches(Some("password")));
        assert!(!sel.matches(None));
    }

    #[test]
    fn test_attribute_selector_case_insensitive() {
        let sel = AttributeSelector {
            name: "type".to_string(),
            matcher: Some(AttributeMatcher::Prefix("Sub".to_string())),
            case_insensitive: true,
        };
        assert!(sel.matches(Some("SUBMIT")));
        assert!(!sel.matches(Some("reset")));
    }

    #[test]
    fn test_attribute_selector_prefix() {
        let sel = AttributeSelector {
            name: "class".to_string(),
            matcher: Some(AttributeMatcher::Prefix("btn-".to_string())),
            case_insensitive: false,
        };

        assert!(sel.matches(Some("btn-primary")));
        assert!(sel.matches(Some("btn-secondary")));
        assert!(!sel.matches(Some("button")));
    }

    #[test]
    fn test_empty_substring_never_matches() {
        let sel = AttributeSelector {
            name: "title".to_string(),
            matcher: Some(AttributeMatcher::Substring(String::new())),
            case_insensitive: false,
        };
        assert!(!sel.matches(Some("anything")));
    }

    #[test]
    fn test_dash_match() {
        let sel = AttributeSelector {
            name: "lang".to_string(),
            matcher: Some(AttributeMatcher::DashMatch("en".to_string())),
            case_insensitive: false,
        };
        assert!(sel.matches(Some("en")));
        assert!(sel.matches(Some("en-GB")));
        assert!(!sel.matches(Some("english")));
    }
}
