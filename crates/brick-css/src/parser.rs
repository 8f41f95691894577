//! Selector Parser
//!
//! Hand-written recursive descent over the selector text. Positions in
//! errors are character offsets into the original input.

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};
use crate::SelectorError;

/// Selector parser
pub struct SelectorParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// Parse a comma-separated selector list
    pub fn parse(mut self) -> Result<SelectorList, SelectorError> {
        if self.source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(ch) => return Err(self.unexpected(ch)),
            }
        }

        tracing::trace!("Parsed selector {:?} into {} alternatives", self.source, selectors.len());
        Ok(SelectorList {
            selectors,
            source: self.source.trim().to_string(),
        })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(ch) => return Err(self.unexpected(ch)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                components.push(SelectorComponent::Universal);
            }
            Some(ch) if is_ident_start(ch) => {
                let tag = self.parse_ident()?;
                components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(ch) => self.unexpected(ch),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector { components })
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(ch @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                self.expect('=')?;
                ch
            }
            Some(ch) => return Err(self.unexpected(ch)),
            None => return Err(SelectorError::UnexpectedEnd),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(quote)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.pos += 1;
                case_insensitive = true;
                self.skip_whitespace();
            }
            Some('s' | 'S') => {
                self.pos += 1;
                self.skip_whitespace();
            }
            _ => {}
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            // Pseudo-elements never match a real element
            self.pos += 1;
            let name = self.parse_ident()?;
            return Err(SelectorError::UnsupportedPseudo(format!(":{}", name)));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "nth-child" | "nth-last-child" => {
                self.expect('(')?;
                let raw = self.take_until(')')?;
                let expr = NthExpression::parse(&raw).ok_or(SelectorError::InvalidNth(raw))?;
                if name == "nth-child" {
                    PseudoClass::NthChild(expr)
                } else {
                    PseudoClass::NthLastChild(expr)
                }
            }
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.parse_compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                PseudoClass::Not(Box::new(inner))
            }
            _ => return Err(SelectorError::UnsupportedPseudo(name)),
        };
        Ok(pseudo)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(SelectorError::UnexpectedEnd),
                }
            } else if is_ident_char(ch) {
                ident.push(ch);
            } else {
                break;
            }
            self.pos += 1;
        }

        if ident.is_empty() {
            return Err(match self.peek() {
                Some(ch) => self.unexpected(ch),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(ch) if ch == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(ch) => {
                    value.push(ch);
                    self.pos += 1;
                }
            }
        }
    }

    fn take_until(&mut self, end: char) -> Result<String, SelectorError> {
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(ch) if ch == end => {
                    self.pos += 1;
                    return Ok(raw);
                }
                Some(ch) => {
                    raw.push(ch);
                    self.pos += 1;
                }
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// Skip whitespace; returns whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar { ch, pos: self.pos }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}
