//! A small CSS selector subset.
//!
//! Supported syntax, enough to pick form controls out of a form:
//!
//! - type selectors (`input`, `select`) and the universal selector `*`
//! - `#id`, `.class`, `[attr]`, `[attr=value]`, `[attr="value"]`
//! - pseudo-classes `:disabled`, `:enabled`, `:checked`, `:input`,
//!   `:button` and `:not(<compound>)`
//! - comma-separated selector lists
//!
//! Combinators (descendant, child, sibling) are rejected.
//!
//! # Example
//!
//! ```
//! use oxide_dom::{Document, Dom, ElementBuilder, SelectorList};
//!
//! let mut doc = Document::new();
//! let form = doc.create(ElementBuilder::form());
//! let country = doc.append(form, ElementBuilder::select().required()).unwrap();
//! doc.append(form, ElementBuilder::input().class("novalidate")).unwrap();
//!
//! let selectors = SelectorList::parse("select[required], input:not(.novalidate)").unwrap();
//! assert_eq!(doc.query_all(form, &selectors), vec![country]);
//! ```

use std::fmt;

use crate::element::{Element, Tag};
use crate::error::{DomError, Result};

/// One part of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Tag(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
    Disabled,
    Enabled,
    Checked,
    Input,
    Button,
    Not(Box<Selector>),
}

impl Simple {
    fn matches(&self, el: &Element) -> bool {
        match self {
            Self::Tag(name) => el.tag().name() == name,
            Self::Id(id) => el.html_id() == Some(id.as_str()),
            Self::Class(class) => el.has_class(class),
            Self::HasAttr(name) => el.has_attr(name),
            Self::AttrEquals(name, value) => el.attr(name) == Some(value.as_str()),
            Self::Disabled => el.is_form_control() && el.is_disabled(),
            Self::Enabled => el.is_form_control() && !el.is_disabled(),
            Self::Checked => {
                (el.is_checkable() && el.checked()) || (*el.tag() == Tag::Option && el.selected())
            }
            Self::Input => el.is_form_control(),
            Self::Button => {
                *el.tag() == Tag::Button
                    || (*el.tag() == Tag::Input && el.attr("type") == Some("button"))
            }
            Self::Not(inner) => !inner.matches(el),
        }
    }
}

/// A compound selector: every part must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Simple>,
}

impl Selector {
    /// Parses a single compound selector.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        parser.skip_whitespace();
        let selector = parser.compound()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.error(format!("unexpected {c:?}")));
        }
        Ok(selector)
    }

    /// Returns whether the element matches.
    pub fn matches(&self, el: &Element) -> bool {
        self.parts.iter().all(|part| part.matches(el))
    }
}

/// A comma-separated list of selectors: any may match.
///
/// The empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parses a selector list. Blank input yields the empty list.
    pub fn parse(input: &str) -> Result<Self> {
        let mut selectors = Vec::new();
        if !input.trim().is_empty() {
            let mut parser = Parser::new(input);
            loop {
                parser.skip_whitespace();
                selectors.push(parser.compound()?);
                parser.skip_whitespace();
                match parser.advance() {
                    Some(',') => continue,
                    None => break,
                    Some(c) => {
                        let reason = if c.is_alphanumeric()
                            || matches!(c, '>' | '+' | '~' | '*' | '.' | '#' | '[' | ':')
                        {
                            "combinators are not supported".to_string()
                        } else {
                            format!("unexpected {c:?}")
                        };
                        return Err(parser.error(reason));
                    }
                }
            }
        }
        Ok(Self {
            source: input.trim().to_string(),
            selectors,
        })
    }

    /// Returns whether the list has no selectors.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Returns whether any selector matches the element.
    pub fn matches(&self, el: &Element) -> bool {
        self.selectors.iter().any(|selector| selector.matches(el))
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::Selector {
            selector: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.advance();
        }
        if self.pos == start {
            return Err(self.error(format!("expected identifier at offset {start}")));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn attr_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.advance();
                }
                let value = self.input[start..self.pos].to_string();
                if !self.eat(quote) {
                    return Err(self.error("unterminated string"));
                }
                Ok(value)
            }
            _ => self.ident(),
        }
    }

    fn compound(&mut self) -> Result<Selector> {
        let mut parts = Vec::new();
        let universal = self.eat('*');
        if !universal && self.peek().is_some_and(char::is_alphabetic) {
            parts.push(Simple::Tag(self.ident()?.to_ascii_lowercase()));
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.advance();
                    parts.push(Simple::Id(self.ident()?));
                }
                Some('.') => {
                    self.advance();
                    parts.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.advance();
                    self.skip_whitespace();
                    let name = self.ident()?;
                    self.skip_whitespace();
                    let part = if self.eat('=') {
                        self.skip_whitespace();
                        let value = self.attr_value()?;
                        self.skip_whitespace();
                        Simple::AttrEquals(name, value)
                    } else {
                        Simple::HasAttr(name)
                    };
                    if !self.eat(']') {
                        return Err(self.error("expected ']'"));
                    }
                    parts.push(part);
                }
                Some(':') => {
                    self.advance();
                    parts.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() && !universal {
            return Err(self.error("empty selector"));
        }
        Ok(Selector { parts })
    }

    fn pseudo(&mut self) -> Result<Simple> {
        let name = self.ident()?;
        match name.as_str() {
            "disabled" => Ok(Simple::Disabled),
            "enabled" => Ok(Simple::Enabled),
            "checked" => Ok(Simple::Checked),
            "input" => Ok(Simple::Input),
            "button" => Ok(Simple::Button),
            "not" => {
                if !self.eat('(') {
                    return Err(self.error("expected '(' after :not"));
                }
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(Simple::Not(Box::new(inner)))
            }
            other => Err(self.error(format!("unsupported pseudo-class :{other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementBuilder, ElementId};

    fn el(builder: ElementBuilder) -> Element {
        builder.build(ElementId::from_raw(1), None)
    }

    #[test]
    fn test_type_and_attribute() {
        let s = Selector::parse("input[type=\"radio\"]").unwrap();
        assert!(s.matches(&el(ElementBuilder::radio("a", "1"))));
        assert!(!s.matches(&el(ElementBuilder::input())));
    }

    #[test]
    fn test_id_and_class() {
        let s = Selector::parse("#name.big").unwrap();
        assert!(s.matches(&el(ElementBuilder::input().id("name").class("big"))));
        assert!(!s.matches(&el(ElementBuilder::input().id("name"))));
    }

    #[test]
    fn test_pseudo_classes() {
        let disabled = el(ElementBuilder::input().disabled());
        assert!(Selector::parse(":disabled").unwrap().matches(&disabled));
        assert!(!Selector::parse(":enabled").unwrap().matches(&disabled));
        assert!(Selector::parse(":input:not(:button)")
            .unwrap()
            .matches(&el(ElementBuilder::textarea())));
        assert!(!Selector::parse(":input:not(:button)")
            .unwrap()
            .matches(&el(ElementBuilder::button())));
        assert!(Selector::parse(":checked")
            .unwrap()
            .matches(&el(ElementBuilder::checkbox("t").checked(true))));
    }

    #[test]
    fn test_universal() {
        assert!(Selector::parse("*").unwrap().matches(&el(ElementBuilder::new("div"))));
        assert!(Selector::parse("*.x")
            .unwrap()
            .matches(&el(ElementBuilder::new("div").class("x"))));
    }

    #[test]
    fn test_list() {
        let list = SelectorList::parse("select, textarea").unwrap();
        assert!(list.matches(&el(ElementBuilder::select())));
        assert!(list.matches(&el(ElementBuilder::textarea())));
        assert!(!list.matches(&el(ElementBuilder::input())));
        assert_eq!(list.to_string(), "select, textarea");
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let list = SelectorList::parse("  ").unwrap();
        assert!(list.is_empty());
        assert!(!list.matches(&el(ElementBuilder::input())));
    }

    #[test]
    fn test_errors() {
        assert!(SelectorList::parse("form input").is_err());
        assert!(SelectorList::parse("input,").is_err());
        assert!(SelectorList::parse("[name").is_err());
        assert!(SelectorList::parse(":hover").is_err());
        assert!(SelectorList::parse("[a=\"b]").is_err());
        let err = SelectorList::parse("div > p").unwrap_err();
        assert!(err.to_string().contains("combinators"));
    }
}
