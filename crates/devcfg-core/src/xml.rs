//! Helpers for structured configuration and reply documents
//!
//! Replies are plain [`Element`] trees. This module knows the handful of
//! reply shapes the session cares about:
//! - `<ok/>` markers that downgrade an error reply to warnings
//! - `<rpc-error>` blocks and their diagnostic fields
//! - namespace decoration added by the transport

use crate::error::ContentParseError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use xml::reader::{EventReader, ParserConfig, XmlEvent};
use xmltree::{Element, ParseError, XMLNode};

/// Parse a structured configuration document
///
/// Whitespace-only text nodes are kept, so `<description>  </description>`
/// and a `"\n\n"` diff survive parsing unchanged.
///
/// # Errors
/// `ContentParseError` if `text` is not well-formed XML.
pub fn parse_document(text: &str) -> Result<Element, ContentParseError> {
    let config = ParserConfig::new()
        .whitespace_to_characters(true)
        .ignore_comments(false);
    let mut reader = EventReader::new_with_config(text.as_bytes(), config);
    let mut open: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let event = reader
            .next()
            .map_err(|err| ContentParseError::new(ParseError::MalformedXml(err)))?;

        match event {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                let mut element = Element::new(&name.local_name);
                element.prefix = name.prefix;
                element.namespace = name.namespace;
                if !namespace.is_essentially_empty() {
                    element.namespaces = Some(namespace);
                }
                element.attributes = attributes
                    .into_iter()
                    .map(|attr| (attr.name.local_name, attr.value))
                    .collect();
                open.push(element);
            }
            XmlEvent::EndElement { .. } => {
                let element = open
                    .pop()
                    .ok_or_else(|| ContentParseError::new(ParseError::CannotParse))?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(XMLNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => return Err(ContentParseError::new(ParseError::CannotParse)),
                }
            }
            XmlEvent::Characters(chars) | XmlEvent::Whitespace(chars) | XmlEvent::CData(chars) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(XMLNode::Text(chars));
                }
            }
            XmlEvent::Comment(comment) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(XMLNode::Comment(comment));
                }
            }
            XmlEvent::EndDocument => {
                return root.ok_or_else(|| ContentParseError::new(ParseError::CannotParse));
            }
            _ => {}
        }
    }
}

/// Remove namespace prefixes and declarations from a whole tree
#[must_use]
pub fn strip_namespaces(mut element: Element) -> Element {
    strip_in_place(&mut element);
    element
}

fn strip_in_place(element: &mut Element) {
    element.prefix = None;
    element.namespace = None;
    element.namespaces = None;

    for node in &mut element.children {
        if let XMLNode::Element(child) = node {
            strip_in_place(child);
        }
    }
}

/// Follow a `/`-separated path of child names
#[must_use]
pub fn find_child<'a>(element: &'a Element, path: &str) -> Option<&'a Element> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(element, |current, name| current.get_child(name))
}

/// Text content at a `/`-separated path
#[must_use]
pub fn find_text(element: &Element, path: &str) -> Option<String> {
    find_child(element, path)?.get_text().map(Cow::into_owned)
}

/// Whether a reply carries a direct `<ok/>` child
#[inline]
#[must_use]
pub fn has_ok_marker(response: &Element) -> bool {
    response.get_child("ok").is_some()
}

/// Parsed fields of a single `<rpc-error>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpcErrorInfo {
    /// `error-severity` (`error` or `warning`)
    pub severity: Option<String>,
    /// `source-daemon`
    pub source: Option<String>,
    /// `error-path`
    pub edit_path: Option<String>,
    /// `error-info/bad-element`
    pub bad_element: Option<String>,
    /// `error-message`
    pub message: Option<String>,
}

impl RpcErrorInfo {
    /// Extract fields from an `<rpc-error>` element
    ///
    /// An `<rpc-reply>` wrapper is looked through to its first child element.
    #[must_use]
    pub fn from_element(element: &Element) -> Self {
        let element = if element.name == "rpc-reply" {
            first_child_element(element).unwrap_or(element)
        } else {
            element
        };

        let field = |path: &str| {
            find_text(element, path)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        };

        Self {
            severity: field("error-severity"),
            source: field("source-daemon"),
            edit_path: field("error-path"),
            bad_element: field("error-info/bad-element"),
            message: field("error-message"),
        }
    }

    /// Whether the device classified this as a warning
    #[inline]
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity.as_deref() == Some("warning")
    }
}

impl fmt::Display for RpcErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = self.severity.as_deref().unwrap_or("error");
        let message = self.message.as_deref().unwrap_or("no message");
        write!(f, "{severity}: {message}")?;
        if let Some(bad) = &self.bad_element {
            write!(f, " (bad element: {bad})")?;
        }
        Ok(())
    }
}

/// Every `<rpc-error>` in a reply
#[must_use]
pub fn rpc_errors(response: &Element) -> Vec<RpcErrorInfo> {
    if response.name == "rpc-error" {
        return vec![RpcErrorInfo::from_element(response)];
    }

    response
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(child) if child.name == "rpc-error" => {
                Some(RpcErrorInfo::from_element(child))
            }
            _ => None,
        })
        .collect()
}

fn first_child_element(element: &Element) -> Option<&Element> {
    element.children.iter().find_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}
