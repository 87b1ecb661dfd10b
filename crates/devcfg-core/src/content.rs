//! Candidate configuration content

use xmltree::Element;

/// Configuration content as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigContent {
    /// Raw text in any of the supported formats
    Text(String),
    /// A pre-structured XML document
    Document(Element),
}

impl ConfigContent {
    /// Raw text, if this is textual content
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Document(_) => None,
        }
    }

    /// Structured document, if already parsed
    #[inline]
    #[must_use]
    pub fn as_document(&self) -> Option<&Element> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Text(_) => None,
        }
    }

    /// Byte length of textual content (documents report zero)
    #[inline]
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.as_text().map_or(0, str::len)
    }
}

impl From<String> for ConfigContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ConfigContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Element> for ConfigContent {
    fn from(doc: Element) -> Self {
        Self::Document(doc)
    }
}
