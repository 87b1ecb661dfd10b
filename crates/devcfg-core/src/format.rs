//! Content format resolution
//!
//! A format is taken, in order of precedence, from:
//! 1. an explicit caller hint
//! 2. the source file extension (files and rendered templates)
//! 3. the shape of the content itself (raw strings)
//!
//! Shape detection never guesses past its three patterns.

use crate::error::{FormatError, LoadResult, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Format of candidate configuration content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// XML markup
    #[serde(rename = "xml")]
    Structured,
    /// Curly-brace text
    Text,
    /// Line-oriented `set`/`delete` commands
    Set,
}

impl ContentFormat {
    /// Name used for the `format` attribute on the wire
    #[inline]
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Structured => "xml",
            Self::Text => "text",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ContentFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(Self::Structured),
            "text" => Ok(Self::Text),
            "set" => Ok(Self::Set),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

static STRUCTURED_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*<.*>$").expect("structured shape pattern"));

static SET_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(set|delete|replace|rename)\s").expect("set-style shape pattern")
});

static TEXT_OPEN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z:]*\s*\w+\s+\{").expect("text block open pattern"));

static TEXT_CLOSE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*\}\s*$").expect("text block close pattern"));

/// Resolves the [`ContentFormat`] of configuration content
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatResolver;

impl FormatResolver {
    /// Map a file extension onto a format
    ///
    /// # Errors
    /// `FormatError::UnknownExtension` for anything outside
    /// `.xml`, `.conf`, `.text`, `.txt`, `.set`.
    pub fn from_extension(path: impl AsRef<Path>) -> Result<ContentFormat, FormatError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext {
            "xml" => Ok(ContentFormat::Structured),
            "conf" | "text" | "txt" => Ok(ContentFormat::Text),
            "set" => Ok(ContentFormat::Set),
            _ if ext.is_empty() => Err(FormatError::UnknownExtension(String::new())),
            other => Err(FormatError::UnknownExtension(format!(".{other}"))),
        }
    }

    /// Infer a format from the shape of raw text
    ///
    /// Returns `None` when the content matches none of the known shapes; the
    /// caller must then supply the format explicitly.
    #[must_use]
    pub fn from_content_shape(text: &str) -> Option<ContentFormat> {
        if STRUCTURED_SHAPE.is_match(text) {
            Some(ContentFormat::Structured)
        } else if SET_SHAPE.is_match(text) {
            Some(ContentFormat::Set)
        } else if TEXT_OPEN_SHAPE.is_match(text) && TEXT_CLOSE_SHAPE.is_match(text) {
            Some(ContentFormat::Text)
        } else {
            None
        }
    }

    /// Apply the full precedence chain
    ///
    /// An explicit format short-circuits all inference. A path decides by
    /// extension alone; shape detection only runs for pathless content.
    ///
    /// # Errors
    /// - `LoadError::Format` for an unknown extension
    /// - `LoadError::Validation(UnresolvedFormat)` for indeterminate content
    pub fn resolve(
        explicit: Option<ContentFormat>,
        path: Option<&Path>,
        text: &str,
    ) -> LoadResult<ContentFormat> {
        if let Some(format) = explicit {
            return Ok(format);
        }

        match path {
            Some(path) => Ok(Self::from_extension(path)?),
            None => Self::from_content_shape(text)
                .ok_or_else(|| ValidationError::UnresolvedFormat.into()),
        }
    }
}
