//! Load request construction
//!
//! [`LoadRequestBuilder`] turns caller content plus load-time flags into an
//! immutable [`LoadRequest`]. It is a pure function of its inputs: nothing is
//! sent anywhere, and every rejection happens here, synchronously.
//!
//! # Action selection
//!
//! ```text
//! set-style + overwrite  -> error
//! set-style              -> Set      (wire format downgraded to text)
//! overwrite              -> Override
//! merge                  -> Merge    (no action marker on the wire)
//! otherwise              -> Replace
//! ```

use crate::content::ConfigContent;
use crate::error::{LoadResult, ValidationError};
use crate::format::{ContentFormat, FormatResolver};
use crate::xml;
use std::fmt;

/// How the device applies loaded content to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadAction {
    /// Replace matching hierarchies (device `replace`)
    Replace,
    /// Replace the whole candidate (device `override`)
    Override,
    /// Merge into the candidate; the device default, sent as no marker
    Merge,
    /// Execute set-style commands
    Set,
}

impl LoadAction {
    /// Value of the `action` attribute, `None` when the marker is omitted
    #[inline]
    #[must_use]
    pub const fn action_marker(self) -> Option<&'static str> {
        match self {
            Self::Replace => Some("replace"),
            Self::Override => Some("override"),
            Self::Merge => None,
            Self::Set => Some("set"),
        }
    }
}

impl fmt::Display for LoadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Replace => "replace",
            Self::Override => "override",
            Self::Merge => "merge",
            Self::Set => "set",
        })
    }
}

/// Validated load request, ready for transmission
///
/// # Invariants
///
/// 1. `format` is the wire format: never [`ContentFormat::Set`]
/// 2. `action` is never `Override` for set-style content
/// 3. Structured requests always carry a parsed document
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    content: ConfigContent,
    format: ContentFormat,
    action: LoadAction,
}

impl LoadRequest {
    /// Content to transmit
    #[inline]
    #[must_use]
    pub fn content(&self) -> &ConfigContent {
        &self.content
    }

    /// Wire format (`xml` or `text`)
    #[inline]
    #[must_use]
    pub fn format(&self) -> ContentFormat {
        self.format
    }

    /// Selected load action
    #[inline]
    #[must_use]
    pub fn action(&self) -> LoadAction {
        self.action
    }

    /// Action attribute to send, `None` for merge
    #[inline]
    #[must_use]
    pub fn action_marker(&self) -> Option<&'static str> {
        self.action.action_marker()
    }

    /// Consume the request, yielding its content
    #[inline]
    #[must_use]
    pub fn into_content(self) -> ConfigContent {
        self.content
    }
}

/// Builder for [`LoadRequest`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadRequestBuilder {
    format: Option<ContentFormat>,
    overwrite: bool,
    merge: bool,
}

impl LoadRequestBuilder {
    /// Builder with no format hint and the default `replace` action
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit content format (skips all inference)
    #[inline]
    #[must_use]
    pub fn format(mut self, format: ContentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Optional format hint
    #[inline]
    #[must_use]
    pub fn format_hint(mut self, format: Option<ContentFormat>) -> Self {
        self.format = format;
        self
    }

    /// Replace the entire candidate configuration
    #[inline]
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Merge into the candidate instead of replacing
    #[inline]
    #[must_use]
    pub fn merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Build a validated request
    ///
    /// # Errors
    /// - `ValidationError::UnresolvedFormat` if no hint is given and the
    ///   content shape is indeterminate
    /// - `ValidationError::FormatMismatch` for a document with a non-structured hint
    /// - `ValidationError::ConflictingArgs` for set-style with `overwrite`
    /// - `LoadError::Content` if structured text fails to parse
    pub fn build(&self, content: impl Into<ConfigContent>) -> LoadResult<LoadRequest> {
        let content = content.into();

        let resolved = match (self.format, &content) {
            (None | Some(ContentFormat::Structured), ConfigContent::Document(_)) => {
                ContentFormat::Structured
            }
            (Some(other), ConfigContent::Document(_)) => {
                return Err(ValidationError::FormatMismatch(other).into());
            }
            (format, ConfigContent::Text(text)) => FormatResolver::resolve(format, None, text)?,
        };

        if self.overwrite && resolved == ContentFormat::Set {
            return Err(ValidationError::ConflictingArgs.into());
        }

        let (format, action) = match resolved {
            ContentFormat::Set => (ContentFormat::Text, LoadAction::Set),
            other if self.overwrite => (other, LoadAction::Override),
            other if self.merge => (other, LoadAction::Merge),
            other => (other, LoadAction::Replace),
        };

        let content = match (format, content) {
            (ContentFormat::Structured, ConfigContent::Text(text)) => {
                ConfigContent::Document(xml::parse_document(&text)?)
            }
            (_, content) => content,
        };

        tracing::debug!(%format, %action, "built load request");

        Ok(LoadRequest {
            content,
            format,
            action,
        })
    }
}
