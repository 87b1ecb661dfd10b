//! Error types for local request construction
//!
//! Everything here is raised client-side, before any remote call:
//! - Validation of caller arguments (rollback ids, load flags, formats)
//! - File-extension format resolution
//! - Parsing of structured (XML) content

use crate::format::ContentFormat;
use crate::rollback::RollbackId;

/// Caller arguments rejected before reaching the device
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Rollback id outside the device's retained history
    #[error("invalid rollback #{0}: must be between 0 and {max}", max = RollbackId::MAX)]
    InvalidRollbackId(i64),

    /// Rescue action name not recognized
    #[error("unsupported action: {0}")]
    UnsupportedRescueAction(String),

    /// Load flags that cannot be combined
    #[error("conflicting args: cannot use set-style with overwrite")]
    ConflictingArgs,

    /// Content shape matched none of the known formats
    #[error(
        "not able to resolve the config format: you must define the format of the contents \
         explicitly (e.g. format = set)"
    )]
    UnresolvedFormat,

    /// Structured document paired with a non-structured format
    #[error("structured document content cannot be loaded as '{0}'")]
    FormatMismatch(ContentFormat),

    /// More than one load source supplied
    #[error("conflicting load sources: {0}")]
    ConflictingSources(String),

    /// Confirm window the device would reject
    #[error("invalid confirm timeout: {0} minutes (must be at least 1)")]
    InvalidConfirmTimeout(u32),

    /// Content exceeds the configured size limit
    #[error("content too large: {size} bytes (max: {max})")]
    ContentTooLarge {
        /// Size of the rejected content
        size: usize,
        /// Configured limit
        max: usize,
    },
}

/// File-extension format resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Extension missing from the fixed extension table
    #[error("unknown file contents from extension: '{0}'")]
    UnknownExtension(String),

    /// Format name not recognized
    #[error("unknown content format: '{0}'")]
    UnknownFormat(String),
}

/// Structured content that is not a well-formed document
#[derive(Debug, thiserror::Error)]
#[error("failed to parse structured content: {source}")]
pub struct ContentParseError {
    #[source]
    source: xmltree::ParseError,
}

impl ContentParseError {
    pub(crate) fn new(source: xmltree::ParseError) -> Self {
        Self { source }
    }
}

/// Failures while turning caller input into a [`LoadRequest`](crate::LoadRequest)
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Invalid caller arguments
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Format could not be derived from a file extension
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Structured content failed to parse
    #[error(transparent)]
    Content(#[from] ContentParseError),
}

/// Result type alias for request construction
pub type LoadResult<T> = Result<T, LoadError>;
