//! Error types for configuration sessions
//!
//! Provides the domain error taxonomy for:
//! - Lock and unlock refusals
//! - Candidate load rejections
//! - Commit and commit-check rejections
//! - Ambiguous commit completion (local timeout)
//!
//! Anything the session does not recognize is carried unchanged in
//! [`ConfigError::Rpc`].

use crate::rpc::{ProtocolError, RpcFailure};
use devcfg_core::xml;
use devcfg_core::{ContentParseError, FormatError, LoadError, RpcErrorInfo, ValidationError};
use std::path::PathBuf;
use std::time::Duration;
use xmltree::Element;

/// Diagnostic payload of a domain error
#[derive(Debug, Clone, PartialEq)]
pub struct RpcErrorReport {
    /// Command that was issued, when known
    pub command: Option<String>,
    /// Raw diagnostic document
    pub response: Element,
    /// Parsed sub-errors (empty when none)
    pub errors: Vec<RpcErrorInfo>,
}

impl RpcErrorReport {
    /// Report from a diagnostic document with no known command
    #[must_use]
    pub fn from_response(response: Element) -> Self {
        let errors = xml::rpc_errors(&response);
        Self {
            command: None,
            response,
            errors,
        }
    }

    /// First parsed error message, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.message.as_deref())
    }

    fn describe(&self) -> &str {
        self.message().unwrap_or("no error message")
    }
}

impl From<ProtocolError> for RpcErrorReport {
    fn from(err: ProtocolError) -> Self {
        Self {
            command: err.command,
            response: err.response,
            errors: err.errors,
        }
    }
}

/// Main configuration session error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Exclusive lock could not be obtained
    #[error("lock failed: {}", .0.describe())]
    Lock(RpcErrorReport),

    /// Lock could not be released
    #[error("unlock failed: {}", .0.describe())]
    Unlock(RpcErrorReport),

    /// Commit or commit-check rejected
    #[error("commit failed: {}", .0.describe())]
    Commit(RpcErrorReport),

    /// Candidate content rejected by the device
    #[error("config load failed: {}", .0.describe())]
    ConfigLoad(RpcErrorReport),

    /// Caller arguments rejected locally
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Format could not be derived from an extension
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Structured content failed to parse locally
    #[error(transparent)]
    Content(#[from] ContentParseError),

    /// Commit reply did not arrive in time; the commit may or may not have applied
    #[error("commit outcome unknown: no reply within {}", display_wait(.waited))]
    AmbiguousCompletion {
        /// Wait bound that was exceeded, if known
        waited: Option<Duration>,
    },

    /// No load source supplied
    #[error("unhandled load request: no content, path or template given")]
    UnhandledLoadRequest,

    /// Reply lacked an element the operation depends on
    #[error("malformed reply: missing <{0}>")]
    MalformedResponse(String),

    /// Local file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Diff could not be written to the caller's output
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// Template could not be loaded or rendered
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Remote failure of a shape not translated for this operation
    #[error(transparent)]
    Rpc(#[from] RpcFailure),
}

impl ConfigError {
    /// Check if this is one of the four device-reported domain errors
    #[inline]
    #[must_use]
    pub fn is_domain(&self) -> bool {
        self.report().is_some()
    }

    /// Diagnostic payload of a domain error
    #[must_use]
    pub fn report(&self) -> Option<&RpcErrorReport> {
        match self {
            Self::Lock(report)
            | Self::Unlock(report)
            | Self::Commit(report)
            | Self::ConfigLoad(report) => Some(report),
            _ => None,
        }
    }

    /// Check if the error was raised before any remote call
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Format(_)
                | Self::Content(_)
                | Self::UnhandledLoadRequest
                | Self::Io { .. }
                | Self::Template(_)
        )
    }

    /// Create I/O error
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LoadError> for ConfigError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Validation(e) => Self::Validation(e),
            LoadError::Format(e) => Self::Format(e),
            LoadError::Content(e) => Self::Content(e),
        }
    }
}

fn display_wait(waited: &Option<Duration>) -> String {
    waited.map_or_else(
        || "the transport timeout".to_string(),
        |d| format!("{}s", d.as_secs()),
    )
}

/// Template loading and rendering errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template at the given path
    #[error("template not found: {0}")]
    NotFound(PathBuf),

    /// A template path was given but the session has no loader
    #[error("no template loader configured for {0}")]
    NoLoader(PathBuf),

    /// Rendering failed
    #[error("failed to render template {name}: {message}")]
    Render {
        /// Template file name
        name: String,
        /// Engine-reported reason
        message: String,
    },
}

/// Result type alias for session operations
pub type ConfigResult<T> = Result<T, ConfigError>;
