//! Remote procedure boundary
//!
//! [`DeviceRpc`] is implemented by whatever transport talks to the device.
//! Every failure it reports is normalized into [`RpcFailure`] here, once, so
//! the rest of the crate never inspects transport-specific error shapes.

use devcfg_core::xml;
use devcfg_core::{CommitRequest, ContentFormat, LoadRequest, RescueFormat, RollbackId, RpcErrorInfo};
use std::time::Duration;
use xmltree::Element;

/// Arguments of a `get-configuration` comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetConfiguration {
    /// Rollback to compare the candidate against
    pub rollback: RollbackId,
    /// Output format of the comparison
    pub format: ContentFormat,
}

impl GetConfiguration {
    /// Text diff of the candidate against a rollback
    #[inline]
    #[must_use]
    pub fn compare_rollback(rollback: RollbackId) -> Self {
        Self {
            rollback,
            format: ContentFormat::Text,
        }
    }

    /// Value of the `compare` attribute
    #[inline]
    #[must_use]
    pub const fn compare(&self) -> &'static str {
        "rollback"
    }
}

/// What a `load-configuration` call restores into the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadConfiguration {
    /// A rollback from history
    Rollback(RollbackId),
    /// The saved rescue configuration
    Rescue,
}

/// Device-side rejection of a remote call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("rpc error from {}: {}", .command.as_deref().unwrap_or("<unknown>"), summarize(.errors))]
pub struct ProtocolError {
    /// Command that was issued, when the transport knows it
    pub command: Option<String>,
    /// Raw reply document
    pub response: Element,
    /// Parsed `<rpc-error>` entries
    pub errors: Vec<RpcErrorInfo>,
}

impl ProtocolError {
    /// Build from a reply, parsing its `<rpc-error>` entries
    #[must_use]
    pub fn new(command: Option<String>, response: Element) -> Self {
        let errors = xml::rpc_errors(&response);
        Self {
            command,
            response,
            errors,
        }
    }
}

/// Transport-level failure, optionally carrying a diagnostic document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    /// Human-readable description
    pub message: String,
    /// Diagnostic reply document, if the transport captured one
    pub diagnostic: Option<Element>,
}

impl TransportError {
    /// Transport error without a diagnostic document
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostic: None,
        }
    }

    /// Attach a diagnostic document
    #[inline]
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: Element) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }
}

/// Normalized failure of a remote call
#[derive(Debug, thiserror::Error)]
pub enum RpcFailure {
    /// Device rejected the call with `<rpc-error>` content
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No reply within the local wait bound
    #[error("timed out waiting for rpc reply")]
    Timeout {
        /// Bound that was exceeded, if known
        waited: Option<Duration>,
    },

    /// Anything else the transport raised
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RpcFailure {
    /// Wrap an arbitrary transport error
    #[inline]
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }

    /// Check if this is a local timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn summarize(errors: &[RpcErrorInfo]) -> String {
    match errors {
        [] => "no error details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

/// Remote procedures used by a configuration session
///
/// One method per procedure. Implementations perform the call synchronously
/// and return the reply document.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceRpc {
    /// `commit-configuration`, including check-only and detailed variants
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn commit_configuration(&mut self, request: &CommitRequest) -> Result<Element, RpcFailure>;

    /// `get-configuration` comparing the candidate against a rollback
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn get_configuration(&mut self, request: &GetConfiguration) -> Result<Element, RpcFailure>;

    /// `load-configuration` carrying candidate content
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn load_config(&mut self, request: &LoadRequest) -> Result<Element, RpcFailure>;

    /// `lock-configuration`
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn lock_configuration(&mut self) -> Result<Element, RpcFailure>;

    /// `unlock-configuration`
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn unlock_configuration(&mut self) -> Result<Element, RpcFailure>;

    /// `load-configuration` restoring a rollback or the rescue configuration
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn load_configuration(&mut self, target: LoadConfiguration) -> Result<Element, RpcFailure>;

    /// `request-save-rescue-configuration`
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn request_save_rescue_configuration(&mut self) -> Result<Element, RpcFailure>;

    /// `request-delete-rescue-configuration`
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn request_delete_rescue_configuration(&mut self) -> Result<Element, RpcFailure>;

    /// `get-rescue-information`
    ///
    /// # Errors
    /// Any [`RpcFailure`].
    fn get_rescue_information(&mut self, format: RescueFormat) -> Result<Element, RpcFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_parses_reply() {
        let response = xml::parse_document(
            "<rpc-reply><rpc-error><error-message>bad</error-message></rpc-error></rpc-reply>",
        )
        .unwrap();
        let err = ProtocolError::new(Some("commit".to_string()), response);

        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.to_string(), "rpc error from commit: error: bad");
    }

    #[test]
    fn summary_counts_extra_errors() {
        let info = RpcErrorInfo {
            message: Some("x".to_string()),
            ..RpcErrorInfo::default()
        };
        assert_eq!(summarize(&[]), "no error details");
        assert_eq!(summarize(&[info.clone(), info.clone(), info]), "error: x (+2 more)");
    }

    #[test]
    fn diff_request_compares_in_text() {
        let request = GetConfiguration::compare_rollback(RollbackId::ACTIVE);
        assert_eq!(request.compare(), "rollback");
        assert_eq!(request.format, ContentFormat::Text);
    }

    #[test]
    fn other_wraps_any_error() {
        let failure = RpcFailure::other("socket closed");
        assert_eq!(failure.to_string(), "socket closed");
        assert!(!failure.is_timeout());
        assert!(RpcFailure::Timeout { waited: None }.is_timeout());
    }
}
