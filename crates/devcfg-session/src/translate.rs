//! Failure translation
//!
//! Maps a normalized [`RpcFailure`] onto the domain taxonomy for the
//! operation that produced it.
//!
//! ```text
//! operation     protocol error              transport error + document   anything else
//! lock/unlock   Lock / Unlock               same, namespaces stripped    unchanged
//! load          ConfigLoad                  unchanged                    unchanged
//! commit        <ok/> ? warnings : Commit   Commit                       timeout -> ambiguous
//! commit check  <ok/> ? warnings : Commit   diagnostics returned         unchanged
//! ```

use crate::error::{ConfigError, RpcErrorReport};
use crate::rpc::{ProtocolError, RpcFailure, TransportError};
use devcfg_core::xml;
use devcfg_core::RpcErrorInfo;
use std::fmt;
use xmltree::Element;

/// Operation whose failure is being translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Acquire the configuration lock
    Lock,
    /// Release the configuration lock
    Unlock,
    /// Load candidate content
    Load,
    /// Commit the candidate
    Commit,
    /// Validate the candidate without committing
    CommitCheck,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Load => "load",
            Self::Commit => "commit",
            Self::CommitCheck => "commit check",
        })
    }
}

/// A failure that still counts as an answer
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    /// Reply carried `<ok/>`: success with warnings
    Warnings(Element),
    /// Diagnostics handed back to the caller instead of raised
    Diagnostics {
        /// Parsed diagnostic fields
        info: RpcErrorInfo,
        /// Diagnostic document they were parsed from
        response: Element,
    },
}

impl Recovery {
    /// Reply or diagnostic document
    #[must_use]
    pub fn into_response(self) -> Element {
        match self {
            Self::Warnings(response) | Self::Diagnostics { response, .. } => response,
        }
    }
}

/// Translates remote failures per operation
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Translate a failure raised by `operation`
    ///
    /// # Errors
    /// The domain error for recognized rejections, otherwise
    /// `ConfigError::Rpc` carrying the failure unchanged.
    pub fn translate(operation: Operation, failure: RpcFailure) -> Result<Recovery, ConfigError> {
        match operation {
            Operation::Lock => Self::lock_like(failure, ConfigError::Lock),
            Operation::Unlock => Self::lock_like(failure, ConfigError::Unlock),
            Operation::Load => match failure {
                RpcFailure::Protocol(err) => Err(ConfigError::ConfigLoad(err.into())),
                other => Err(ConfigError::Rpc(other)),
            },
            Operation::Commit => match failure {
                RpcFailure::Protocol(err) => Self::commit_protocol(err),
                RpcFailure::Timeout { waited } => Err(ConfigError::AmbiguousCompletion { waited }),
                RpcFailure::Transport(TransportError {
                    diagnostic: Some(doc),
                    ..
                }) => Err(ConfigError::Commit(RpcErrorReport::from_response(doc))),
                other => Err(ConfigError::Rpc(other)),
            },
            Operation::CommitCheck => match failure {
                RpcFailure::Protocol(err) => Self::commit_protocol(err),
                RpcFailure::Transport(TransportError {
                    diagnostic: Some(doc),
                    ..
                }) => Ok(Recovery::Diagnostics {
                    info: RpcErrorInfo::from_element(&doc),
                    response: doc,
                }),
                other => Err(ConfigError::Rpc(other)),
            },
        }
    }

    fn lock_like(
        failure: RpcFailure,
        wrap: fn(RpcErrorReport) -> ConfigError,
    ) -> Result<Recovery, ConfigError> {
        match failure {
            RpcFailure::Protocol(err) => Err(wrap(err.into())),
            RpcFailure::Transport(TransportError {
                diagnostic: Some(doc),
                ..
            }) => {
                let report = RpcErrorReport::from_response(xml::strip_namespaces(doc));
                Err(wrap(report))
            }
            other => Err(ConfigError::Rpc(other)),
        }
    }

    fn commit_protocol(err: ProtocolError) -> Result<Recovery, ConfigError> {
        if xml::has_ok_marker(&err.response) {
            Ok(Recovery::Warnings(err.response))
        } else {
            Err(ConfigError::Commit(err.into()))
        }
    }
}
