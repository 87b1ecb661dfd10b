//! Commit options and the wire arguments derived from them

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Confirmed-commit window
///
/// The device reverts the commit unless a follow-up commit arrives within the
/// window. Nothing is tracked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmWindow {
    /// Use the device's default window
    Default,
    /// Explicit window in minutes
    Minutes(u32),
}

/// Caller-facing commit options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitOptions {
    /// Commit log comment
    pub comment: Option<String>,
    /// Request a confirmed commit
    pub confirm: Option<ConfirmWindow>,
    /// Local wait bound for the reply
    pub timeout: Option<Duration>,
    /// Synchronize to the other control plane
    pub sync: bool,
    /// Force synchronization (implies `sync`)
    pub force_sync: bool,
    /// Have every daemon re-evaluate the full configuration
    pub full: bool,
    /// Return the commit report instead of a plain success
    pub detail: bool,
}

impl CommitOptions {
    /// Default options: plain commit
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With commit comment
    #[inline]
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// With confirmed-commit window
    #[inline]
    #[must_use]
    pub fn with_confirm(mut self, window: ConfirmWindow) -> Self {
        self.confirm = Some(window);
        self
    }

    /// With local reply timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// With control-plane synchronization
    #[inline]
    #[must_use]
    pub fn with_sync(mut self) -> Self {
        self.sync = true;
        self
    }

    /// With forced control-plane synchronization
    #[inline]
    #[must_use]
    pub fn with_force_sync(mut self) -> Self {
        self.force_sync = true;
        self
    }

    /// With full re-evaluation
    #[inline]
    #[must_use]
    pub fn with_full(mut self) -> Self {
        self.full = true;
        self
    }

    /// With detailed commit report
    #[inline]
    #[must_use]
    pub fn with_detail(mut self) -> Self {
        self.detail = true;
        self
    }
}

/// Arguments of a `commit-configuration` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRequest {
    /// `<log>` comment
    pub log: Option<String>,
    /// `<confirmed/>` flag
    pub confirmed: bool,
    /// `<confirm-timeout>` minutes, only for explicit windows
    pub confirm_timeout: Option<u32>,
    /// `<synchronize/>` flag
    pub synchronize: bool,
    /// `<force-synchronize/>` flag
    pub force_synchronize: bool,
    /// `<full/>` flag
    pub full: bool,
    /// Request `<detail/>` report
    pub detail: bool,
    /// `<check/>` only, no commit
    pub check: bool,
    /// Local wait bound
    pub timeout: Option<Duration>,
}

impl CommitRequest {
    /// Derive wire arguments from caller options
    ///
    /// # Errors
    /// `ValidationError::InvalidConfirmTimeout` for a zero-minute window.
    pub fn from_options(options: &CommitOptions) -> Result<Self, ValidationError> {
        let mut request = Self {
            log: options.comment.clone().filter(|c| !c.is_empty()),
            timeout: options.timeout,
            full: options.full,
            detail: options.detail,
            ..Self::default()
        };

        match options.confirm {
            Some(ConfirmWindow::Default) => request.confirmed = true,
            Some(ConfirmWindow::Minutes(0)) => {
                return Err(ValidationError::InvalidConfirmTimeout(0));
            }
            Some(ConfirmWindow::Minutes(minutes)) => {
                request.confirmed = true;
                request.confirm_timeout = Some(minutes);
            }
            None => {}
        }

        if options.force_sync {
            request.synchronize = true;
            request.force_synchronize = true;
        } else if options.sync {
            request.synchronize = true;
        }

        Ok(request)
    }

    /// Check-only request carrying no other arguments
    #[inline]
    #[must_use]
    pub fn check() -> Self {
        Self {
            check: true,
            ..Self::default()
        }
    }
}
