//! Session settings

use devcfg_core::RescueFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cap on candidate content size: 10 MiB
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 10 * 1024 * 1024;

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("failed to read settings {}: {source}", .path.display())]
    Io {
        /// Settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings are not valid TOML for this schema
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Configuration session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Commit wait bound used when a commit does not set one
    pub commit_timeout_secs: Option<u64>,
    /// Format used by `rescue(get)`
    pub rescue_format: RescueFormat,
    /// Largest candidate content accepted for loading
    pub max_content_bytes: usize,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default commit timeout
    ///
    /// Stored in whole seconds, rounded up: 500ms waits one second.
    #[inline]
    #[must_use]
    pub fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.commit_timeout_secs = Some(timeout.as_secs().saturating_add(partial));
        self
    }

    /// With rescue retrieval format
    #[inline]
    #[must_use]
    pub fn with_rescue_format(mut self, format: RescueFormat) -> Self {
        self.rescue_format = format;
        self
    }

    /// With content size cap
    #[inline]
    #[must_use]
    pub fn with_max_content_bytes(mut self, max: usize) -> Self {
        self.max_content_bytes = max;
        self
    }

    /// Default commit timeout
    #[inline]
    #[must_use]
    pub fn commit_timeout(&self) -> Option<Duration> {
        self.commit_timeout_secs.map(Duration::from_secs)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `SettingsError::Invalid` for a zero content cap or zero commit timeout.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_content_bytes == 0 {
            return Err(SettingsError::Invalid {
                field: "max_content_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.commit_timeout_secs == Some(0) {
            return Err(SettingsError::Invalid {
                field: "commit_timeout_secs",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate TOML settings
    ///
    /// # Errors
    /// `SettingsError::Parse` or `SettingsError::Invalid`.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML settings file
    ///
    /// # Errors
    /// `SettingsError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            commit_timeout_secs: None,
            rescue_format: RescueFormat::Text,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}
