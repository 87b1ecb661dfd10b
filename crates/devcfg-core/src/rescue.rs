//! Rescue configuration actions

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation on the device's rescue configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueAction {
    /// Retrieve the rescue configuration
    Get,
    /// Save the active configuration as rescue
    Save,
    /// Delete the rescue configuration
    Delete,
    /// Load the rescue configuration as candidate (no commit)
    Reload,
}

impl fmt::Display for RescueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Reload => "reload",
        })
    }
}

impl FromStr for RescueAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Self::Get),
            "save" => Ok(Self::Save),
            "delete" => Ok(Self::Delete),
            "reload" => Ok(Self::Reload),
            other => Err(ValidationError::UnsupportedRescueAction(other.to_string())),
        }
    }
}

/// Representation returned when retrieving the rescue configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueFormat {
    /// Curly-brace text
    #[default]
    Text,
    /// XML document
    Xml,
}

impl RescueFormat {
    /// Name used for the `format` attribute on the wire
    #[inline]
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for RescueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
