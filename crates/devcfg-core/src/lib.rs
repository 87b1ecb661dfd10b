//! devcfg Core
//!
//! Local, side-effect free building blocks for managing a device's candidate
//! configuration.
//!
//! # Core Concepts
//!
//! - [`ContentFormat`] / [`FormatResolver`]: structured, text or set-style content
//! - [`LoadRequestBuilder`]: validated [`LoadRequest`] descriptors
//! - [`CommitOptions`] / [`CommitRequest`]: caller options and their wire arguments
//! - [`RollbackId`]: bounded index into the device's rollback history
//! - [`RescueAction`] / [`RescueFormat`]: rescue-configuration operations
//! - [`xml`]: helpers for reply documents (`<ok/>` markers, `<rpc-error>` fields)
//!
//! Nothing in this crate talks to a device. Every failure produced here is
//! raised before a remote call would be made.
//!
//! # Example
//!
//! ```rust,ignore
//! use devcfg_core::{ContentFormat, LoadAction, LoadRequestBuilder};
//!
//! let request = LoadRequestBuilder::new()
//!     .merge(true)
//!     .build("set system host-name edge-1")?;
//!
//! assert_eq!(request.format(), ContentFormat::Text);
//! assert_eq!(request.action(), LoadAction::Set);
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod commit;
pub mod content;
pub mod error;
pub mod format;
pub mod load;
pub mod rescue;
pub mod rollback;
pub mod xml;

// Re-exports for convenience
pub use commit::{CommitOptions, CommitRequest, ConfirmWindow};
pub use content::ConfigContent;
pub use error::{ContentParseError, FormatError, LoadError, LoadResult, ValidationError};
pub use format::{ContentFormat, FormatResolver};
pub use load::{LoadAction, LoadRequest, LoadRequestBuilder};
pub use rescue::{RescueAction, RescueFormat};
pub use rollback::RollbackId;
pub use xml::RpcErrorInfo;

/// Re-export of the XML element type used for structured documents
pub use xmltree::Element;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building configuration requests
    pub use crate::{
        CommitOptions, CommitRequest, ConfigContent, ConfirmWindow, ContentFormat, Element,
        FormatResolver, LoadAction, LoadError, LoadRequest, LoadRequestBuilder, RescueAction,
        RescueFormat, RollbackId, RpcErrorInfo, ValidationError,
    };
}
