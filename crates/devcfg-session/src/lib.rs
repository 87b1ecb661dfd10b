//! devcfg Session
//!
//! Drives a device's candidate configuration over a remote-procedure
//! transport supplied by the caller.
//!
//! # Architecture
//!
//! ```text
//! caller ──► ConfigSession ──► LoadRequestBuilder / CommitRequest   (local validation)
//!                 │
//!                 ├──► DeviceRpc  (one remote call per operation)
//!                 │        │
//!                 │        ▼
//!                 │    RpcFailure ──► ErrorTranslator ──► ConfigError
//!                 │
//!                 └──► FileReader / TemplateLoader  (content sources)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use devcfg_session::prelude::*;
//!
//! let mut session = ConfigSession::new(transport);
//! session.lock()?;
//! session.load("set system host-name edge-1", &LoadOptions::new())?;
//! if session.diff(0)?.is_some() {
//!     session.commit(&CommitOptions::new().with_comment("rename"))?;
//! }
//! session.unlock()?;
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod rpc;
pub mod session;
pub mod source;
pub mod translate;

// Re-exports for convenience
pub use config::{SessionConfig, SettingsError, DEFAULT_MAX_CONTENT_BYTES};
pub use error::{ConfigError, ConfigResult, RpcErrorReport, TemplateError};
pub use rpc::{
    DeviceRpc, GetConfiguration, LoadConfiguration, ProtocolError, RpcFailure, TransportError,
};
pub use session::{CommitCheck, CommitOutcome, ConfigSession, RescueConfig, RescueOutcome};
pub use source::{
    FileReader, FsReader, LoadOptions, LoadSource, Template, TemplateLoader, TemplateVars,
};
pub use translate::{ErrorTranslator, Operation, Recovery};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a configuration session
    pub use crate::{
        CommitCheck, CommitOutcome, ConfigError, ConfigResult, ConfigSession, DeviceRpc,
        LoadOptions, LoadSource, RescueOutcome, RpcFailure, SessionConfig,
    };
    pub use devcfg_core::prelude::*;
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::rpc::MockDeviceRpc;
    use devcfg_core::{xml, RescueAction};

    #[test]
    fn lock_load_commit_unlock() {
        let ok = || xml::parse_document("<rpc-reply><ok/></rpc-reply>").unwrap();

        let mut seq = mockall::Sequence::new();
        let mut mock = MockDeviceRpc::new();
        mock.expect_lock_configuration()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Ok(ok()));
        mock.expect_load_config()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(ok()));
        mock.expect_commit_configuration()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(ok()));
        mock.expect_unlock_configuration()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Ok(ok()));

        let mut session = ConfigSession::new(mock);
        session.lock().unwrap();
        session
            .load("set system host-name edge-1", &LoadOptions::new())
            .unwrap();
        assert_eq!(
            session.commit(&devcfg_core::CommitOptions::new()).unwrap(),
            CommitOutcome::Committed
        );
        session.unlock().unwrap();
    }

    #[test]
    fn unsupported_rescue_action_names_it() {
        let err = "bogus".parse::<RescueAction>().unwrap_err();
        let err = ConfigError::from(err);
        assert!(err.is_local());
        assert!(err.to_string().contains("bogus"));
    }
}
