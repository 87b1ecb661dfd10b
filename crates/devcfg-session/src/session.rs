//! Configuration session
//!
//! [`ConfigSession`] drives the candidate-configuration lifecycle on one
//! device connection:
//! - lock / unlock
//! - load candidate content from a string, document, file or template
//! - commit and commit check
//! - diff against rollback history, rollback, rescue
//!
//! Each operation validates its arguments locally, issues at most one remote
//! call, and translates recognized failures into [`ConfigError`].

use crate::config::SessionConfig;
use crate::error::{ConfigError, ConfigResult, RpcErrorReport};
use crate::rpc::{DeviceRpc, GetConfiguration, LoadConfiguration, RpcFailure};
use crate::source::{FileReader, FsReader, LoadOptions, LoadSource, TemplateLoader};
use crate::translate::{ErrorTranslator, Operation, Recovery};
use devcfg_core::xml;
use devcfg_core::{
    CommitOptions, CommitRequest, FormatResolver, RescueAction, RescueFormat, RollbackId,
    RpcErrorInfo, ValidationError,
};
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use xmltree::Element;

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Committed, possibly with warnings
    Committed,
    /// Committed; the device's detailed commit report
    Detail(Element),
}

/// Result of a commit check that did not raise
#[derive(Debug, Clone, PartialEq)]
pub enum CommitCheck {
    /// Candidate is valid, possibly with warnings
    Passed,
    /// Transport-level rejection, handed back as parsed diagnostics
    Rejected(RpcErrorInfo),
}

impl CommitCheck {
    /// Check if the candidate passed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Retrieved rescue configuration
#[derive(Debug, Clone, PartialEq)]
pub enum RescueConfig {
    /// Curly-brace text
    Text(String),
    /// Full reply document
    Document(Element),
}

/// Result of a rescue operation
#[derive(Debug, Clone, PartialEq)]
pub enum RescueOutcome {
    /// Active configuration saved as rescue
    Saved,
    /// Rescue configuration deleted
    Deleted,
    /// Rescue configuration, `None` if there is none or retrieval failed
    Config(Option<RescueConfig>),
    /// Rescue configuration loaded into the candidate (not committed)
    Reloaded(Element),
    /// Rescue configuration could not be loaded
    NotReloaded,
}

/// Candidate-configuration session over a [`DeviceRpc`]
pub struct ConfigSession<R> {
    rpc: R,
    config: SessionConfig,
    files: Box<dyn FileReader>,
    templates: Option<Box<dyn TemplateLoader>>,
}

impl<R: fmt::Debug> fmt::Debug for ConfigSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSession")
            .field("rpc", &self.rpc)
            .field("config", &self.config)
            .field("has_template_loader", &self.templates.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: DeviceRpc> ConfigSession<R> {
    /// Session with default settings, reading files from the local filesystem
    #[must_use]
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            config: SessionConfig::default(),
            files: Box::new(FsReader),
            templates: None,
        }
    }

    /// With session settings
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// With file reader
    #[must_use]
    pub fn with_file_reader(mut self, files: impl FileReader + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    /// With template loader
    #[must_use]
    pub fn with_template_loader(mut self, templates: impl TemplateLoader + 'static) -> Self {
        self.templates = Some(Box::new(templates));
        self
    }

    /// Session settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying RPC collaborator
    #[inline]
    #[must_use]
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Consume the session, returning the RPC collaborator
    #[inline]
    #[must_use]
    pub fn into_rpc(self) -> R {
        self.rpc
    }

    /// Acquire the exclusive configuration lock
    ///
    /// Does not block: contention with another session surfaces as
    /// `ConfigError::Lock`.
    ///
    /// # Errors
    /// `ConfigError::Lock`, or `ConfigError::Rpc` for unrecognized failures.
    pub fn lock(&mut self) -> ConfigResult<()> {
        self.rpc
            .lock_configuration()
            .or_else(|failure| Self::recover(Operation::Lock, failure, ConfigError::Lock))?;
        tracing::info!("Configuration locked");
        Ok(())
    }

    /// Release the configuration lock
    ///
    /// # Errors
    /// `ConfigError::Unlock`, or `ConfigError::Rpc` for unrecognized failures.
    pub fn unlock(&mut self) -> ConfigResult<()> {
        self.rpc
            .unlock_configuration()
            .or_else(|failure| Self::recover(Operation::Unlock, failure, ConfigError::Unlock))?;
        tracing::info!("Configuration unlocked");
        Ok(())
    }

    /// Load candidate content and return the device's reply
    ///
    /// Files and templates take their format from the path extension (or
    /// the template's file name) unless `options.format` is set.
    ///
    /// # Errors
    /// - Local: `Validation`, `Format`, `Content`, `Io`, `Template`
    /// - `ConfigError::ConfigLoad` when the device rejects the content
    /// - `ConfigError::Rpc` for any other remote failure
    pub fn load(
        &mut self,
        source: impl Into<LoadSource>,
        options: &LoadOptions,
    ) -> ConfigResult<Element> {
        let source = source.into();
        tracing::debug!("Loading candidate from {}", source.kind());

        let (content, origin) =
            source.materialize(&*self.files, self.templates.as_deref(), &options.template_vars)?;

        let size = content.text_len();
        let max = self.config.max_content_bytes;
        if size > max {
            return Err(ValidationError::ContentTooLarge { size, max }.into());
        }

        let mut builder = options.builder();
        if let (Some(origin), Some(text)) = (&origin, content.as_text()) {
            builder = builder.format(FormatResolver::resolve(options.format, Some(origin), text)?);
        }
        let request = builder.build(content)?;

        tracing::info!(
            "Loading {} candidate with action {}",
            request.format(),
            request.action()
        );

        match self.rpc.load_config(&request) {
            Ok(reply) => Ok(reply),
            Err(failure) => Self::recover(Operation::Load, failure, ConfigError::ConfigLoad),
        }
    }

    /// Commit the candidate configuration
    ///
    /// A warnings-only reply is a successful commit. A local timeout is
    /// reported as [`ConfigError::AmbiguousCompletion`] and never retried.
    ///
    /// # Errors
    /// - `ConfigError::Validation` for a zero-minute confirm window
    /// - `ConfigError::Commit` when the device rejects the commit
    /// - `ConfigError::AmbiguousCompletion` on local timeout
    /// - `ConfigError::Rpc` for any other remote failure
    pub fn commit(&mut self, options: &CommitOptions) -> ConfigResult<CommitOutcome> {
        let mut request = CommitRequest::from_options(options)?;
        if request.timeout.is_none() {
            request.timeout = self.config.commit_timeout();
        }

        tracing::info!(
            confirmed = request.confirmed,
            synchronize = request.synchronize,
            "Committing candidate configuration"
        );

        match self.rpc.commit_configuration(&request) {
            Ok(reply) if request.detail => Ok(CommitOutcome::Detail(reply)),
            Ok(_) => Ok(CommitOutcome::Committed),
            Err(failure) => {
                Self::recover(Operation::Commit, failure, ConfigError::Commit)?;
                Ok(CommitOutcome::Committed)
            }
        }
    }

    /// Validate the candidate without committing
    ///
    /// A transport error carrying a diagnostic document is not raised: its
    /// parsed fields are returned as [`CommitCheck::Rejected`].
    ///
    /// # Errors
    /// `ConfigError::Commit` when the device rejects the candidate, or
    /// `ConfigError::Rpc` for unrecognized failures (including timeouts).
    pub fn commit_check(&mut self) -> ConfigResult<CommitCheck> {
        match self.rpc.commit_configuration(&CommitRequest::check()) {
            Ok(_) => Ok(CommitCheck::Passed),
            Err(failure) => match ErrorTranslator::translate(Operation::CommitCheck, failure)? {
                Recovery::Warnings(_) => {
                    tracing::warn!("Commit check passed with warnings");
                    Ok(CommitCheck::Passed)
                }
                Recovery::Diagnostics { info, .. } => {
                    tracing::warn!("Commit check rejected: {}", info);
                    Ok(CommitCheck::Rejected(info))
                }
            },
        }
    }

    /// Text diff of the candidate against a rollback
    ///
    /// Returns `None` when there is no difference.
    ///
    /// # Errors
    /// - `ConfigError::Validation` for an id outside `0..=49` (no remote call)
    /// - `ConfigError::MalformedResponse` if the reply has no diff output
    /// - `ConfigError::Rpc` for remote failures
    pub fn diff(&mut self, rollback: i64) -> ConfigResult<Option<String>> {
        let id = RollbackId::new(rollback)?;
        let reply = self
            .rpc
            .get_configuration(&GetConfiguration::compare_rollback(id))?;

        let output = xml::find_child(&reply, "configuration-output")
            .ok_or_else(|| ConfigError::MalformedResponse("configuration-output".to_string()))?;

        Ok(output
            .get_text()
            .map(Cow::into_owned)
            .filter(|diff| diff != "\n"))
    }

    /// Write the diff against a rollback to `out`
    ///
    /// Writes nothing when there is no difference.
    ///
    /// # Errors
    /// As [`diff`](Self::diff), plus `ConfigError::Output` if writing fails.
    pub fn pdiff(&mut self, rollback: i64, out: &mut impl Write) -> ConfigResult<()> {
        if let Some(diff) = self.diff(rollback)? {
            out.write_all(diff.as_bytes()).map_err(ConfigError::Output)?;
        }
        Ok(())
    }

    /// Load a rollback into the candidate (not committed)
    ///
    /// # Errors
    /// `ConfigError::Validation` for an id outside `0..=49` (no remote call),
    /// or `ConfigError::Rpc` for remote failures.
    pub fn rollback(&mut self, rollback: i64) -> ConfigResult<()> {
        let id = RollbackId::new(rollback)?;
        self.rpc
            .load_configuration(LoadConfiguration::Rollback(id))?;
        tracing::info!("Loaded rollback {} into candidate", id);
        Ok(())
    }

    /// Rescue operation using the session's rescue format
    ///
    /// # Errors
    /// As [`rescue_with_format`](Self::rescue_with_format).
    pub fn rescue(&mut self, action: RescueAction) -> ConfigResult<RescueOutcome> {
        let format = self.config.rescue_format;
        self.rescue_with_format(action, format)
    }

    /// Rescue operation
    ///
    /// `Get` and `Reload` never fail: retrieval failures yield
    /// `Config(None)` and reload failures yield `NotReloaded`. `Reload`
    /// only loads the candidate, it does not commit.
    ///
    /// # Errors
    /// `ConfigError::Rpc` if saving or deleting fails.
    pub fn rescue_with_format(
        &mut self,
        action: RescueAction,
        format: RescueFormat,
    ) -> ConfigResult<RescueOutcome> {
        match action {
            RescueAction::Save => {
                self.rpc.request_save_rescue_configuration()?;
                tracing::info!("Saved active configuration as rescue");
                Ok(RescueOutcome::Saved)
            }
            RescueAction::Delete => {
                self.rpc.request_delete_rescue_configuration()?;
                tracing::info!("Deleted rescue configuration");
                Ok(RescueOutcome::Deleted)
            }
            RescueAction::Get => Ok(RescueOutcome::Config(self.rescue_get(format))),
            RescueAction::Reload => match self.rpc.load_configuration(LoadConfiguration::Rescue) {
                Ok(reply) => {
                    tracing::info!("Loaded rescue configuration into candidate");
                    Ok(RescueOutcome::Reloaded(reply))
                }
                Err(failure) => {
                    tracing::warn!("Rescue reload failed: {}", failure);
                    Ok(RescueOutcome::NotReloaded)
                }
            },
        }
    }

    fn rescue_get(&mut self, format: RescueFormat) -> Option<RescueConfig> {
        let reply = match self.rpc.get_rescue_information(format) {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::warn!("Rescue retrieval failed: {}", failure);
                return None;
            }
        };

        match format {
            RescueFormat::Text => {
                xml::find_text(&reply, "configuration-information/configuration-output")
                    .map(RescueConfig::Text)
            }
            RescueFormat::Xml => Some(RescueConfig::Document(reply)),
        }
    }

    /// Translate a failure, returning the reply when it still counts as success
    fn recover(
        operation: Operation,
        failure: RpcFailure,
        reject: fn(RpcErrorReport) -> ConfigError,
    ) -> ConfigResult<Element> {
        match ErrorTranslator::translate(operation, failure)? {
            Recovery::Warnings(reply) => {
                tracing::warn!("{} completed with warnings", operation);
                Ok(reply)
            }
            Recovery::Diagnostics { info, response } => Err(reject(RpcErrorReport {
                command: None,
                response,
                errors: vec![info],
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{MockDeviceRpc, ProtocolError, TransportError};
    use devcfg_core::{ConfigContent, ConfirmWindow, ContentFormat, LoadAction, LoadRequest};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn doc(text: &str) -> Element {
        xml::parse_document(text).unwrap()
    }

    fn ok_reply() -> Element {
        doc("<rpc-reply><ok/></rpc-reply>")
    }

    fn protocol(text: &str) -> RpcFailure {
        ProtocolError::new(Some("commit-configuration".to_string()), doc(text)).into()
    }

    const WARNING_REPLY: &str =
        "<rpc-reply><rpc-error><error-severity>warning</error-severity></rpc-error><ok/></rpc-reply>";
    const ERROR_REPLY: &str =
        "<rpc-reply><rpc-error><error-severity>error</error-severity><error-message>commit failed</error-message></rpc-error></rpc-reply>";

    fn session(mock: MockDeviceRpc) -> ConfigSession<MockDeviceRpc> {
        ConfigSession::new(mock)
    }

    #[test]
    fn lock_and_unlock() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_lock_configuration()
            .times(1)
            .returning(|| Ok(ok_reply()));
        mock.expect_unlock_configuration()
            .times(1)
            .returning(|| Ok(ok_reply()));

        let mut session = session(mock);
        session.lock().unwrap();
        session.unlock().unwrap();
    }

    #[test]
    fn lock_contention_is_lock_error() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_lock_configuration().returning(|| {
            Err(protocol(
                "<rpc-reply><rpc-error><error-message>configuration database locked by another user</error-message></rpc-error></rpc-reply>",
            ))
        });

        let err = session(mock).lock().unwrap_err();
        assert!(matches!(err, ConfigError::Lock(_)));
        assert!(err.to_string().contains("locked by another user"));
    }

    #[test]
    fn unlock_transport_document_is_unlock_error() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_unlock_configuration().returning(|| {
            Err(TransportError::new("rpc failed")
                .with_diagnostic(doc(ERROR_REPLY))
                .into())
        });

        let err = session(mock).unlock().unwrap_err();
        assert!(matches!(err, ConfigError::Unlock(_)));
    }

    #[test]
    fn set_with_overwrite_never_reaches_device() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config().never();

        let err = session(mock)
            .load(
                "set system host-name foo",
                &LoadOptions::new().with_overwrite(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::ConflictingArgs)
        ));
    }

    #[test]
    fn indeterminate_content_never_reaches_device() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config().never();

        let err = session(mock)
            .load("just a sentence", &LoadOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::UnresolvedFormat)
        ));
    }

    #[test]
    fn oversized_content_never_reaches_device() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config().never();

        let mut session =
            session(mock).with_config(SessionConfig::new().with_max_content_bytes(8));
        let err = session
            .load("set system host-name foo", &LoadOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::ContentTooLarge { size: 24, max: 8 })
        ));
    }

    #[test]
    fn structured_string_loads_as_parsed_document() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config()
            .withf(|request: &LoadRequest| {
                request.format() == ContentFormat::Structured
                    && request.action() == LoadAction::Replace
                    && request
                        .content()
                        .as_document()
                        .is_some_and(|doc| doc.name == "configuration")
            })
            .times(1)
            .returning(|_| Ok(ok_reply()));

        let reply = session(mock)
            .load(
                "<configuration><system><host-name>foo</host-name></system></configuration>",
                &LoadOptions::new(),
            )
            .unwrap();
        assert!(xml::has_ok_marker(&reply));
    }

    #[test]
    fn merge_load_sends_no_action_marker() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config()
            .withf(|request: &LoadRequest| request.action_marker().is_none())
            .times(1)
            .returning(|_| Ok(ok_reply()));

        session(mock)
            .load(
                ConfigContent::from("system {\n host-name foo;\n}"),
                &LoadOptions::new().with_merge(),
            )
            .unwrap();
    }

    #[test]
    fn file_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidate.set");
        std::fs::write(&path, "this does not look like set-style at all").unwrap();

        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config()
            .withf(|request: &LoadRequest| {
                request.action() == LoadAction::Set && request.format() == ContentFormat::Text
            })
            .times(1)
            .returning(|_| Ok(ok_reply()));

        session(mock)
            .load(LoadSource::Path(path), &LoadOptions::new())
            .unwrap();
    }

    #[test]
    fn unknown_file_extension_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidate.foo");
        std::fs::write(&path, "set system host-name foo").unwrap();

        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config().never();

        let err = session(mock)
            .load(LoadSource::Path(path), &LoadOptions::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Format(_)));
    }

    #[test]
    fn load_rejection_is_config_load_error() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_config().returning(|_| {
            Err(ProtocolError::new(Some("load-configuration".to_string()), doc(ERROR_REPLY)).into())
        });

        let err = session(mock)
            .load("set system host-name foo", &LoadOptions::new())
            .unwrap_err();
        let report = err.report().unwrap();
        assert_eq!(report.command.as_deref(), Some("load-configuration"));
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(err, ConfigError::ConfigLoad(_)));
    }

    #[test]
    fn confirm_window_arguments() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .withf(|request: &CommitRequest| {
                request.confirmed && request.confirm_timeout == Some(5) && !request.check
            })
            .times(1)
            .returning(|_| Ok(ok_reply()));

        let outcome = session(mock)
            .commit(&CommitOptions::new().with_confirm(ConfirmWindow::Minutes(5)))
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);
    }

    #[test]
    fn commit_timeout_falls_back_to_settings() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .withf(|request: &CommitRequest| request.timeout == Some(Duration::from_secs(120)))
            .times(1)
            .returning(|_| Ok(ok_reply()));

        session(mock)
            .with_config(SessionConfig::new().with_commit_timeout(Duration::from_secs(120)))
            .commit(&CommitOptions::new())
            .unwrap();
    }

    #[test]
    fn zero_confirm_window_never_reaches_device() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration().never();

        let err = session(mock)
            .commit(&CommitOptions::new().with_confirm(ConfirmWindow::Minutes(0)))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::InvalidConfirmTimeout(0))
        ));
    }

    #[test]
    fn commit_warnings_are_success() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .returning(|_| Err(protocol(WARNING_REPLY)));

        let outcome = session(mock)
            .commit(&CommitOptions::new().with_detail())
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);
    }

    #[test]
    fn commit_error_carries_response() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .returning(|_| Err(protocol(ERROR_REPLY)));

        let err = session(mock).commit(&CommitOptions::new()).unwrap_err();
        let ConfigError::Commit(report) = err else {
            panic!("expected commit error");
        };
        assert_eq!(report.command.as_deref(), Some("commit-configuration"));
        assert_eq!(report.response, doc(ERROR_REPLY));
    }

    #[test]
    fn commit_timeout_is_ambiguous() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration().times(1).returning(|_| {
            Err(RpcFailure::Timeout {
                waited: Some(Duration::from_secs(30)),
            })
        });

        let err = session(mock).commit(&CommitOptions::new()).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousCompletion { .. }));
    }

    #[test]
    fn commit_detail_returns_report() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .withf(|request: &CommitRequest| request.detail)
            .returning(|_| Ok(doc("<commit-results><routing-engine/></commit-results>")));

        let outcome = session(mock)
            .commit(&CommitOptions::new().with_detail())
            .unwrap();
        let CommitOutcome::Detail(report) = outcome else {
            panic!("expected detail");
        };
        assert_eq!(report.name, "commit-results");
    }

    #[test]
    fn commit_check_sends_only_check() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .with(eq(CommitRequest::check()))
            .times(1)
            .returning(|_| Err(protocol(WARNING_REPLY)));

        assert!(session(mock).commit_check().unwrap().passed());
    }

    #[test]
    fn commit_check_error_raises() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration()
            .returning(|_| Err(protocol(ERROR_REPLY)));

        let err = session(mock).commit_check().unwrap_err();
        assert!(matches!(err, ConfigError::Commit(_)));
    }

    #[test]
    fn commit_check_transport_document_is_returned() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_commit_configuration().returning(|_| {
            Err(TransportError::new("rpc failed")
                .with_diagnostic(doc(ERROR_REPLY))
                .into())
        });

        let check = session(mock).commit_check().unwrap();
        let CommitCheck::Rejected(info) = check else {
            panic!("expected rejection");
        };
        assert_eq!(info.message.as_deref(), Some("commit failed"));
        assert_eq!(info.severity.as_deref(), Some("error"));
    }

    #[test]
    fn diff_with_no_changes_is_none() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration()
            .withf(|request: &GetConfiguration| {
                request.rollback.get() == 0 && request.format == ContentFormat::Text
            })
            .returning(|_| {
                Ok(doc(
                    "<configuration-information><configuration-output>\n</configuration-output></configuration-information>",
                ))
            });

        assert_eq!(session(mock).diff(0).unwrap(), None);
    }

    #[test]
    fn diff_text_is_verbatim() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration()
            .withf(|request: &GetConfiguration| request.rollback.get() == 3)
            .returning(|_| {
                Ok(doc(
                    "<configuration-information><configuration-output>[edit system]\n-  host-name a;\n+  host-name b;\n</configuration-output></configuration-information>",
                ))
            });

        assert_eq!(
            session(mock).diff(3).unwrap().as_deref(),
            Some("[edit system]\n-  host-name a;\n+  host-name b;\n")
        );
    }

    #[test]
    fn diff_of_blank_lines_is_returned() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration().returning(|_| {
            Ok(doc(
                "<configuration-information><configuration-output>\n\n</configuration-output></configuration-information>",
            ))
        });

        assert_eq!(session(mock).diff(0).unwrap().as_deref(), Some("\n\n"));
    }

    #[test]
    fn diff_without_output_is_malformed() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration()
            .returning(|_| Ok(doc("<configuration-information/>")));

        let err = session(mock).diff(0).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedResponse(ref name) if name == "configuration-output"));
    }

    #[test]
    fn out_of_range_ids_never_reach_device() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration().never();
        mock.expect_load_configuration().never();

        let mut session = session(mock);
        for id in [-1, 50] {
            assert!(matches!(
                session.diff(id),
                Err(ConfigError::Validation(ValidationError::InvalidRollbackId(_)))
            ));
            assert!(matches!(
                session.rollback(id),
                Err(ConfigError::Validation(ValidationError::InvalidRollbackId(_)))
            ));
        }
    }

    #[test]
    fn rollback_loads_history_entry() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_configuration()
            .with(eq(LoadConfiguration::Rollback(RollbackId::new(49).unwrap())))
            .times(1)
            .returning(|_| Ok(ok_reply()));

        session(mock).rollback(49).unwrap();
    }

    #[test]
    fn rollback_errors_propagate_unchanged() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_configuration()
            .returning(|_| Err(protocol(ERROR_REPLY)));

        let err = session(mock).rollback(1).unwrap_err();
        assert!(matches!(err, ConfigError::Rpc(RpcFailure::Protocol(_))));
    }

    #[test]
    fn pdiff_writes_diff() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_configuration().returning(|_| {
            Ok(doc(
                "<configuration-information><configuration-output>+ foo\n</configuration-output></configuration-information>",
            ))
        });

        let mut out = Vec::new();
        session(mock).pdiff(1, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "+ foo\n");
    }

    #[test]
    fn rescue_get_failure_is_none() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_get_rescue_information()
            .returning(|_| Err(RpcFailure::other("no rescue configuration")));

        assert_eq!(
            session(mock).rescue(RescueAction::Get).unwrap(),
            RescueOutcome::Config(None)
        );
    }

    #[test]
    fn rescue_get_text_and_xml() {
        let reply = "<rpc-reply><configuration-information><configuration-output>system { }\n</configuration-output></configuration-information></rpc-reply>";

        let mut mock = MockDeviceRpc::new();
        mock.expect_get_rescue_information()
            .with(eq(RescueFormat::Text))
            .returning(move |_| Ok(doc(reply)));
        mock.expect_get_rescue_information()
            .with(eq(RescueFormat::Xml))
            .returning(move |_| Ok(doc(reply)));

        let mut session = session(mock);
        assert_eq!(
            session.rescue(RescueAction::Get).unwrap(),
            RescueOutcome::Config(Some(RescueConfig::Text("system { }\n".to_string())))
        );
        assert_eq!(
            session
                .rescue_with_format(RescueAction::Get, RescueFormat::Xml)
                .unwrap(),
            RescueOutcome::Config(Some(RescueConfig::Document(doc(reply))))
        );
    }

    #[test]
    fn rescue_reload_never_commits() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_configuration()
            .with(eq(LoadConfiguration::Rescue))
            .times(1)
            .returning(|_| Ok(ok_reply()));
        mock.expect_commit_configuration().never();

        let outcome = session(mock).rescue(RescueAction::Reload).unwrap();
        assert_eq!(outcome, RescueOutcome::Reloaded(ok_reply()));
    }

    #[test]
    fn rescue_reload_failure_is_not_reloaded() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_load_configuration()
            .returning(|_| Err(protocol(ERROR_REPLY)));

        assert_eq!(
            session(mock).rescue(RescueAction::Reload).unwrap(),
            RescueOutcome::NotReloaded
        );
    }

    #[test]
    fn rescue_save_and_delete() {
        let mut mock = MockDeviceRpc::new();
        mock.expect_request_save_rescue_configuration()
            .times(1)
            .returning(|| Ok(ok_reply()));
        mock.expect_request_delete_rescue_configuration()
            .times(1)
            .returning(|| Ok(ok_reply()));

        let mut session = session(mock);
        assert_eq!(session.rescue(RescueAction::Save).unwrap(), RescueOutcome::Saved);
        assert_eq!(session.rescue(RescueAction::Delete).unwrap(), RescueOutcome::Deleted);
    }
}
