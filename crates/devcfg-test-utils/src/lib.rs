//! Testing utilities for the devcfg workspace
//!
//! Shared test doubles, reply fixtures, and tracing setup.

#![allow(missing_docs)]

use devcfg_core::{CommitRequest, LoadRequest, RescueFormat};
use devcfg_session::{
    DeviceRpc, FileReader, GetConfiguration, LoadConfiguration, ProtocolError, RpcFailure,
    Template, TemplateError, TemplateLoader, TemplateVars, TransportError,
};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use xmltree::{Element, XMLNode};

/// A call observed by [`ScriptedRpc`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Commit(CommitRequest),
    GetConfiguration(GetConfiguration),
    LoadConfig(LoadRequest),
    Lock,
    Unlock,
    LoadConfiguration(LoadConfiguration),
    SaveRescue,
    DeleteRescue,
    GetRescue(RescueFormat),
}

/// [`DeviceRpc`] double answering from a script, in order
///
/// Calls beyond the script fail with `RpcFailure::Other`.
#[derive(Debug, Default)]
pub struct ScriptedRpc {
    replies: VecDeque<Result<Element, RpcFailure>>,
    calls: Vec<RecordedCall>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    #[must_use]
    pub fn reply(mut self, reply: Element) -> Self {
        self.replies.push_back(Ok(reply));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn fail(mut self, failure: impl Into<RpcFailure>) -> Self {
        self.replies.push_back(Err(failure.into()));
        self
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn answer(&mut self, call: RecordedCall) -> Result<Element, RpcFailure> {
        self.calls.push(call);
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(RpcFailure::other("no scripted reply left")))
    }
}

impl DeviceRpc for ScriptedRpc {
    fn commit_configuration(&mut self, request: &CommitRequest) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::Commit(request.clone()))
    }

    fn get_configuration(&mut self, request: &GetConfiguration) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::GetConfiguration(*request))
    }

    fn load_config(&mut self, request: &LoadRequest) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::LoadConfig(request.clone()))
    }

    fn lock_configuration(&mut self) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::Lock)
    }

    fn unlock_configuration(&mut self) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::Unlock)
    }

    fn load_configuration(&mut self, target: LoadConfiguration) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::LoadConfiguration(target))
    }

    fn request_save_rescue_configuration(&mut self) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::SaveRescue)
    }

    fn request_delete_rescue_configuration(&mut self) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::DeleteRescue)
    }

    fn get_rescue_information(&mut self, format: RescueFormat) -> Result<Element, RpcFailure> {
        self.answer(RecordedCall::GetRescue(format))
    }
}

/// Reply documents shaped like the device's
pub mod fixtures {
    use super::*;

    fn leaf(name: &str, text: &str) -> XMLNode {
        let mut element = Element::new(name);
        element.children.push(XMLNode::Text(text.to_string()));
        XMLNode::Element(element)
    }

    fn wrap(name: &str, children: Vec<XMLNode>) -> Element {
        let mut element = Element::new(name);
        element.children = children;
        element
    }

    fn rpc_error(severity: &str, message: &str) -> XMLNode {
        XMLNode::Element(wrap(
            "rpc-error",
            vec![
                leaf("error-severity", severity),
                leaf("error-message", message),
            ],
        ))
    }

    /// `<rpc-reply><ok/></rpc-reply>`
    pub fn ok_reply() -> Element {
        wrap("rpc-reply", vec![XMLNode::Element(Element::new("ok"))])
    }

    /// Reply with one warning plus `<ok/>`
    pub fn warning_reply(message: &str) -> Element {
        wrap(
            "rpc-reply",
            vec![
                rpc_error("warning", message),
                XMLNode::Element(Element::new("ok")),
            ],
        )
    }

    /// Reply with one error and no `<ok/>`
    pub fn error_reply(message: &str) -> Element {
        wrap("rpc-reply", vec![rpc_error("error", message)])
    }

    /// `get-configuration` comparison reply
    pub fn diff_reply(output: &str) -> Element {
        wrap(
            "configuration-information",
            vec![leaf("configuration-output", output)],
        )
    }

    /// `get-rescue-information` reply
    pub fn rescue_reply(output: &str) -> Element {
        wrap("rpc-reply", vec![XMLNode::Element(diff_reply(output))])
    }

    /// Device rejection carrying `reply`
    pub fn protocol_error(command: &str, reply: Element) -> RpcFailure {
        ProtocolError::new(Some(command.to_string()), reply).into()
    }

    /// Transport error carrying a diagnostic document
    pub fn transport_error_with(reply: Element) -> RpcFailure {
        TransportError::new("rpc transport failed")
            .with_diagnostic(reply)
            .into()
    }
}

/// Template substituting `{{ name }}` placeholders with string or scalar variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTemplate {
    filename: String,
    body: String,
}

impl StaticTemplate {
    pub fn new(filename: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            body: body.into(),
        }
    }
}

impl Template for StaticTemplate {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn render(&self, vars: &TemplateVars) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();

        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::Render {
                name: self.filename.clone(),
                message: "unclosed placeholder".to_string(),
            })?;

            let name = after[..end].trim();
            let value = vars.get(name).ok_or_else(|| TemplateError::Render {
                name: self.filename.clone(),
                message: format!("'{name}' is undefined"),
            })?;
            match value {
                serde_json::Value::String(text) => rendered.push_str(text),
                other => rendered.push_str(&other.to_string()),
            }
            rest = &after[end + 2..];
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}

/// [`TemplateLoader`] over an in-memory table
#[derive(Debug, Clone, Default)]
pub struct MapTemplateLoader {
    templates: HashMap<PathBuf, StaticTemplate>,
}

impl MapTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.templates
            .insert(path, StaticTemplate::new(filename, body));
        self
    }
}

impl TemplateLoader for MapTemplateLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn Template>, TemplateError> {
        self.templates
            .get(path)
            .cloned()
            .map(|template| Box::new(template) as Box<dyn Template>)
            .ok_or_else(|| TemplateError::NotFound(path.to_path_buf()))
    }
}

/// [`FileReader`] over an in-memory table
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: HashMap<PathBuf, String>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl FileReader for MemoryFiles {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }
}

/// Install a test-writer tracing subscriber, once per process
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_placeholders() {
        let template = StaticTemplate::new("system.conf", "system { host-name {{ host }}; port {{port}}; }");
        let vars: TemplateVars = [
            ("host".to_string(), serde_json::json!("edge-1")),
            ("port".to_string(), serde_json::json!(830)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            template.render(&vars).unwrap(),
            "system { host-name edge-1; port 830; }"
        );
    }

    #[test]
    fn template_reports_undefined_variable() {
        let template = StaticTemplate::new("system.conf", "{{ missing }}");
        assert!(matches!(
            template.render(&TemplateVars::new()),
            Err(TemplateError::Render { .. })
        ));
    }

    #[test]
    fn script_runs_out() {
        let mut rpc = ScriptedRpc::new().reply(fixtures::ok_reply());
        assert!(rpc.lock_configuration().is_ok());
        assert!(rpc.unlock_configuration().is_err());
        assert_eq!(rpc.calls(), &[RecordedCall::Lock, RecordedCall::Unlock]);
    }
}
