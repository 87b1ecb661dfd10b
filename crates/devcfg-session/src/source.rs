//! Candidate content sources
//!
//! Content reaches [`ConfigSession::load`](crate::ConfigSession::load) from
//! exactly one [`LoadSource`]. Files and templates are read through the
//! [`FileReader`] and [`TemplateLoader`] collaborators; their path (or the
//! template's file name) decides the format unless one is given explicitly.

use crate::error::{ConfigError, ConfigResult, TemplateError};
use devcfg_core::{ConfigContent, ContentFormat, LoadRequestBuilder, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Variables available to a template while rendering
pub type TemplateVars = BTreeMap<String, serde_json::Value>;

/// A parameterized configuration template
pub trait Template {
    /// File name the template was loaded from; its extension decides the format
    fn filename(&self) -> &str;

    /// Render with the given variables
    ///
    /// # Errors
    /// `TemplateError::Render` if the engine fails.
    fn render(&self, vars: &TemplateVars) -> Result<String, TemplateError>;
}

/// Resolves template paths to templates
pub trait TemplateLoader {
    /// Load the template at `path`
    ///
    /// # Errors
    /// `TemplateError::NotFound` if nothing exists at `path`.
    fn load(&self, path: &Path) -> Result<Box<dyn Template>, TemplateError>;
}

/// Reads local configuration files
pub trait FileReader {
    /// Read a whole file as UTF-8
    ///
    /// # Errors
    /// Any I/O error.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileReader`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Where candidate content comes from
pub enum LoadSource {
    /// Content supplied directly
    Content(ConfigContent),
    /// A local file
    Path(PathBuf),
    /// A template resolved through the session's [`TemplateLoader`]
    TemplatePath(PathBuf),
    /// A template constructed by the caller
    Template(Box<dyn Template>),
}

impl fmt::Debug for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(content) => f.debug_tuple("Content").field(content).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::TemplatePath(path) => f.debug_tuple("TemplatePath").field(path).finish(),
            Self::Template(template) => f
                .debug_tuple("Template")
                .field(&template.filename())
                .finish(),
        }
    }
}

impl LoadSource {
    /// Pick the single source among loose optional parts
    ///
    /// # Errors
    /// - `ConfigError::UnhandledLoadRequest` when nothing is supplied
    /// - `ValidationError::ConflictingSources` when more than one is
    pub fn from_parts(
        content: Option<ConfigContent>,
        path: Option<PathBuf>,
        template_path: Option<PathBuf>,
        template: Option<Box<dyn Template>>,
    ) -> ConfigResult<Self> {
        let supplied: Vec<&str> = [
            content.is_some().then_some("content"),
            path.is_some().then_some("path"),
            template_path.is_some().then_some("template_path"),
            template.is_some().then_some("template"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if supplied.len() > 1 {
            return Err(ValidationError::ConflictingSources(supplied.join(", ")).into());
        }

        content
            .map(Self::Content)
            .or_else(|| path.map(Self::Path))
            .or_else(|| template_path.map(Self::TemplatePath))
            .or_else(|| template.map(Self::Template))
            .ok_or(ConfigError::UnhandledLoadRequest)
    }

    /// Short name for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Content(_) => "content",
            Self::Path(_) => "path",
            Self::TemplatePath(_) => "template_path",
            Self::Template(_) => "template",
        }
    }

    /// Read or render the content
    ///
    /// Returns the content plus the file name whose extension decides the
    /// format, when there is one.
    pub(crate) fn materialize(
        self,
        files: &dyn FileReader,
        templates: Option<&dyn TemplateLoader>,
        vars: &TemplateVars,
    ) -> ConfigResult<(ConfigContent, Option<PathBuf>)> {
        match self {
            Self::Content(content) => Ok((content, None)),
            Self::Path(path) => {
                let text = files
                    .read_to_string(&path)
                    .map_err(|source| ConfigError::io(&path, source))?;
                Ok((ConfigContent::Text(text), Some(path)))
            }
            Self::TemplatePath(path) => {
                let loader = templates.ok_or_else(|| TemplateError::NoLoader(path.clone()))?;
                let template = loader.load(&path)?;
                let text = template.render(vars)?;
                Ok((ConfigContent::Text(text), Some(path)))
            }
            Self::Template(template) => {
                let text = template.render(vars)?;
                Ok((ConfigContent::Text(text), Some(PathBuf::from(template.filename()))))
            }
        }
    }
}

impl From<ConfigContent> for LoadSource {
    fn from(content: ConfigContent) -> Self {
        Self::Content(content)
    }
}

impl From<&str> for LoadSource {
    fn from(text: &str) -> Self {
        Self::Content(text.into())
    }
}

impl From<String> for LoadSource {
    fn from(text: String) -> Self {
        Self::Content(text.into())
    }
}

/// Load-time options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Explicit content format, skipping all inference
    pub format: Option<ContentFormat>,
    /// Replace the whole candidate
    pub overwrite: bool,
    /// Merge into the candidate
    pub merge: bool,
    /// Variables for template sources
    pub template_vars: TemplateVars,
}

impl LoadOptions {
    /// Default options: inferred format, `replace` action
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With explicit format
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: ContentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// With overwrite
    #[inline]
    #[must_use]
    pub fn with_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// With merge
    #[inline]
    #[must_use]
    pub fn with_merge(mut self) -> Self {
        self.merge = true;
        self
    }

    /// With a template variable
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.template_vars.insert(name.into(), value.into());
        self
    }

    /// Request builder carrying these options
    #[must_use]
    pub fn builder(&self) -> LoadRequestBuilder {
        LoadRequestBuilder::new()
            .format_hint(self.format)
            .overwrite(self.overwrite)
            .merge(self.merge)
    }
}
