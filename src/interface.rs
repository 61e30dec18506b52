use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ast::Node;
use crate::error::BoxError;
use crate::filters::{Filter, FilterRegistry};

/// Configuration for a single compile.
///
/// Every table given here extends the built-in defaults for this compile
/// only; nothing is written back to shared state.
///
/// # Examples
///
/// ```
/// use jadeite::CompileOptions;
///
/// let options = CompileOptions::default()
///     .with_pretty_print(false)
///     .with_variable_delimiters("[[", "]]")
///     .with_extra_self_closing_tags(["wbr"]);
/// assert!(!options.pretty_print);
/// assert_eq!(options.variable_start, "[[");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub pretty_print: bool,
    /// Appended to include and extends paths whose file name has no
    /// extension.
    pub target_extension: String,
    pub variable_start: String,
    pub variable_end: String,
    pub block_start: String,
    pub block_end: String,
    /// Defer dynamic attributes to the runtime attribute helper.
    pub use_runtime_attribute_helper: bool,
    /// Name of the runtime attribute helper.
    pub attrs_helper: String,
    /// Name of the runtime iteration adapter.
    pub iter_helper: String,
    pub extra_self_closing_tags: Vec<String>,
    pub extra_inline_tags: Vec<String>,
    pub extra_auto_close_constructs: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub filters: FilterRegistry,
    pub doctype_overrides: BTreeMap<String, String>,
    /// Doctype in effect before any doctype node is seen.
    pub doctype: Option<String>,
    /// Path of the template being compiled.
    pub filename: Option<PathBuf>,
    /// Root directory for absolute include paths.
    pub basedir: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty_print: true,
            target_extension: ".pug".to_string(),
            variable_start: "{{".to_string(),
            variable_end: "}}".to_string(),
            block_start: "{%".to_string(),
            block_end: "%}".to_string(),
            use_runtime_attribute_helper: true,
            attrs_helper: "__attrs".to_string(),
            iter_helper: "__iter".to_string(),
            extra_self_closing_tags: Vec::new(),
            extra_inline_tags: Vec::new(),
            extra_auto_close_constructs: Vec::new(),
            filters: FilterRegistry::new(),
            doctype_overrides: BTreeMap::new(),
            doctype: None,
            filename: None,
            basedir: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    #[must_use]
    pub fn with_target_extension<T: Into<String>>(mut self, extension: T) -> Self {
        self.target_extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_variable_delimiters<S: Into<String>, E: Into<String>>(
        mut self,
        start: S,
        end: E,
    ) -> Self {
        self.variable_start = start.into();
        self.variable_end = end.into();
        self
    }

    #[must_use]
    pub fn with_block_delimiters<S: Into<String>, E: Into<String>>(
        mut self,
        start: S,
        end: E,
    ) -> Self {
        self.block_start = start.into();
        self.block_end = end.into();
        self
    }

    #[must_use]
    pub fn with_runtime_attribute_helper(mut self, enabled: bool) -> Self {
        self.use_runtime_attribute_helper = enabled;
        self
    }

    #[must_use]
    pub fn with_extra_self_closing_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_self_closing_tags
            .extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_extra_inline_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_inline_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_extra_auto_close_constructs<I, T>(mut self, constructs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_auto_close_constructs
            .extend(constructs.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_filter<T: AsRef<str>>(mut self, name: T, filter: Filter) -> Self {
        self.filters.register(name, filter);
        self
    }

    #[must_use]
    pub fn with_doctype_override<N: Into<String>, V: Into<String>>(
        mut self,
        name: N,
        value: V,
    ) -> Self {
        self.doctype_overrides.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_doctype<T: Into<String>>(mut self, doctype: T) -> Self {
        self.doctype = Some(doctype.into());
        self
    }

    #[must_use]
    pub fn with_filename<P: Into<PathBuf>>(mut self, filename: P) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_basedir<P: Into<PathBuf>>(mut self, basedir: P) -> Self {
        self.basedir = Some(basedir.into());
        self
    }
}

/// Source of included templates.
///
/// Attaching a loader to a compiler makes `include` nodes resolve inline
/// instead of being lowered to an include statement. Detecting include
/// cycles is the loader's responsibility.
pub trait TemplateLoader {
    /// Whether `path` names an existing template.
    fn exists(&self, path: &Path) -> bool;

    /// `read` returns the raw source at `path`.
    ///
    /// # Errors
    /// - If the source cannot be read.
    fn read(&self, path: &Path) -> Result<String, BoxError>;

    /// `parse` turns Pug source into a node tree.
    ///
    /// # Errors
    /// - If the source is not valid Pug.
    fn parse(&self, source: &str, path: &Path) -> Result<Node, BoxError>;
}
