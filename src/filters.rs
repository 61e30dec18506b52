use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::compiler::Compiler;
use crate::error::BoxError;

/// Attributes given to a filter. Text filters always receive a `filename`
/// entry holding the source path of the template being compiled.
pub type FilterAttrs = BTreeMap<String, String>;

pub type FilterResult = Result<String, BoxError>;

type TextFilterFn = dyn Fn(&str, &FilterAttrs) -> FilterResult + Send + Sync;
type AstFilterFn = dyn Fn(&[String], &Compiler<'_>, &FilterAttrs) -> FilterResult + Send + Sync;

/// A named content transformer.
#[derive(Clone)]
pub enum Filter {
    /// Receives the joined and interpolated body text. Its output is
    /// buffered like any other text.
    Text(Arc<TextFilterFn>),
    /// Receives the raw body lines and the running compiler. Its output is
    /// spliced in verbatim.
    Ast(Arc<AstFilterFn>),
}

impl Filter {
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&str, &FilterAttrs) -> FilterResult + Send + Sync + 'static,
    {
        Self::Text(Arc::new(f))
    }

    pub fn ast<F>(f: F) -> Self
    where
        F: Fn(&[String], &Compiler<'_>, &FilterAttrs) -> FilterResult + Send + Sync + 'static,
    {
        Self::Ast(Arc::new(f))
    }

    pub const fn is_ast(&self) -> bool {
        matches!(self, Self::Ast(_))
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Filter::Text"),
            Self::Ast(_) => f.write_str("Filter::Ast"),
        }
    }
}

/// A set of filters keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Filter>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: AsRef<str>>(&mut self, name: T, filter: Filter) -> &mut Self {
        self.filters.insert(name.as_ref().to_string(), filter);
        self
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<&Filter> {
        self.filters.get(name.as_ref())
    }

    pub fn contains<T: AsRef<str>>(&self, name: T) -> bool {
        self.filters.contains_key(name.as_ref())
    }

    /// Add every filter of `other`, replacing filters with the same name.
    pub fn extend(&mut self, other: &Self) {
        for (name, filter) in &other.filters {
            self.filters.insert(name.clone(), filter.clone());
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }
}

static DEFAULT_FILTERS: LazyLock<RwLock<FilterRegistry>> =
    LazyLock::new(|| RwLock::new(FilterRegistry::new()));

/// Register a filter in the process-wide default registry.
///
/// Every compiler takes a snapshot of the default registry when it is
/// constructed, so a registration only affects compiles started after it.
pub fn register_filter<T: AsRef<str>>(name: T, filter: Filter) {
    DEFAULT_FILTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, filter);
}

/// A copy of the process-wide default registry.
pub fn default_filters() -> FilterRegistry {
    DEFAULT_FILTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
