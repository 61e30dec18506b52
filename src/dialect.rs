use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::interface::CompileOptions;

/// `#{expr}` (escaped) and `!{expr}` (raw) markers, optionally preceded by a
/// backslash that turns the marker into literal text.
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\\)?([#!])\{(.*?)\}").expect("interpolation pattern is valid")
});

const ESCAPE_FILTER: &str = "|escape";

/// Delimiters and helper names of the target template dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub variable_start: String,
    pub variable_end: String,
    pub block_start: String,
    pub block_end: String,
    pub attrs_helper: String,
    pub iter_helper: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::from_options(&CompileOptions::default())
    }
}

impl Dialect {
    pub fn from_options(options: &CompileOptions) -> Self {
        Self {
            variable_start: options.variable_start.clone(),
            variable_end: options.variable_end.clone(),
            block_start: options.block_start.clone(),
            block_end: options.block_end.clone(),
            attrs_helper: options.attrs_helper.clone(),
            iter_helper: options.iter_helper.clone(),
        }
    }

    /// A statement tag: `{% content %}`.
    pub fn stmt(&self, content: &str) -> String {
        format!("{} {} {}", self.block_start, content, self.block_end)
    }

    /// An expression tag around `expr`, with the escape filter when asked.
    pub fn expr(&self, expr: &str, escape: bool) -> String {
        format!(
            "{}{}{}{}",
            self.variable_start,
            expr,
            if escape { ESCAPE_FILTER } else { "" },
            self.variable_end
        )
    }

    /// Like [`Dialect::expr`], but expands the gettext shorthand
    /// `_ some text` into `_("some text")`.
    pub fn var(&self, expr: &str, escape: bool) -> String {
        match expr.strip_prefix("_ ") {
            Some(message) => self.expr(&format!("_(\"{}\")", message), escape),
            None => self.expr(expr, escape),
        }
    }

    /// Rewrite interpolation markers in `text` into expression tags.
    ///
    /// With `escape` unset, `#{}` escapes and `!{}` does not. `Some(_)`
    /// forces the escape filter on or off for every marker. A marker preceded
    /// by a backslash is kept as literal text, minus the backslash.
    pub fn interpolate<'t>(&self, text: &'t str, escape: Option<bool>) -> Cow<'t, str> {
        INTERPOLATION.replace_all(text, |caps: &Captures<'_>| {
            let marker = caps.get(2).map_or("#", |m| m.as_str());
            let expr = caps.get(3).map_or("", |m| m.as_str());
            if caps.get(1).is_some() {
                return format!("{}{{{}}}", marker, expr);
            }
            let escape = escape.unwrap_or(marker == "#");
            self.expr(expr, escape)
        })
    }

    /// A call to the runtime attribute helper.
    pub fn attrs_call(&self, params: &str) -> String {
        self.expr(&format!("{}({})", self.attrs_helper, params), false)
    }

    /// A call to the runtime iteration adapter.
    pub fn iter_call(&self, iterable: &str, arity: usize) -> String {
        format!("{}({},{})", self.iter_helper, iterable, arity)
    }
}
