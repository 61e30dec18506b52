use std::collections::{BTreeMap, BTreeSet};

use crate::interface::CompileOptions;

const DOCTYPES: [(&str, &str); 9] = [
    ("5", "<!DOCTYPE html>"),
    ("xml", r#"<?xml version="1.0" encoding="utf-8" ?>"#),
    (
        "default",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#,
    ),
    (
        "transitional",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#,
    ),
    (
        "strict",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#,
    ),
    (
        "frameset",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Frameset//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd">"#,
    ),
    (
        "1.1",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#,
    ),
    (
        "basic",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML Basic 1.1//EN" "http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd">"#,
    ),
    (
        "mobile",
        r#"<!DOCTYPE html PUBLIC "-//WAPFORUM//DTD XHTML Mobile 1.2//EN" "http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd">"#,
    ),
];

const INLINE_TAGS: [&str; 20] = [
    "a", "abbr", "acronym", "b", "br", "code", "em", "font", "i", "img", "ins", "kbd", "map",
    "samp", "small", "span", "strong", "sub", "sup", "textarea",
];

const SELF_CLOSING_TAGS: [&str; 9] = [
    "meta", "img", "link", "input", "area", "base", "col", "br", "hr",
];

/// Statements whose body is followed by a matching `end<name>` tag.
const AUTO_CLOSE_CONSTRUCTS: [&str; 14] = [
    "if",
    "for",
    "block",
    "filter",
    "autoescape",
    "with",
    "trans",
    "spaceless",
    "comment",
    "cache",
    "macro",
    "localize",
    "compress",
    "raw",
];

/// Doctype names that switch on terse (HTML5) output.
const TERSE_DOCTYPES: [&str; 2] = ["5", "html"];

const XML_DECLARATION: &str = "<?xml";

/// A doctype resolved from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDoctype {
    pub markup: String,
    pub terse: bool,
    pub xml: bool,
}

/// Per-compile copy of the doctype and tag tables, extended by options.
#[derive(Debug, Clone)]
pub struct TagPolicy {
    doctypes: BTreeMap<String, String>,
    inline_tags: BTreeSet<String>,
    self_closing_tags: BTreeSet<String>,
    auto_close_constructs: BTreeSet<String>,
}

impl Default for TagPolicy {
    fn default() -> Self {
        Self::from_options(&CompileOptions::default())
    }
}

impl TagPolicy {
    pub fn from_options(options: &CompileOptions) -> Self {
        let mut doctypes: BTreeMap<String, String> = DOCTYPES
            .iter()
            .map(|(name, markup)| ((*name).to_string(), (*markup).to_string()))
            .collect();
        doctypes.extend(options.doctype_overrides.clone());

        Self {
            doctypes,
            inline_tags: merged(&INLINE_TAGS, &options.extra_inline_tags),
            self_closing_tags: merged(&SELF_CLOSING_TAGS, &options.extra_self_closing_tags),
            auto_close_constructs: merged(
                &AUTO_CLOSE_CONSTRUCTS,
                &options.extra_auto_close_constructs,
            ),
        }
    }

    /// Resolve a doctype name; `None` and `""` mean `default`. Unknown names
    /// become `<!DOCTYPE name>`.
    pub fn resolve_doctype(&self, name: Option<&str>) -> ResolvedDoctype {
        let name = name.filter(|name| !name.is_empty()).unwrap_or("default");
        let markup = self
            .doctypes
            .get(name)
            .cloned()
            .unwrap_or_else(|| format!("<!DOCTYPE {}>", name));
        ResolvedDoctype {
            terse: TERSE_DOCTYPES.contains(&name),
            xml: markup.starts_with(XML_DECLARATION),
            markup,
        }
    }

    pub fn is_inline(&self, tag: &str) -> bool {
        self.inline_tags.contains(tag)
    }

    pub fn is_self_closing(&self, tag: &str) -> bool {
        self.self_closing_tags.contains(tag)
    }

    pub fn is_auto_close(&self, construct: &str) -> bool {
        self.auto_close_constructs.contains(construct)
    }
}

fn merged(defaults: &[&str], extra: &[String]) -> BTreeSet<String> {
    defaults
        .iter()
        .map(|name| (*name).to_string())
        .chain(extra.iter().cloned())
        .collect()
}
