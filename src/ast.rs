//! The node tree handed to the compiler by an external Pug parser.
//!
//! Every node carries everything needed to render it; the compiler never
//! mutates a node. With the `serde` feature enabled the whole tree can be
//! (de)serialized, which lets a parser living in another process hand trees
//! over as JSON.

use std::collections::BTreeMap;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw text, emitted verbatim.
    Literal { text: String },
    /// An ordered sequence of nodes.
    Block(Block),
    /// A named, overridable section.
    CodeBlock {
        name: String,
        mode: BlockMode,
        body: Block,
    },
    /// A doctype declaration. `None` or an empty value means `default`.
    Doctype { value: Option<String> },
    /// A mixin definition or call.
    Mixin {
        name: String,
        args: String,
        body: Option<Block>,
        is_call: bool,
    },
    Tag(Tag),
    /// A named filter applied to the raw lines of its body.
    Filter {
        name: String,
        is_ast_filter: bool,
        attrs: BTreeMap<String, String>,
        body: Vec<String>,
    },
    /// A text block; in pretty mode a newline follows it.
    Text { segments: Vec<String> },
    /// Piped or inline text. When `is_inline` is false the compiler treats
    /// the output as an unfinished line.
    InlineString {
        segments: Vec<String>,
        is_inline: bool,
    },
    Comment { value: String, is_buffered: bool },
    BlockComment {
        value: String,
        body: Block,
        is_buffered: bool,
    },
    Assignment { name: String, value: String },
    Extends { path: String },
    Include { path: String },
    Conditional(Conditional),
    Code(Code),
    /// A loop over `iterable`, binding `loop_vars` in declared order.
    Each {
        loop_vars: Vec<String>,
        iterable: String,
        body: Block,
    },
}

impl Node {
    pub fn literal<T: Into<String>>(text: T) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn text<T: Into<String>>(text: T) -> Self {
        Self::Text {
            segments: vec![text.into()],
        }
    }

    /// Short name of the variant, used to identify the offending node in
    /// errors and log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::Block(_) => "block",
            Self::CodeBlock { .. } => "code block",
            Self::Doctype { .. } => "doctype",
            Self::Mixin { .. } => "mixin",
            Self::Tag(_) => "tag",
            Self::Filter { .. } => "filter",
            Self::Text { .. } => "text",
            Self::InlineString { .. } => "string",
            Self::Comment { .. } => "comment",
            Self::BlockComment { .. } => "block comment",
            Self::Assignment { .. } => "assignment",
            Self::Extends { .. } => "extends",
            Self::Include { .. } => "include",
            Self::Conditional(_) => "conditional",
            Self::Code(_) => "code",
            Self::Each { .. } => "each",
        }
    }

    /// The textual payload of text-like nodes.
    pub(crate) fn text_content(&self) -> Option<String> {
        match self {
            Self::Literal { text } => Some(text.clone()),
            Self::Text { segments } | Self::InlineString { segments, .. } => {
                Some(segments.concat())
            }
            Self::Block(_)
            | Self::CodeBlock { .. }
            | Self::Doctype { .. }
            | Self::Mixin { .. }
            | Self::Tag(_)
            | Self::Filter { .. }
            | Self::Comment { .. }
            | Self::BlockComment { .. }
            | Self::Assignment { .. }
            | Self::Extends { .. }
            | Self::Include { .. }
            | Self::Conditional(_)
            | Self::Code(_)
            | Self::Each { .. } => None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Block {
    pub nodes: Vec<Node>,
}

impl Block {
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text of the first node, if it is text-like.
    pub(crate) fn first_text(&self) -> Option<String> {
        self.nodes.first().and_then(Node::text_content)
    }
}

impl From<Vec<Node>> for Block {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

/// How a `CodeBlock` combines with the inherited section of the same name.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BlockMode {
    #[default]
    Replace,
    Append,
    Prepend,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Single-line text following the tag name.
    pub text: Option<Block>,
    /// Inline code following the tag name (`p= value`).
    pub code: Option<Code>,
    pub body: Block,
    /// The parser saw an explicit self-closing marker.
    pub self_closing: bool,
    pub is_inline: bool,
    /// The name contains interpolation markers.
    pub is_dynamic_name: bool,
    /// The body is known to contain only text.
    pub text_only: bool,
}

impl Tag {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Attribute {
    pub name: String,
    /// Source text of the value, an expression in the target dialect
    /// (`"literal"` for constants). Ignored when `is_boolean_true` is set.
    pub value: String,
    pub is_boolean_true: bool,
    pub is_static: bool,
}

impl Attribute {
    /// A constant attribute; `value` must already be a dialect literal.
    pub fn constant<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_boolean_true: false,
            is_static: true,
        }
    }

    /// An attribute whose value is only known at render time.
    pub fn dynamic<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_boolean_true: false,
            is_static: false,
        }
    }

    /// A bare boolean attribute such as `checked`.
    pub fn boolean<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            is_boolean_true: true,
            is_static: true,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConditionalKind {
    If,
    Unless,
    Elif,
    Else,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub kind: ConditionalKind,
    pub predicate: Option<String>,
    pub body: Option<Block>,
    /// Following `elif`/`else` branches, in source order.
    pub next: Vec<Conditional>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Code {
    pub value: String,
    /// Output the value (`=`/`!=`) rather than run it as a statement (`-`).
    pub is_buffered: bool,
    pub escape: bool,
    pub body: Option<Block>,
}
