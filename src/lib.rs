//! Compile Pug node trees into Jinja-style template source.
//!
//! The input is the tree produced by an external Pug parser ([`Node`]); the
//! output is text in a template dialect with configurable statement
//! (`{% ... %}`) and expression (`{{ ... }}`) delimiters.
//!
//! ```
//! use jadeite::{Attribute, Block, CompileOptions, Node, Tag};
//!
//! let mut link = Tag::new("a");
//! link.attrs.push(Attribute::dynamic("href", "url"));
//! link.text = Some(Block::new(vec![Node::literal("#{label}")]));
//! let root = Node::Block(Block::new(vec![Node::Tag(link)]));
//!
//! let output = jadeite::compile(&root, &CompileOptions::default()).unwrap();
//! assert_eq!(
//!     output,
//!     "<a{{__attrs(attrs=[('href',(url))])}}>{{label|escape}}</a>"
//! );
//! ```

mod ast;
mod attrs;
mod buffer;
mod compiler;
mod dialect;
mod error;
mod filters;
mod interface;
mod policy;

// Public exports.
pub use ast::{Attribute, Block, BlockMode, Code, Conditional, ConditionalKind, Node, Tag};
pub use compiler::Compiler;
pub use dialect::Dialect;
pub use error::{BoxError, JadeiteError, JadeiteResult, StructuralError, StructuralErrorKind};
pub use filters::{
    Filter, FilterAttrs, FilterRegistry, FilterResult, default_filters, register_filter,
};
pub use interface::{CompileOptions, TemplateLoader};
pub use policy::{ResolvedDoctype, TagPolicy};

/// Compile `root` with `options`, trimming surrounding whitespace from the
/// result.
///
/// # Errors
/// See [`Compiler::compile`].
pub fn compile(root: &Node, options: &CompileOptions) -> JadeiteResult<String> {
    Compiler::new(root, options)
        .compile()
        .map(|output| output.trim().to_string())
}
