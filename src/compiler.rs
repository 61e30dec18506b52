use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ast::{Block, BlockMode, Code, Conditional, ConditionalKind, Node, Tag};
use crate::attrs::AttributeRenderer;
use crate::buffer::OutputBuffer;
use crate::dialect::Dialect;
use crate::error::{JadeiteError, JadeiteResult, StructuralErrorKind};
use crate::filters::{Filter, FilterRegistry, default_filters};
use crate::interface::{CompileOptions, TemplateLoader};
use crate::policy::TagPolicy;

const INDENT: &str = "  ";

/// Translates one node tree into target dialect source.
///
/// A compiler is built for a single compile: all state starts fresh in
/// [`Compiler::new`] and [`Compiler::compile`] consumes it. Tables and
/// filters are copied from their defaults at construction, so compilers never
/// share mutable state.
///
/// # Example
///
/// ```
/// use jadeite::{Block, CompileOptions, Compiler, Node, Tag};
///
/// let mut tag = Tag::new("p");
/// tag.text = Some(Block::new(vec![Node::literal("Hello #{name}")]));
/// let root = Node::Block(Block::new(vec![Node::Tag(tag)]));
///
/// let options = CompileOptions::default().with_pretty_print(false);
/// let output = Compiler::new(&root, &options).compile().unwrap();
/// assert_eq!(output, "<p>Hello {{name|escape}}</p>");
/// ```
pub struct Compiler<'a> {
    root: &'a Node,
    options: &'a CompileOptions,
    loader: Option<&'a dyn TemplateLoader>,
    dialect: Dialect,
    policy: TagPolicy,
    filters: FilterRegistry,

    indent_depth: usize,
    doctype: Option<String>,
    terse: bool,
    xml: bool,
    has_emitted_doctype: bool,
    has_emitted_first_tag: bool,
    mixin_depth: usize,
    /// The last write was text that did not finish its line.
    inside_inline_string: bool,
    out: OutputBuffer,
}

impl<'a> Compiler<'a> {
    pub fn new(root: &'a Node, options: &'a CompileOptions) -> Self {
        let mut filters = default_filters();
        filters.extend(&options.filters);

        let mut compiler = Self {
            root,
            options,
            loader: None,
            dialect: Dialect::from_options(options),
            policy: TagPolicy::from_options(options),
            filters,
            indent_depth: 0,
            doctype: None,
            terse: false,
            xml: false,
            has_emitted_doctype: false,
            has_emitted_first_tag: false,
            mixin_depth: 0,
            inside_inline_string: false,
            out: OutputBuffer::new(),
        };
        if let Some(doctype) = options.doctype.as_deref() {
            compiler.set_doctype(Some(doctype));
        }
        compiler
    }

    /// Resolve `include` nodes through `loader` and inline them.
    #[must_use]
    pub fn with_loader(mut self, loader: &'a dyn TemplateLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// `compile` walks the tree and returns the assembled output.
    ///
    /// # Errors
    /// - `JadeiteError::Structural` for malformed or unresolvable nodes.
    /// - `JadeiteError::Filter` when a filter fails.
    /// - `JadeiteError::Loader` when an include cannot be read or parsed.
    pub fn compile(mut self) -> JadeiteResult<String> {
        tracing::debug!(
            root = self.root.kind(),
            pretty = self.options.pretty_print,
            "compiling node tree"
        );
        let root = self.root;
        self.visit(root)?;
        tracing::debug!(bytes = self.out.len(), "compiled node tree");
        Ok(self.out.finish())
    }

    pub const fn options(&self) -> &CompileOptions {
        self.options
    }

    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub const fn is_terse(&self) -> bool {
        self.terse
    }

    pub const fn is_xml(&self) -> bool {
        self.xml
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub const fn indent_depth(&self) -> usize {
        self.indent_depth
    }

    pub const fn mixin_depth(&self) -> usize {
        self.mixin_depth
    }

    fn visit(&mut self, node: &Node) -> JadeiteResult<()> {
        if self.inside_inline_string && !matches!(node, Node::Tag(_)) {
            self.out.buffer("\n");
            self.inside_inline_string = false;
        }

        match node {
            Node::Literal { text } => self.out.buffer(text),
            Node::Block(block) => self.visit_block(block)?,
            Node::CodeBlock { name, mode, body } => self.visit_code_block(name, *mode, body)?,
            Node::Doctype { value } => self.visit_doctype(value.as_deref().unwrap_or_default()),
            Node::Mixin {
                name,
                args,
                body,
                is_call,
            } => self.visit_mixin(name, args, body.as_ref(), *is_call)?,
            Node::Tag(tag) => self.visit_tag(tag)?,
            Node::Filter {
                name,
                is_ast_filter,
                attrs,
                body,
            } => self.visit_filter(name, *is_ast_filter, attrs, body)?,
            Node::Text { segments } => self.visit_text(segments),
            Node::InlineString {
                segments,
                is_inline,
            } => self.visit_string(segments, *is_inline),
            Node::Comment { value, is_buffered } => self.visit_comment(value, *is_buffered),
            Node::BlockComment {
                value,
                body,
                is_buffered,
            } => self.visit_block_comment(value, body, *is_buffered)?,
            Node::Assignment { name, value } => {
                let statement = self.dialect.stmt(&format!("set {} = {}", name, value));
                self.out.buffer(&statement);
            }
            Node::Extends { path } => {
                let statement = self
                    .dialect
                    .stmt(&format!("extends \"{}\"", self.format_path(path)));
                self.out.buffer(&statement);
            }
            Node::Include { path } => self.visit_include(path)?,
            Node::Conditional(conditional) => self.visit_conditional(conditional)?,
            Node::Code(code) => self.visit_code(code)?,
            Node::Each {
                loop_vars,
                iterable,
                body,
            } => self.visit_each(loop_vars, iterable, body)?,
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> JadeiteResult<()> {
        for node in &block.nodes {
            self.visit(node)?;
        }
        Ok(())
    }

    /// Visit a nested block as a node of its own, so a pending inline string
    /// is finished first.
    fn visit_nested(&mut self, block: &Block) -> JadeiteResult<()> {
        if self.inside_inline_string {
            self.out.buffer("\n");
            self.inside_inline_string = false;
        }
        self.visit_block(block)
    }

    fn newline_indent(&mut self, level: usize) {
        let line = format!("\n{}", INDENT.repeat(level));
        self.out.buffer(&line);
    }

    /// Name under which the caller block of the enclosing mixin is reachable.
    fn caller_name(&self) -> Cow<'static, str> {
        if self.mixin_depth > 1 {
            Cow::Owned(format!("__caller_{}", self.mixin_depth))
        } else {
            Cow::Borrowed("caller")
        }
    }

    fn visit_code_block(&mut self, name: &str, mode: BlockMode, body: &Block) -> JadeiteResult<()> {
        if self.mixin_depth > 0 {
            // Inside a mixin a block forwards the caller's content.
            let caller = self.caller_name();
            let forward = format!(
                "{}{}{}",
                self.dialect.stmt(&format!("if {}", caller)),
                self.dialect.expr(&format!(" {}() ", caller), false),
                self.dialect.stmt("endif"),
            );
            self.out.buffer(&forward);
            return Ok(());
        }

        let super_call = self.dialect.expr("super()", false);
        let open = self.dialect.stmt(&format!("block {}", name));
        self.out.buffer(&open);
        if mode == BlockMode::Append {
            self.out.buffer(&super_call);
        }
        self.visit_block(body)?;
        if mode == BlockMode::Prepend {
            self.out.buffer(&super_call);
        }
        let close = self.dialect.stmt("endblock");
        self.out.buffer(&close);
        Ok(())
    }

    fn set_doctype(&mut self, name: Option<&str>) {
        let resolved = self.policy.resolve_doctype(name);
        self.terse = resolved.terse;
        self.xml = resolved.xml;
        self.doctype = Some(resolved.markup);
    }

    fn visit_doctype(&mut self, value: &str) {
        if !value.is_empty() || self.doctype.is_none() {
            self.set_doctype(Some(value));
        }
        self.emit_doctype();
    }

    /// Write the current doctype unless one was already written.
    fn emit_doctype(&mut self) {
        if self.has_emitted_doctype {
            return;
        }
        if let Some(doctype) = self.doctype.as_deref() {
            self.out.buffer(doctype);
            self.has_emitted_doctype = true;
        }
    }

    fn visit_mixin(
        &mut self,
        name: &str,
        args: &str,
        body: Option<&Block>,
        is_call: bool,
    ) -> JadeiteResult<()> {
        self.mixin_depth = self.mixin_depth.saturating_add(1);
        let result = self.render_mixin(name, args, body, is_call);
        self.mixin_depth = self.mixin_depth.saturating_sub(1);
        result
    }

    fn render_mixin(
        &mut self,
        name: &str,
        args: &str,
        body: Option<&Block>,
        is_call: bool,
    ) -> JadeiteResult<()> {
        match (is_call, body) {
            (false, body) => {
                let open = self.dialect.stmt(&format!("macro {}({})", name, args));
                self.out.buffer(&open);
                if let Some(body) = body {
                    self.visit_block(body)?;
                }
                let close = self.dialect.stmt("endmacro");
                self.out.buffer(&close);
            }
            (true, Some(body)) => {
                if self.mixin_depth > 1 {
                    let save = self
                        .dialect
                        .stmt(&format!("set {}=caller", self.caller_name()));
                    self.out.buffer(&save);
                }
                let open = self.dialect.stmt(&format!("call {}({})", name, args));
                self.out.buffer(&open);
                self.visit_block(body)?;
                let close = self.dialect.stmt("endcall");
                self.out.buffer(&close);
            }
            (true, None) => {
                let call = self.dialect.expr(&format!("{}({})", name, args), false);
                self.out.buffer(&call);
            }
        }
        Ok(())
    }

    fn visit_tag(&mut self, tag: &Tag) -> JadeiteResult<()> {
        self.indent_depth = self.indent_depth.saturating_add(1);
        let result = self.render_tag(tag);
        self.indent_depth = self.indent_depth.saturating_sub(1);
        result
    }

    fn render_tag(&mut self, tag: &Tag) -> JadeiteResult<()> {
        let name = tag.name.as_str();
        if !self.has_emitted_first_tag {
            if !self.has_emitted_doctype && name == "html" {
                self.emit_doctype();
            }
            self.has_emitted_first_tag = true;
        }

        let pretty = self.options.pretty_print;
        let inline = self.policy.is_inline(name) || tag.is_inline;
        if pretty && !inline {
            self.newline_indent(self.indent_depth.saturating_sub(1));
        }
        if inline {
            self.inside_inline_string = false;
        }

        let text = tag.text.as_ref().and_then(Block::first_text);
        let slash_marker = text.as_deref().is_some_and(|text| text.starts_with('/'));
        // An explicit marker must be the tag's only content.
        let has_content = tag.code.is_some()
            || !tag.body.is_empty()
            || text
                .as_deref()
                .is_some_and(|text| !text.strip_prefix('/').unwrap_or(text).trim().is_empty());
        if (tag.self_closing || slash_marker) && has_content {
            return Err(JadeiteError::structural(
                "tag",
                StructuralErrorKind::SelfClosingContent {
                    tag: name.to_string(),
                },
            ));
        }
        let closed = tag.self_closing
            || slash_marker
            || (self.policy.is_self_closing(name) && !self.xml);

        let tag_name = if tag.is_dynamic_name {
            self.dialect.interpolate(name, None)
        } else {
            Cow::Borrowed(name)
        };
        self.out.buffer(&format!("<{}", tag_name));
        self.visit_attributes(tag);
        self.out.buffer(if closed && !self.terse { "/>" } else { ">" });
        if closed {
            return Ok(());
        }

        if let Some(code) = &tag.code {
            self.visit_code(code)?;
        }
        if let Some(text) = text.as_deref() {
            let text = self.dialect.interpolate(text.trim_start(), None);
            self.out.buffer(&text);
        }

        let text_only = tag.text_only || tag.body.is_empty();
        self.inside_inline_string = false;
        self.visit_nested(&tag.body)?;

        if pretty && !self.policy.is_inline(name) && !text_only {
            self.newline_indent(self.indent_depth.saturating_sub(1));
        }
        self.out.buffer(&format!("</{}>", tag_name));
        Ok(())
    }

    fn visit_attributes(&mut self, tag: &Tag) {
        let renderer = AttributeRenderer {
            dialect: &self.dialect,
            terse: self.terse,
            use_runtime: self.options.use_runtime_attribute_helper,
        };
        renderer.render(&tag.attrs, &mut self.out);
    }

    fn visit_filter(
        &mut self,
        name: &str,
        is_ast_filter: bool,
        attrs: &BTreeMap<String, String>,
        body: &[String],
    ) -> JadeiteResult<()> {
        let filter = match self.filters.get(name) {
            Some(filter) if filter.is_ast() == is_ast_filter => filter.clone(),
            Some(_) | None => {
                return Err(JadeiteError::structural(
                    "filter",
                    StructuralErrorKind::UnknownFilter {
                        name: name.to_string(),
                        is_ast_filter,
                    },
                ));
            }
        };
        tracing::trace!(filter = name, ast = is_ast_filter, "applying filter");

        let to_error = |source| JadeiteError::Filter {
            name: name.to_string(),
            source,
        };
        match filter {
            Filter::Ast(apply) => {
                let output = apply(body, &*self, attrs).map_err(to_error)?;
                self.out.push(output);
            }
            Filter::Text(apply) => {
                let joined = body.join("\n");
                let text = self.dialect.interpolate(&joined, None).into_owned();
                let mut attrs = attrs.clone();
                let filename = self
                    .options
                    .filename
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                attrs.insert("filename".to_string(), filename);
                let output = apply(text.as_str(), &attrs).map_err(to_error)?;
                self.out.buffer(&output);
            }
        }
        Ok(())
    }

    fn visit_text(&mut self, segments: &[String]) {
        let joined = segments.concat();
        let text = self.dialect.interpolate(&joined, None);
        self.out.buffer(&text);
        if self.options.pretty_print {
            self.out.buffer("\n");
        }
    }

    fn visit_string(&mut self, segments: &[String], is_inline: bool) {
        let joined = segments.concat();
        let text = self.dialect.interpolate(&joined, None);
        self.out.buffer(&text);
        self.inside_inline_string = !is_inline;
    }

    fn visit_comment(&mut self, value: &str, is_buffered: bool) {
        if !is_buffered {
            return;
        }
        if self.options.pretty_print {
            self.newline_indent(self.indent_depth);
        }
        self.out.buffer(&format!("<!--{}-->", value));
    }

    fn visit_block_comment(
        &mut self,
        value: &str,
        body: &Block,
        is_buffered: bool,
    ) -> JadeiteResult<()> {
        if !is_buffered {
            return Ok(());
        }
        let condition = value.trim();
        let is_conditional = condition.starts_with("if");
        if is_conditional {
            self.out.buffer(&format!("<!--[{}]>", condition));
        } else {
            self.out.buffer(&format!("<!--{}", value));
        }
        self.visit_nested(body)?;
        self.out.buffer(if is_conditional { "<![endif]-->" } else { "-->" });
        Ok(())
    }

    /// Append the target extension when the file name has none.
    fn format_path(&self, path: &str) -> String {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name.contains('.') {
            path.to_string()
        } else {
            format!("{}{}", path, self.options.target_extension)
        }
    }

    fn visit_include(&mut self, path: &str) -> JadeiteResult<()> {
        let path = self.format_path(path);
        let Some(loader) = self.loader else {
            let statement = self.dialect.stmt(&format!("include \"{}\"", path));
            self.out.buffer(&statement);
            return Ok(());
        };

        tracing::trace!(path = %path, "resolving include");
        let resolved = self.resolve_include(&path)?;
        if !loader.exists(&resolved) {
            return Err(JadeiteError::structural(
                "include",
                StructuralErrorKind::MissingInclude {
                    path: resolved.display().to_string(),
                },
            ));
        }
        tracing::debug!(path = %resolved.display(), "inlining include");

        let to_error = |source| JadeiteError::Loader {
            path: resolved.display().to_string(),
            source,
        };
        let source = loader.read(&resolved).map_err(to_error)?;
        if path.ends_with(self.options.target_extension.as_str()) {
            let node = loader.parse(&source, &resolved).map_err(to_error)?;
            self.visit(&node)?;
        } else {
            self.out.push(source);
        }
        Ok(())
    }

    /// Absolute paths resolve against the base directory, relative ones
    /// against the directory of the template being compiled.
    fn resolve_include(&self, path: &str) -> JadeiteResult<PathBuf> {
        if let Some(relative) = path.strip_prefix('/') {
            let basedir = self.options.basedir.as_deref().ok_or_else(|| {
                JadeiteError::structural(
                    "include",
                    StructuralErrorKind::MissingBaseDir {
                        path: path.to_string(),
                    },
                )
            })?;
            return Ok(basedir.join(relative));
        }

        let filename = self.options.filename.as_deref().ok_or_else(|| {
            JadeiteError::structural(
                "include",
                StructuralErrorKind::MissingFilename {
                    path: path.to_string(),
                },
            )
        })?;
        let directory = filename.parent().unwrap_or_else(|| Path::new(""));
        Ok(directory.join(path))
    }

    fn visit_conditional(&mut self, conditional: &Conditional) -> JadeiteResult<()> {
        let predicate = conditional.predicate.as_deref().unwrap_or_default();
        let content = match conditional.kind {
            ConditionalKind::If => format!("if {}", predicate),
            ConditionalKind::Unless => format!("if not ({})", predicate),
            ConditionalKind::Elif => format!("elif {}", predicate),
            ConditionalKind::Else => "else".to_string(),
        };
        self.out.push(self.dialect.stmt(&content));

        if let Some(body) = &conditional.body {
            self.visit_nested(body)?;
        }
        for next in &conditional.next {
            self.visit_conditional(next)?;
        }

        if matches!(conditional.kind, ConditionalKind::If | ConditionalKind::Unless) {
            self.out.push(self.dialect.stmt("endif"));
        }
        Ok(())
    }

    fn visit_code(&mut self, code: &Code) -> JadeiteResult<()> {
        if code.is_buffered {
            self.out.push(self.dialect.var(code.value.trim_start(), code.escape));
        } else {
            self.out.push(self.dialect.stmt(&code.value));
        }

        let Some(body) = &code.body else {
            return Ok(());
        };
        self.visit_nested(body)?;
        if !code.is_buffered {
            if let Some(construct) = code.value.split_whitespace().next() {
                if self.policy.is_auto_close(construct) {
                    self.out.push(self.dialect.stmt(&format!("end{}", construct)));
                }
            }
        }
        Ok(())
    }

    fn visit_each(
        &mut self,
        loop_vars: &[String],
        iterable: &str,
        body: &Block,
    ) -> JadeiteResult<()> {
        let header = format!(
            "for {} in {}",
            loop_vars.join(","),
            self.dialect.iter_call(iterable, loop_vars.len())
        );
        self.out.push(self.dialect.stmt(&header));
        self.visit_nested(body)?;
        self.out.push(self.dialect.stmt("endfor"));
        Ok(())
    }
}
