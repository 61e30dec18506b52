use crate::ast::Attribute;
use crate::buffer::OutputBuffer;
use crate::dialect::Dialect;

const CLASS: &str = "class";

/// Renders the attribute list of one tag.
///
/// Static attributes are written in place. Runs of dynamic attributes are
/// deferred to one call of the runtime attribute helper per run. All `class`
/// contributions of a tag end up in a single `class` attribute.
pub(crate) struct AttributeRenderer<'d> {
    pub(crate) dialect: &'d Dialect,
    pub(crate) terse: bool,
    pub(crate) use_runtime: bool,
}

impl AttributeRenderer<'_> {
    pub(crate) fn render(&self, attrs: &[Attribute], out: &mut OutputBuffer) {
        let mut class_count = 0_usize;
        let mut dynamic_class = false;
        for attr in attrs.iter().filter(|attr| attr.name == CLASS) {
            class_count = class_count.saturating_add(1);
            dynamic_class |= !attr.is_static;
        }
        // A lone static class is just another static attribute.
        let merge_classes = class_count > 1 || dynamic_class;

        let mut pending: Vec<&Attribute> = Vec::new();
        let mut classes: Vec<&Attribute> = Vec::new();
        for attr in attrs {
            let is_class = attr.name == CLASS;
            if is_class && merge_classes {
                classes.push(attr);
            } else if attr.is_static || (!self.use_runtime && !is_class) {
                self.flush(&pending, &[], out);
                pending.clear();
                self.render_in_place(attr, out);
            } else {
                pending.push(attr);
            }
        }
        self.flush(&pending, &classes, out);
    }

    fn render_in_place(&self, attr: &Attribute, out: &mut OutputBuffer) {
        let name = &attr.name;
        if attr.is_boolean_true {
            if self.terse {
                out.push(format!(" {}", name));
            } else {
                out.push(format!(" {}=\"{}\"", name, name));
            }
        } else if self.use_runtime || attr.is_static {
            out.push(format!(" {}={}", name, attr.value));
        } else {
            out.push(format!(" {}=\"{}\"", name, self.dialect.var(&attr.value, true)));
        }
    }

    /// Emit one helper call for `pending` plus the merged `classes`.
    fn flush(&self, pending: &[&Attribute], classes: &[&Attribute], out: &mut OutputBuffer) {
        let mut pairs = Vec::new();
        let mut class_parts = Vec::new();
        for attr in pending.iter().chain(classes) {
            let value = if attr.is_boolean_true {
                "True"
            } else {
                attr.value.as_str()
            };
            if attr.name == CLASS {
                class_parts.push(format!("({})", value));
            } else {
                pairs.push(format!("('{}',({}))", attr.name, value));
            }
        }
        if !class_parts.is_empty() {
            pairs.push(format!("('{}', ({}))", CLASS, class_parts.join(" , ")));
        }
        if pairs.is_empty() {
            return;
        }

        let mut params = Vec::new();
        if self.terse {
            params.push("terse=True".to_string());
        }
        params.push(format!("attrs=[{}]", pairs.join(", ")));
        out.push(self.dialect.attrs_call(&params.join(", ")));
    }
}
