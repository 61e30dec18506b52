//! Compiled output rendered by a real Jinja implementation.


use fixtures::{compile_flat, tag_with_attrs, tag_with_text};
use jadeite::{Attribute, Block, BlockMode, Code, Conditional, ConditionalKind, Node};
use minijinja::value::{Kwargs, Value, ValueKind};
use minijinja::{Environment, Error, context};

/// Runtime side of the attribute helper: renders `(name, value)` pairs, joining
/// sequence values with spaces.
fn attrs_helper(kwargs: Kwargs) -> Result<Value, Error> {
    let terse: Option<bool> = kwargs.get("terse")?;
    let attrs: Vec<Value> = kwargs.get("attrs")?;
    kwargs.assert_all_used()?;

    let mut out = String::new();
    for pair in attrs {
        let name = pair.get_item(&Value::from(0))?.to_string();
        let value = pair.get_item(&Value::from(1))?;
        if value.kind() == ValueKind::Bool {
            if value.is_true() {
                if terse.unwrap_or(false) {
                    out.push_str(&format!(" {}", name));
                } else {
                    out.push_str(&format!(" {0}=\"{0}\"", name));
                }
            }
            continue;
        }
        let rendered = if value.kind() == ValueKind::Seq {
            value
                .try_iter()?
                .map(|part| part.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            value.to_string()
        };
        out.push_str(&format!(" {}=\"{}\"", name, rendered));
    }
    Ok(Value::from_safe_string(out))
}

/// Runtime side of the iteration adapter: maps yield `(key, value)` pairs
/// when more than one loop variable is bound.
fn iter_helper(items: Value, arity: usize) -> Result<Value, Error> {
    if arity < 2 || items.kind() != ValueKind::Map {
        return Ok(items);
    }
    let mut pairs = Vec::new();
    for key in items.try_iter()? {
        let value = items.get_item(&key)?;
        pairs.push(Value::from(vec![key, value]));
    }
    Ok(Value::from(pairs))
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.add_function("__attrs", attrs_helper);
    env.add_function("__iter", iter_helper);
    env
}

fn render(nodes: Vec<Node>, ctx: Value) -> String {
    let source = compile_flat(nodes).unwrap();
    environment().render_str(&source, ctx).unwrap()
}

#[test]
#[ntest::timeout(1000)]
fn test_each_over_mapping_binds_key_and_value() {
    let each = Node::Each {
        loop_vars: vec!["k".to_string(), "v".to_string()],
        iterable: "items".to_string(),
        body: Block::new(vec![Node::text("#{k}=#{v};")]),
    };
    let items = std::collections::BTreeMap::from([("a", 1), ("b", 2)]);
    assert_eq!(render(vec![each], context! { items }), "a=1;b=2;");
}

#[test]
#[ntest::timeout(1000)]
fn test_each_over_sequence() {
    let each = Node::Each {
        loop_vars: vec!["name".to_string()],
        iterable: "names".to_string(),
        body: Block::new(vec![tag_with_text("li", "#{name}")]),
    };
    assert_eq!(
        render(vec![each], context! { names => vec!["ann", "bo"] }),
        "<li>ann</li><li>bo</li>"
    );
}

#[test]
#[ntest::timeout(1000)]
fn test_conditional_chain_picks_one_branch() {
    let branch = |kind, predicate: Option<&str>, text: &str| Conditional {
        kind,
        predicate: predicate.map(str::to_string),
        body: Some(Block::new(vec![Node::literal(text)])),
        next: Vec::new(),
    };
    let mut chain = branch(ConditionalKind::If, Some("a"), "A");
    chain.next = vec![
        branch(ConditionalKind::Elif, Some("b"), "B"),
        branch(ConditionalKind::Else, None, "C"),
    ];
    let tree = || vec![Node::Conditional(chain.clone())];

    assert_eq!(render(tree(), context! { a => true, b => true }), "A");
    assert_eq!(render(tree(), context! { a => false, b => true }), "B");
    assert_eq!(render(tree(), context! { a => false, b => false }), "C");
}

#[test]
#[ntest::timeout(1000)]
fn test_unless_renders_when_predicate_is_false() {
    let unless = Conditional {
        kind: ConditionalKind::Unless,
        predicate: Some("user.admin".to_string()),
        body: Some(Block::new(vec![Node::literal("guest")])),
        next: Vec::new(),
    };
    let tree = || vec![Node::Conditional(unless.clone())];
    assert_eq!(render(tree(), context! { user => context! { admin => false } }), "guest");
    assert_eq!(render(tree(), context! { user => context! { admin => true } }), "");
}

#[test]
#[ntest::timeout(1000)]
fn test_mixin_with_and_without_caller_block() {
    let definition = Node::Mixin {
        name: "card".to_string(),
        args: "title".to_string(),
        body: Some(Block::new(vec![
            tag_with_text("div", "#{title}"),
            Node::CodeBlock {
                name: "content".to_string(),
                mode: BlockMode::Replace,
                body: Block::default(),
            },
        ])),
        is_call: false,
    };
    let call_with_body = Node::Mixin {
        name: "card".to_string(),
        args: "'Hi'".to_string(),
        body: Some(Block::new(vec![tag_with_text("p", "inner")])),
        is_call: true,
    };
    let bare_call = Node::Mixin {
        name: "card".to_string(),
        args: "'Yo'".to_string(),
        body: None,
        is_call: true,
    };

    assert_eq!(
        render(vec![definition.clone(), call_with_body], context! {}),
        "<div>Hi</div><p>inner</p>"
    );
    assert_eq!(render(vec![definition, bare_call], context! {}), "<div>Yo</div>");
}

#[test]
#[ntest::timeout(1000)]
fn test_attribute_helper_merges_classes() {
    let link = tag_with_attrs(
        "a",
        vec![
            Attribute::dynamic("href", "url"),
            Attribute::constant("class", "\"btn\""),
            Attribute::dynamic("class", "extra"),
        ],
    );
    assert_eq!(
        render(vec![link], context! { url => "/home", extra => "primary" }),
        "<a href=\"/home\" class=\"btn primary\"></a>"
    );
}

#[test]
#[ntest::timeout(1000)]
fn test_escaping_follows_interpolation_marker() {
    let nodes = vec![tag_with_text("p", "#{html} !{html}")];
    assert_eq!(
        render(nodes, context! { html => "<b>" }),
        "<p>&lt;b&gt; <b></p>"
    );
}

#[test]
#[ntest::timeout(1000)]
fn test_statement_code_with_body() {
    let code = Node::Code(Code {
        value: "for n in range(3)".to_string(),
        is_buffered: false,
        escape: false,
        body: Some(Block::new(vec![Node::Code(Code {
            value: "n".to_string(),
            is_buffered: true,
            escape: true,
            body: None,
        })])),
    });
    assert_eq!(render(vec![code], context! {}), "012");
}

#[test]
#[ntest::timeout(1000)]
fn test_appended_block_keeps_inherited_content() {
    let page = compile_flat(vec![
        Node::Extends {
            path: "layout".to_string(),
        },
        Node::CodeBlock {
            name: "content".to_string(),
            mode: BlockMode::Append,
            body: Block::new(vec![tag_with_text("p", "more")]),
        },
    ])
    .unwrap();

    let mut env = environment();
    env.add_template("layout.pug", "<main>{% block content %}base{% endblock %}</main>")
        .unwrap();
    env.add_template("page.pug", &page).unwrap();
    let output = env.get_template("page.pug").unwrap().render(context! {}).unwrap();
    assert_eq!(output, "<main>base<p>more</p></main>");
}
