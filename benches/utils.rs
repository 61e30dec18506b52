use jadeite::{Attribute, Block, Code, Conditional, ConditionalKind, Node, Tag};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Generate `n` random document trees to use in the benchmark.
pub fn generate_random_documents(n: usize) -> Vec<Node> {
    let mut rng = StdRng::seed_from_u64(42); // Fixed seed for reproducibility
    (0..n)
        .map(|_| {
            let sections = rng.random_range(3..8);
            let body = (0..sections).map(|_| random_section(&mut rng)).collect();
            Node::Block(Block::new(vec![
                Node::Doctype {
                    value: Some("5".to_string()),
                },
                Node::Tag(Tag {
                    body: Block::new(body),
                    ..Tag::new("html")
                }),
            ]))
        })
        .collect()
}

fn random_section(rng: &mut StdRng) -> Node {
    let mut attrs = vec![Attribute::constant("class", "\"section\"")];
    if rng.random_bool(0.5) {
        attrs.push(Attribute::dynamic("class", random_string(rng, 3, 8)));
    }
    if rng.random_bool(0.3) {
        attrs.push(Attribute::dynamic("data-id", "item.id"));
    }

    let heading = Node::Tag(Tag {
        text: Some(Block::new(vec![Node::literal(format!(
            "#{{{}}} and more",
            random_string(rng, 4, 10)
        ))])),
        ..Tag::new("h2")
    });
    let list = Node::Each {
        loop_vars: vec!["item".to_string()],
        iterable: random_string(rng, 5, 10),
        body: Block::new(vec![Node::Tag(Tag {
            code: Some(Code {
                value: "item.name".to_string(),
                is_buffered: true,
                escape: true,
                body: None,
            }),
            ..Tag::new("li")
        })]),
    };
    let guarded = Node::Conditional(Conditional {
        kind: ConditionalKind::If,
        predicate: Some(random_string(rng, 3, 6)),
        body: Some(Block::new(vec![list])),
        next: vec![Conditional {
            kind: ConditionalKind::Else,
            predicate: None,
            body: Some(Block::new(vec![Node::text("Nothing here")])),
            next: Vec::new(),
        }],
    });

    Node::Tag(Tag {
        attrs,
        body: Block::new(vec![heading, guarded]),
        ..Tag::new("section")
    })
}

/// Generate a random identifier with length between min and max
fn random_string(rng: &mut StdRng, min_len: usize, max_len: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    let len = rng.random_range(min_len..=max_len);
    (0..len)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect()
}
