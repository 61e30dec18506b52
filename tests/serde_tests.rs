#[cfg(feature = "serde")]
mod serde_tests {
    use jadeite::{
        Block, CompileOptions, Node, StructuralError, StructuralErrorKind, Tag, compile,
    };

    #[test]
    fn test_node_tree_from_json() {
        let json = r#"{
            "Block": {
                "nodes": [
                    { "Doctype": { "value": "5" } },
                    {
                        "Tag": {
                            "name": "p",
                            "attrs": [
                                { "name": "id", "value": "\"intro\"", "is_static": true }
                            ],
                            "text": { "nodes": [ { "Literal": { "text": "Hi #{name}" } } ] }
                        }
                    }
                ]
            }
        }"#;
        let root: Node = serde_json::from_str(json).unwrap();
        let options = CompileOptions::default().with_pretty_print(false);
        assert_eq!(
            compile(&root, &options).unwrap(),
            "<!DOCTYPE html><p id=\"intro\">Hi {{name|escape}}</p>"
        );
    }

    #[test]
    fn test_node_tree_round_trips() {
        let mut tag = Tag::new("ul");
        tag.body = Block::new(vec![Node::Each {
            loop_vars: vec!["item".to_string()],
            iterable: "items".to_string(),
            body: Block::new(vec![Node::text("#{item}")]),
        }]);
        let root = Node::Block(Block::new(vec![Node::Tag(tag)]));

        let serialized = serde_json::to_string(&root).unwrap();
        let deserialized: Node = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, root);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: CompileOptions = serde_json::from_str(
            r#"{
                "pretty_print": false,
                "variable_start": "[[",
                "variable_end": "]]",
                "extra_self_closing_tags": ["wbr"],
                "doctype": "5"
            }"#,
        )
        .unwrap();
        assert_eq!(options.block_start, "{%", "missing fields keep defaults");
        assert_eq!(options.target_extension, ".pug");

        let root = Node::Block(Block::new(vec![
            Node::Tag(Tag::new("wbr")),
            Node::text("#{x}"),
        ]));
        assert_eq!(compile(&root, &options).unwrap(), "<wbr>[[x|escape]]");
    }

    #[test]
    fn test_structural_error_serialization() {
        let error = StructuralError {
            node: "include".to_string(),
            kind: StructuralErrorKind::MissingInclude {
                path: "nav.pug".to_string(),
            },
        };
        let serialized = serde_json::to_string(&error).unwrap();
        assert_eq!(
            serialized,
            r#"{"node":"include","kind":{"MissingInclude":{"path":"nav.pug"}}}"#
        );
        let deserialized: StructuralError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, error);
    }
}
