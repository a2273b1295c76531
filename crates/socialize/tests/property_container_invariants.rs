use proptest::prelude::*;
use socialize::{Node, Sequence, Value};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        (i64::from(i32::MAX) + 1..i64::MAX).prop_map(Value::Long),
        (-1.0e9..1.0e9f64).prop_map(Value::Double),
        "[a-zA-Z0-9 ._é\"\\\\]{0,10}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5)
                .prop_map(|items| Value::from(Sequence::from(items))),
            prop::collection::vec(("[a-zA-Z_é]{0,5}", inner), 0..5)
                .prop_map(|entries| Value::from(entries.into_iter().collect::<Node>())),
        ]
    })
}

fn arb_node() -> impl Strategy<Value = Node> {
    prop::collection::vec(("[a-zA-Z0-9_]{0,6}", arb_value()), 0..8)
        .prop_map(|entries| entries.into_iter().collect::<Node>())
}

proptest! {
    #[test]
    fn prop_render_parse_round_trip(node in arb_node()) {
        let text = node.to_string();
        let parsed = Node::parse(&text).expect("rendered text parses");
        prop_assert_eq!(&parsed, &node);
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn prop_keys_are_byte_sorted(keys in prop::collection::vec("[a-zA-Zé_0-9]{0,4}", 0..12)) {
        let node: Node = keys.iter().map(|k| (k.as_str(), 1)).collect();
        let stored: Vec<&str> = node.keys().collect();
        let mut expected: Vec<&str> = keys.iter().map(String::as_str).collect();
        expected.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        expected.dedup();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_defaulted_reads_never_fail(node in arb_node(), key in "[a-zA-Z0-9_]{0,6}") {
        let _ = node.get_int_or(&key, 0);
        let _ = node.get_long_or(&key, 0);
        let _ = node.get_double_or(&key, 0.0);
        let _ = node.get_bool_or(&key, false);
        let _ = node.get_string_or(&key, String::new());
        let _ = node.get_node_or(&key, Node::new());
        let _ = node.get_path_or::<i32>(&format!("{key}.{key}"), 0);
    }

    #[test]
    fn prop_deep_clone_idempotent(node in arb_node()) {
        let once = node.deep_clone();
        prop_assert_eq!(&once, &node);
        prop_assert_eq!(once.deep_clone(), once);
    }

    #[test]
    fn prop_string_reads_match_display(node in arb_node()) {
        for (key, value) in node.iter() {
            match value {
                Value::Null => prop_assert!(node.get_string(key).is_err()),
                other => prop_assert_eq!(node.get_string(key).expect("non-null text"), other.to_string()),
            }
        }
    }
}
