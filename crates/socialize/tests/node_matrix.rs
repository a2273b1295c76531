use socialize::{Error, Node, Sequence, Value};

fn sample() -> Node {
    Node::parse(
        r#"{
            "str": "hello",
            "num_str": " 42 ",
            "neg": -7,
            "big": 9000000000,
            "ratio": 0.25,
            "whole": 3.0,
            "flag": true,
            "flag_str": "FALSE",
            "nothing": null,
            "child": {"x": 1},
            "list": [1, "2", {"y": "z"}]
        }"#,
    )
    .expect("sample must parse")
}

#[test]
fn stored_kinds_follow_number_normalization() {
    let node = sample();
    let kinds: Vec<(&str, &str)> = node.iter().map(|(k, v)| (k, v.kind())).collect();
    assert_eq!(
        kinds,
        [
            ("big", "long"),
            ("child", "node"),
            ("flag", "bool"),
            ("flag_str", "string"),
            ("list", "sequence"),
            ("neg", "int"),
            ("nothing", "null"),
            ("num_str", "string"),
            ("ratio", "double"),
            ("str", "string"),
            ("whole", "double"),
        ]
    );
}

#[test]
fn strict_accessor_matrix() {
    let node = sample();

    assert_eq!(node.get_int("num_str").expect("trimmed int"), 42);
    assert_eq!(node.get_long("big").expect("long"), 9_000_000_000);
    assert_eq!(node.get_long("neg").expect("int widens via text"), -7);
    assert_eq!(node.get_double("neg").expect("int to double"), -7.0);
    assert_eq!(node.get_int("whole").expect("integral double"), 3);
    assert!(!node.get_bool("flag_str").expect("case-insensitive bool"));

    assert_eq!(node.get_string("ratio").expect("double text"), "0.25");
    assert_eq!(node.get_string("whole").expect("double text"), "3");
    assert_eq!(node.get_string("flag").expect("bool text"), "true");
    assert_eq!(node.get_string("child").expect("node text"), r#"{"x":1}"#);
    assert_eq!(
        node.get_string("list").expect("sequence text"),
        r#"[1,"2",{"y":"z"}]"#
    );

    assert!(matches!(node.get_int("str"), Err(Error::Format { .. })));
    assert!(matches!(node.get_int("ratio"), Err(Error::Format { .. })));
    assert!(matches!(node.get_int("big"), Err(Error::Format { .. })));
    assert!(matches!(node.get_int("child"), Err(Error::InvalidCast { .. })));
    assert!(matches!(node.get_int("nothing"), Err(Error::InvalidCast { .. })));
    assert!(matches!(node.get_string("nothing"), Err(Error::InvalidCast { .. })));
    assert!(matches!(node.get_node("list"), Err(Error::InvalidCast { .. })));
    assert!(matches!(node.get_sequence("str"), Err(Error::InvalidCast { .. })));
    assert!(matches!(node.get_bool("absent"), Err(Error::KeyNotFound(_))));
}

#[test]
fn defaulted_accessors_never_fail() {
    let node = sample();
    let keys: Vec<String> = node
        .keys()
        .map(str::to_owned)
        .chain(["absent".to_owned()])
        .collect();
    for key in &keys {
        let _ = node.get_int_or(key, 0);
        let _ = node.get_long_or(key, 0);
        let _ = node.get_double_or(key, 0.0);
        let _ = node.get_bool_or(key, false);
        let _ = node.get_string_or(key, String::new());
        let _ = node.get_node_or(key, Node::new());
        let _ = node.get_sequence_or(key, Sequence::new());
    }
    assert_eq!(node.get_int_or("str", -1), -1);
    assert_eq!(node.get_string_or("nothing", "d".into()), "d");
    assert_eq!(node.get_or::<Option<i64>>("nothing", Some(1)), None);
}

#[test]
fn exact_types_are_returned_unchanged() {
    let node = sample();
    let child: Node = node.get("child").expect("node");
    assert_eq!(child.get_value("x"), Some(&Value::Int(1)));
    let list: Sequence = node.get("list").expect("sequence");
    assert_eq!(list.len(), 3);
    let raw: Value = node.get("ratio").expect("raw value");
    assert_eq!(raw, Value::Double(0.25));
}

#[test]
fn insertion_order_does_not_matter() {
    let mut node = Node::new();
    node.put("b", 1).put("a", 2).put("C", 3);
    assert_eq!(node.keys().collect::<Vec<_>>(), ["C", "a", "b"]);
    assert_eq!(node.to_json_string(), r#"{"C":3,"a":2,"b":1}"#);

    let mut unicode = Node::new();
    unicode.put("é", 1).put("z", 2).put("Z", 3);
    assert_eq!(unicode.keys().collect::<Vec<_>>(), ["Z", "z", "é"]);
}

#[test]
fn put_accepts_every_input_kind() {
    let mut node = Node::new();
    node.put("u8", 1u8)
        .put("u32", 1u32)
        .put("f32", 0.5f32)
        .put("none", None::<String>)
        .put("some", Some(true))
        .put("seq", [1, 2].into_iter().collect::<Sequence>())
        .put("node", Node::new());
    assert_eq!(
        node.to_string(),
        r#"{"f32":0.5,"node":{},"none":null,"seq":[1,2],"some":true,"u32":1,"u8":1}"#
    );
    assert_eq!(node.get_value("u32"), Some(&Value::Long(1)));
}

#[test]
fn path_lookups() {
    let node = Node::parse(r#"{"a":{"b":"5"},"c":{"b":"x"}}"#).expect("parse");
    assert_eq!(node.get_path::<i32>("a.b").expect("coerced"), 5);
    assert_eq!(node.get_path_or::<i32>("c.b", -1), -1);
    assert!(matches!(
        node.get_path::<i32>("a.z"),
        Err(Error::KeyNotFound(path)) if path == "a.z"
    ));

    let nested = sample();
    assert_eq!(nested.get_path::<String>("list.2.y").expect("nested"), "z");
    assert_eq!(nested.lookup::<i32>("list.1").collect::<Vec<_>>(), [2]);
    assert_eq!(nested.lookup_exact::<i32>("list.1").count(), 0);
}

#[test]
fn round_trip_through_text() {
    let text = r#"{"z":[1,2.0,-3.5e-7,"s",null,true],"a":{"k":{}},"m":12345678901}"#;
    let node = Node::parse(text).expect("parse");
    let again = Node::parse(&node.to_string()).expect("reparse");
    assert_eq!(again, node);
    assert_eq!(again.to_string(), node.to_string());
}

#[test]
fn parse_honors_limits() {
    let deep = format!("{}1{}", r#"{"a":"#.repeat(40), "}".repeat(40));
    assert!(Node::parse(&deep).is_ok());
    assert!(matches!(
        Node::parse_with(&deep, &socialize::Limits::strict()),
        Err(Error::Json(socialize::JsonError::NestingTooDeep(32)))
    ));
}
