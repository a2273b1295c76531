use proptest::prelude::*;
use serde_json::json;
use socialize_json::{parse, parse_with, to_canonical_string, JsonError, JsonToken, Limits};

#[test]
fn canonical_output_matrix() {
    let cases = [
        ("{}", "{}"),
        ("[]", "[]"),
        (" { \"b\" : 1 , \"a\" : 2 } ", r#"{"a":2,"b":1}"#),
        (r#"{"b":"x","C":true,"a":null}"#, r#"{"C":true,"a":null,"b":"x"}"#),
        (r#"{"z":{"y":[3,{"b":1,"a":0}]}}"#, r#"{"z":{"y":[3,{"a":0,"b":1}]}}"#),
        ("[1.50, 2e2, -0.0]", "[1.5,200.0,-0.0]"),
        (r#""\u00e9\n""#, "\"é\\n\""),
    ];

    for (input, expected) in cases {
        let token = parse(input).expect("valid json");
        assert_eq!(to_canonical_string(&token), expected, "input {input}");
    }
}

#[test]
fn canonical_output_is_a_fixed_point() {
    let text = r#"{"k":[1,2.5,"s",null,true,{"b":{},"a":[]}],"A":-7}"#;
    let once = to_canonical_string(&parse(text).unwrap());
    let twice = to_canonical_string(&parse(&once).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn serde_value_source_order_does_not_leak() {
    // preserve_order is enabled for tests, so the map keeps insertion order.
    let value = json!({"b": 1, "a": {"d": 2, "c": 3}});
    let token = JsonToken::from(value);
    assert_eq!(to_canonical_string(&token), r#"{"a":{"c":3,"d":2},"b":1}"#);
}

#[test]
fn error_matrix() {
    assert!(matches!(parse("{"), Err(JsonError::Invalid(_))));
    assert!(matches!(parse("[1] [2]"), Err(JsonError::TrailingData(4))));
    assert!(matches!(parse("\"\\x\""), Err(JsonError::Escape(_))));

    let strict = Limits::strict();
    let deep = "[".repeat(40) + &"]".repeat(40);
    assert!(parse(&deep).is_ok());
    assert!(matches!(
        parse_with(&deep, &strict),
        Err(JsonError::NestingTooDeep(32))
    ));
}

#[test]
fn invalid_utf8_is_rejected() {
    let decoder = socialize_json::JsonDecoder::default();
    assert!(matches!(
        decoder.decode(b"\"\xff\""),
        Err(JsonError::InvalidUtf8)
    ));
}

fn arb_token() -> impl Strategy<Value = JsonToken> {
    let leaf = prop_oneof![
        Just(JsonToken::Null),
        any::<bool>().prop_map(JsonToken::Bool),
        any::<i64>().prop_map(JsonToken::Integer),
        (i64::MAX as u64 + 1..=u64::MAX).prop_map(JsonToken::UInteger),
        (-1.0e12..1.0e12f64).prop_map(JsonToken::Float),
        "[a-zA-Z0-9 é\"\\\\\n]{0,12}".prop_map(JsonToken::Str),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(JsonToken::Array),
            prop::collection::btree_map("[a-zA-Z_]{0,6}", inner, 0..6)
                .prop_map(|m| JsonToken::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Decoding canonical output gives back the same tree.
    #[test]
    fn prop_encode_decode_round_trip(token in arb_token()) {
        let text = to_canonical_string(&token);
        let back = parse(&text).expect("canonical output parses");
        prop_assert_eq!(back, token);
    }
}
