//! PHP `serialize()` wire format and session store codec.
//!
//! Converts between [`PhpValue`] trees and the text format produced by
//! PHP's `serialize()` / consumed by `unserialize()`, plus the flat
//! `key|value` session store variant used by `session_encode()`.
//!
//! Wire grammar:
//!
//! | Kind   | Encoding |
//! |--------|----------|
//! | null   | `N;` |
//! | bool   | `b:0;` / `b:1;` |
//! | int    | `i:<decimal>;` |
//! | float  | `d:<repr>;` (`NAN`, `INF`, `-INF` special literals) |
//! | string | `s:<utf8-byte-length>:"<raw bytes>";` |
//! | array  | `a:<count>:{<key><value>…}` |
//! | object | `o:<class-byte-length>:"<class>":<count>:{<key><value>…}` |
//!
//! Lists and maps share the `a:` tag. The decoder rebuilds a list only when
//! the decoded keys are exactly the integers `0..n-1` in order; anything
//! else becomes an ordered map. String length prefixes count UTF-8 bytes,
//! never characters: `s:9:"日本語";` carries three 3-byte characters.
//!
//! Back-references (`R:`/`r:`), custom serializers (`C:`) and enum cases
//! (`E:`) are out of scope and rejected as unknown tags.

mod decoder;
mod encoder;
mod error;
mod session;
mod utf8;
mod value;

pub use decoder::{unserialize, PhpDecoder};
pub use encoder::{serialize, serialize_with_class_names, PhpEncoder};
pub use error::{PhpDecodeError, PhpEncodeError};
pub use session::{decode_session, encode_session};
pub use value::{PhpKey, PhpObject, PhpValue};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ---------------------------------------------------------------- round trips

    #[test]
    fn scalar_roundtrips() {
        let values = vec![
            PhpValue::Null,
            PhpValue::Bool(true),
            PhpValue::Bool(false),
            PhpValue::Int(0),
            PhpValue::Int(42),
            PhpValue::Int(-2147483648),
            PhpValue::Float(1.5),
            PhpValue::Float(-0.25),
            PhpValue::Float(f64::INFINITY),
            PhpValue::Str(String::new()),
            PhpValue::Str("hello, world".into()),
        ];
        for v in values {
            let encoded = serialize(&v).unwrap();
            let decoded = unserialize(&encoded).unwrap();
            assert_eq!(decoded, v, "roundtrip failed for {v:?} via {encoded}");
        }
    }

    #[test]
    fn nan_roundtrips_to_nan() {
        let encoded = serialize(&PhpValue::Float(f64::NAN)).unwrap();
        assert_eq!(encoded, "d:NAN;");
        match unserialize(&encoded).unwrap() {
            PhpValue::Float(f) => assert!(f.is_nan()),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn list_roundtrip_preserves_order() {
        let v = PhpValue::Array(vec![
            PhpValue::Str("a".into()),
            PhpValue::Str("b".into()),
            PhpValue::Str("c".into()),
        ]);
        assert_eq!(unserialize(&serialize(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn dict_roundtrip_preserves_insertion_order() {
        let v = PhpValue::Dict(vec![
            (PhpKey::Str("z".into()), PhpValue::Int(1)),
            (PhpKey::Str("a".into()), PhpValue::Int(2)),
            (PhpKey::Int(10), PhpValue::Null),
        ]);
        assert_eq!(unserialize(&serialize(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn nested_structures_roundtrip() {
        let v = PhpValue::Dict(vec![
            (
                PhpKey::Str("list".into()),
                PhpValue::Array(vec![PhpValue::Int(1), PhpValue::Float(2.5)]),
            ),
            (
                PhpKey::Str("obj".into()),
                PhpValue::Object(PhpObject::new(
                    "Inner",
                    vec![(PhpKey::Str("deep".into()), PhpValue::Array(vec![]))],
                )),
            ),
        ]);
        assert_eq!(unserialize(&serialize(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn object_tag_roundtrip() {
        let v = PhpValue::Object(PhpObject::new(
            "Foo",
            vec![(PhpKey::Str("x".into()), PhpValue::Int(1))],
        ));
        let encoded = serialize(&v).unwrap();
        assert_eq!(encoded, "o:3:\"Foo\":1:{s:1:\"x\";i:1;}");
        assert_eq!(unserialize(&encoded).unwrap(), v);
    }

    // ---------------------------------------------------------------- wire literals

    #[test]
    fn literal_examples() {
        assert_eq!(serialize(&PhpValue::Int(42)).unwrap(), "i:42;");
        assert_eq!(serialize(&PhpValue::Float(f64::NAN)).unwrap(), "d:NAN;");
        assert_eq!(serialize(&PhpValue::Str("A".into())).unwrap(), "s:1:\"A\";");
        assert_eq!(
            serialize(&PhpValue::Array(vec![
                PhpValue::Str("a".into()),
                PhpValue::Str("b".into()),
            ]))
            .unwrap(),
            "a:2:{i:0;s:1:\"a\";i:1;s:1:\"b\";}"
        );
        assert!(unserialize("s:5:\"ab\";").is_err());
    }

    // ---------------------------------------------------------------- utf-8 exactness

    #[test]
    fn utf8_length_prefix_is_byte_count() {
        for s in ["é", "€", "日本語", "😀", "a€b", "naïve touché"] {
            let v = PhpValue::Str(s.to_string());
            let encoded = serialize(&v).unwrap();
            let prefix = format!("s:{}:", s.len());
            assert!(
                encoded.starts_with(&prefix),
                "expected {encoded} to start with {prefix}"
            );
            assert_eq!(unserialize(&encoded).unwrap(), v);
        }
    }

    // ---------------------------------------------------------------- duality

    #[test]
    fn array_map_duality() {
        // Sequential keys rebuild a list.
        let list = PhpValue::Array(vec![
            PhpValue::Str("a".into()),
            PhpValue::Str("b".into()),
            PhpValue::Str("c".into()),
        ]);
        assert_eq!(unserialize(&serialize(&list).unwrap()).unwrap(), list);

        // Non-sequential keys rebuild a map.
        assert_eq!(
            unserialize("a:2:{i:0;s:1:\"x\";i:2;s:1:\"y\";}").unwrap(),
            PhpValue::Dict(vec![
                (PhpKey::Int(0), PhpValue::Str("x".into())),
                (PhpKey::Int(2), PhpValue::Str("y".into())),
            ])
        );

        // The ambiguity is real: a map with sequential integer keys decodes
        // as a list. Documented, intentional.
        let ambiguous = PhpValue::Dict(vec![
            (PhpKey::Int(0), PhpValue::Str("a".into())),
            (PhpKey::Int(1), PhpValue::Str("b".into())),
        ]);
        assert_eq!(
            unserialize(&serialize(&ambiguous).unwrap()).unwrap(),
            PhpValue::Array(vec![PhpValue::Str("a".into()), PhpValue::Str("b".into())])
        );
    }

    // ---------------------------------------------------------------- class names

    #[test]
    fn class_name_mapping_applies_on_encode() {
        let mut names = std::collections::HashMap::new();
        names.insert("Point".to_string(), "Geo\\Point".to_string());
        let v = PhpValue::Object(PhpObject::new(
            "Point",
            vec![(PhpKey::Str("x".into()), PhpValue::Int(3))],
        ));
        let encoded = serialize_with_class_names(&v, &names).unwrap();
        assert_eq!(encoded, "o:9:\"Geo\\Point\":1:{s:1:\"x\";i:3;}");
        match unserialize(&encoded).unwrap() {
            PhpValue::Object(obj) => assert_eq!(obj.class, "Geo\\Point"),
            other => panic!("expected object, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------- session

    #[test]
    fn session_roundtrip() {
        let pairs = vec![
            ("user".to_string(), PhpValue::Str("admin".into())),
            (
                "cart".to_string(),
                PhpValue::Array(vec![PhpValue::Int(99), PhpValue::Int(100)]),
            ),
            ("seen".to_string(), PhpValue::Bool(false)),
        ];
        let encoded = encode_session(&pairs).unwrap();
        assert_eq!(decode_session(&encoded).unwrap(), pairs);
    }

    #[test]
    fn session_skips_pipe_keys_on_encode() {
        let pairs = vec![
            ("bad|key".to_string(), PhpValue::Int(1)),
            ("good".to_string(), PhpValue::Int(2)),
        ];
        let encoded = encode_session(&pairs).unwrap();
        assert_eq!(
            decode_session(&encoded).unwrap(),
            vec![("good".to_string(), PhpValue::Int(2))]
        );
    }

    // ---------------------------------------------------------------- serde_json bridge

    #[test]
    fn json_to_php_and_back() {
        let v = json!({"a": 1, "b": [true, null, "x"], "c": {"nested": 2.5}});
        let php = PhpValue::from(v.clone());
        assert_eq!(
            php,
            PhpValue::Dict(vec![
                (PhpKey::Str("a".into()), PhpValue::Int(1)),
                (
                    PhpKey::Str("b".into()),
                    PhpValue::Array(vec![
                        PhpValue::Bool(true),
                        PhpValue::Null,
                        PhpValue::Str("x".into()),
                    ])
                ),
                (
                    PhpKey::Str("c".into()),
                    PhpValue::Dict(vec![(PhpKey::Str("nested".into()), PhpValue::Float(2.5))])
                ),
            ])
        );
        assert_eq!(serde_json::Value::from(php), v);
    }

    #[test]
    fn json_object_key_order_survives() {
        let v = json!({"z": 1, "a": 2, "m": 3});
        let php = PhpValue::from(v);
        let encoded = serialize(&php).unwrap();
        assert_eq!(encoded, "a:3:{s:1:\"z\";i:1;s:1:\"a\";i:2;s:1:\"m\";i:3;}");
    }

    #[test]
    fn php_object_converts_to_tagged_json() {
        let v = PhpValue::Object(PhpObject::new(
            "Foo",
            vec![(PhpKey::Str("x".into()), PhpValue::Int(1))],
        ));
        assert_eq!(serde_json::Value::from(v), json!({"Foo": {"x": 1}}));
    }

    #[test]
    fn int_keys_convert_to_json_string_keys() {
        let v = PhpValue::Dict(vec![
            (PhpKey::Int(0), PhpValue::Str("a".into())),
            (PhpKey::Int(5), PhpValue::Str("b".into())),
        ]);
        assert_eq!(serde_json::Value::from(v), json!({"0": "a", "5": "b"}));
    }

    // ---------------------------------------------------------------- properties

    fn arb_php_value() -> impl Strategy<Value = PhpValue> {
        let leaf = prop_oneof![
            Just(PhpValue::Null),
            any::<bool>().prop_map(PhpValue::Bool),
            any::<i32>().prop_map(|n| PhpValue::Int(i64::from(n))),
            (-1.0e15..1.0e15f64).prop_map(PhpValue::Float),
            "[a-zA-Z0-9 ]{0,10}".prop_map(PhpValue::Str),
            "[é€日本😀]{0,4}".prop_map(PhpValue::Str),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(PhpValue::Array),
                // String keys keep dicts clear of the sequential-integer-key
                // ambiguity; non-empty because `a:0:{}` decodes as a list.
                prop::collection::vec(("[a-z]{1,6}", inner.clone()), 1..4).prop_map(|pairs| {
                    PhpValue::Dict(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (PhpKey::Str(k), v))
                            .collect(),
                    )
                }),
                ("[A-Z][a-z]{0,6}", prop::collection::vec(("[a-z]{1,6}", inner), 0..3)).prop_map(
                    |(class, props)| {
                        PhpValue::Object(PhpObject::new(
                            class,
                            props
                                .into_iter()
                                .map(|(k, v)| (PhpKey::Str(k), v))
                                .collect(),
                        ))
                    }
                ),
            ]
        })
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_generated_values(v in arb_php_value()) {
            let encoded = serialize(&v).unwrap();
            let decoded = unserialize(&encoded).unwrap();
            prop_assert_eq!(decoded, v);
        }

        #[test]
        fn string_prefix_always_matches_byte_length(s in "\\PC{0,20}") {
            let encoded = serialize(&PhpValue::Str(s.clone())).unwrap();
            let expected_prefix = format!("s:{}:", s.len());
            prop_assert!(encoded.starts_with(&expected_prefix));
            prop_assert_eq!(unserialize(&encoded).unwrap(), PhpValue::Str(s));
        }

        #[test]
        fn session_roundtrip_holds(
            pairs in prop::collection::vec(("[a-z]{1,8}", arb_php_value()), 0..4)
        ) {
            let encoded = encode_session(&pairs).unwrap();
            prop_assert_eq!(decode_session(&encoded).unwrap(), pairs);
        }
    }
}
