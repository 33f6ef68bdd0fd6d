// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use typesynth::*;

#[test]
fn serialize_number() -> Result<()> {
    // Check that integer values are serialized without fractional part
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.0))?, "1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.0))?, "-1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-0.0))?, "0");
    assert_eq!(serde_json::to_string_pretty(&Value::from(2.5))?, "2.5");
    assert_eq!(serde_json::to_string_pretty(&Value::from(f64::NAN))?, "null");
    Ok(())
}

#[test]
fn number_equality() -> Result<()> {
    assert_eq!(Number::from(0.0), Number::from(-0.0));
    assert_eq!(Number::from(f64::NAN), Number::from(f64::NAN));
    assert!(Number::from(-1) < Number::from(0.5));
    assert_eq!(Number::from(1e300).as_i64(), None);
    assert_eq!(Number::from(7).as_i64(), Some(7));
    Ok(())
}

#[test]
fn number_rendering() -> Result<()> {
    assert_eq!(Number::from(-0.0).to_string(), "0");
    assert_eq!(Number::from(2.5).to_string(), "2.5");
    assert_eq!(Number::from(9_007_199_254_740_994.0).to_string(), "9007199254740994");
    assert_eq!(Number::from(1e20).to_string(), "100000000000000000000");
    assert_eq!(Number::from(1e21).to_string(), "1e+21");
    assert_eq!(Number::from(-2.5e25).to_string(), "-2.5e+25");
    assert_eq!(Number::from(0.000001).to_string(), "0.000001");
    assert_eq!(Number::from(1.5e-7).to_string(), "1.5e-7");
    assert_eq!(Number::from(f64::INFINITY).to_string(), "Infinity");
    assert_eq!(Number::from(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(Number::from(f64::NAN).to_string(), "NaN");

    // Literal types use the same rendering.
    assert_eq!(Type::of(&Value::from(1e21)).to_definition(), "1e+21");
    Ok(())
}

#[test]
fn tagged_values_round_trip_through_json() -> Result<()> {
    let json = r#"[null, {"$kind": "undefined"}, {"$kind": "function", "name": "cb"}, {"a": [true]}]"#;
    let v = Value::from_json_str(json)?;

    assert!(v[0].is_null());
    assert!(v[1].is_undefined());
    assert_eq!(v[2], Value::function("cb"));
    assert_eq!(v[3]["a"][0], Value::from(true));
    assert_eq!(v[3].kind(), Kind::Object);

    let back = serde_json::to_string(&v)?;
    assert_eq!(
        back,
        r#"[null,{"$kind":"undefined"},{"$kind":"function","name":"cb"},{"a":[true]}]"#
    );
    Ok(())
}

#[test]
fn unknown_kind_tags_are_rejected() -> Result<()> {
    let raw: serde_json::Value = serde_json::from_str(r#"{"nested": [{"$kind": "bigint"}]}"#)?;
    match Value::from_wire(&raw) {
        Err(InferError::UnsupportedValueKind { kind }) => assert_eq!(kind, "bigint"),
        other => panic!("unexpected {other:?}"),
    }

    assert!(Value::from_json_str(r#"{"$kind": 1}"#).is_err());
    Ok(())
}

#[test]
fn yaml_values() -> Result<()> {
    let v = Value::from_yaml_str(
        r#"
name: x
tags: [a, b]
missing:
  $kind: undefined
"#,
    )?;
    assert_eq!(v["name"], Value::from("x"));
    assert_eq!(v["tags"][1], Value::from("b"));
    assert!(v["missing"].is_undefined());
    // Indexing past the end is undefined rather than a panic.
    assert!(v["tags"][5].is_undefined());
    assert!(v["nope"]["deeper"].is_undefined());
    Ok(())
}

#[test]
fn record_keys_keep_insertion_order() -> Result<()> {
    let v = Value::from_json_str(r#"{"z": 1, "a": 2, "m": 3}"#)?;
    assert_eq!(serde_json::to_string(&v)?, r#"{"z":1,"a":2,"m":3}"#);
    Ok(())
}

#[test]
fn paths() -> Result<()> {
    let v = Value::from_json_str(r#"{"a": [10, {"b": "deep"}]}"#)?;
    let path = [
        PathSegment::Key("a".into()),
        PathSegment::Index(1),
        PathSegment::Key("b".into()),
    ];
    assert_eq!(v.get_path(&path), &Value::from("deep"));
    assert_eq!(
        path.iter().map(|s| s.to_string()).collect::<String>(),
        ".a[1].b"
    );

    assert!(v["a"].is_container_for(&PathSegment::Index(0)));
    assert!(!v["a"].is_container_for(&PathSegment::Key("x".into())));
    Ok(())
}

#[test]
fn make_or_get_value_mut_creates_containers() -> Result<()> {
    let original = Value::from_json_str(r#"{"a": 1}"#)?;
    let mut v = original.clone();

    *v.make_or_get_value_mut(&[PathSegment::Key("list".into()), PathSegment::Index(2)]) =
        Value::from("x");

    assert_eq!(
        serde_json::to_string(&v)?,
        r#"{"a":1,"list":[{"$kind":"undefined"},{"$kind":"undefined"},"x"]}"#
    );

    // Clones are isolated copies.
    assert_eq!(serde_json::to_string(&original)?, r#"{"a":1}"#);

    // A scalar in the way is replaced.
    *v.make_or_get_value_mut(&[PathSegment::Key("a".into()), PathSegment::Key("b".into())]) =
        Value::Null;
    assert_eq!(v["a"]["b"], Value::Null);
    Ok(())
}

#[test]
fn without_segment() -> Result<()> {
    let v = Value::from_json_str(r#"{"x": 0, "y": 1, "z": 2}"#)?;
    let stripped = v.without_segment(&PathSegment::Key("y".into()));
    assert_eq!(serde_json::to_string(&stripped)?, r#"{"x":0,"z":2}"#);
    assert_eq!(serde_json::to_string(&v)?, r#"{"x":0,"y":1,"z":2}"#);

    let a = Value::from_json_str("[1, 2, 3]")?;
    assert_eq!(a.without_segment(&PathSegment::Index(1)).as_array()?.len(), 1);
    assert_eq!(a.without_segment(&PathSegment::Index(7)), a);

    // Mismatched segments leave the value alone.
    assert_eq!(a.without_segment(&PathSegment::Key("x".into())), a);
    Ok(())
}

#[test]
fn kinds() -> Result<()> {
    assert_eq!(Kind::from_typeof_tag("object"), &[Kind::Null, Kind::Array, Kind::Object]);
    assert!(Kind::from_typeof_tag("symbol").is_empty());
    for kind in Kind::ALL {
        assert!(Kind::from_typeof_tag(kind.typeof_tag()).contains(&kind));
    }
    assert_eq!(Value::from(vec![]).kind(), Kind::Array);
    assert_eq!(Kind::Function.to_string(), "function");
    Ok(())
}
