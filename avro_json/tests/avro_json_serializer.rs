// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use avro_json::{AvroResult, Deserializer, Schema, Serializer, error::Details, types::Value};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rstest::rstest;

const ALL_FIELDS_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "all_field",
    "namespace": "com.some.thing",
    "fields": [
        {"name": "fruit", "type": {"name": "Fruit", "type": "enum", "symbols": ["ORANGE", "APPLE", "PINEAPPLE"]}},
        {"name": "fint", "type": "int"},
        {"name": "flong", "type": "long"},
        {"name": "fstring", "type": "string"},
        {"name": "ffixed", "type": {"name": "fixed_16", "size": 16, "type": "fixed"}},
        {"name": "frec", "type": {"name": "Rec", "type": "record", "fields": [{"name": "subfint", "type": "int"}]}},
        {"name": "funion_null", "type": ["int", "null"]},
        {"name": "ffloat", "type": "float"},
        {"name": "fdouble", "type": "double"},
        {"name": "intarr", "type": {"type": "array", "items": "int"}},
        {"name": "intmap", "type": {"type": "map", "values": "int"}}
    ]
}
"#;

const UNION_RECORDS_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "unions",
    "fields": [
        {
            "name": "funion_rec",
            "type": [
                {"type": "record", "name": "rec1", "fields": [{"name": "field", "type": "int"}]},
                {
                    "type": "record",
                    "namespace": "example.avro",
                    "name": "rec2",
                    "fields": [{"name": "field", "type": "string"}]
                }
            ]
        }
    ]
}
"#;

const USER_SCHEMA: &str = r#"
{
    "namespace": "example.avro",
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "favorite_number", "type": ["int", "null"]},
        {"name": "favorite_color", "type": ["string", "null"]}
    ]
}
"#;

const NESTED_UNIONS_SCHEMA: &str = r#"
{
    "namespace": "nested",
    "name": "OuterType",
    "type": "record",
    "fields": [{
        "name": "outer",
        "type": ["null", {
            "name": "MiddleType",
            "type": "record",
            "fields": [{
                "name": "middle",
                "type": ["null", {
                    "name": "InnerType",
                    "type": "record",
                    "fields": [{"name": "inner", "type": "int"}]
                }]
            }]
        }]
    }]
}
"#;

const WITH_FIXED_SCHEMA: &str = r#"
{
    "namespace": "example.avro",
    "type": "record",
    "name": "WithFixed",
    "fields": [{"name": "ffixed", "type": {"name": "fixed_16", "size": 16, "type": "fixed"}}]
}
"#;

const WITH_BYTES_SCHEMA: &str = r#"
{
    "namespace": "example.avro",
    "type": "record",
    "name": "WithBytes",
    "fields": [{"name": "fbytes", "type": "bytes"}]
}
"#;

fn all_fields_value() -> Value {
    Value::from_iter([
        ("fruit", Value::from("ORANGE")),
        ("fint", Value::Int(1)),
        ("flong", Value::Int(1)),
        ("ffloat", Value::Float(1.0)),
        ("fdouble", Value::Float(2.0)),
        ("fstring", Value::from("hi there")),
        ("ffixed", Value::from(b"1234567890123456".to_vec())),
        ("frec", Value::from_iter([("subfint", 2)])),
        ("funion_null", Value::Null),
        ("intarr", Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)])),
        ("intmap", Value::from_iter([("one", 1)])),
    ])
}

/// Encodes `value`, checks the text, and checks that decoding the text gives `decoded` back.
fn assert_round_trip(
    schema: &Schema,
    value: &Value,
    json: &str,
    decoded: &Value,
) -> AvroResult<()> {
    let encoded = Serializer::new(schema)?.to_json(value)?;
    assert_eq!(encoded, json);
    assert_eq!(&Deserializer::new(schema)?.from_json(&encoded)?, decoded);
    Ok(())
}

#[test]
fn all_supported_types() -> AvroResult<()> {
    let schema = Schema::parse_str(ALL_FIELDS_SCHEMA)?;
    let value = all_fields_value();
    assert_round_trip(
        &schema,
        &value,
        r#"{"fruit":"ORANGE","fint":1,"flong":1,"fstring":"hi there","ffixed":"1234567890123456","frec":{"subfint":2},"funion_null":null,"ffloat":1.0,"fdouble":2.0,"intarr":[1,2,3],"intmap":{"one":1}}"#,
        &value,
    )
}

#[rstest]
#[case::enumeration("fruit", r#"{"name": "Fruit", "type": "enum", "symbols": ["ORANGE", "APPLE", "PINEAPPLE"]}"#)]
#[case::int("fint", r#""int""#)]
#[case::long("flong", r#""long""#)]
#[case::float("ffloat", r#""float""#)]
#[case::double("fdouble", r#""double""#)]
#[case::string("fstring", r#""string""#)]
#[case::fixed("ffixed", r#"{"name": "fixed_16", "size": 16, "type": "fixed"}"#)]
#[case::record("frec", r#"{"name": "Rec", "type": "record", "fields": [{"name": "subfint", "type": "int"}]}"#)]
#[case::array("intarr", r#"{"type": "array", "items": "int"}"#)]
#[case::map("intmap", r#"{"type": "map", "values": "int"}"#)]
fn field_types_on_their_own(#[case] field: &str, #[case] raw_schema: &str) -> AvroResult<()> {
    let schema = Schema::parse_str(raw_schema)?;
    let Value::Map(all) = all_fields_value() else {
        panic!("the test record is a map");
    };
    let value = &all[field];
    let json = Serializer::new(&schema)?.to_json(value)?;
    assert_eq!(&Deserializer::new(&schema)?.from_json(&json)?, value);
    Ok(())
}

#[test]
fn invalid_field_fails_validation() -> AvroResult<()> {
    let schema = Schema::parse_str(ALL_FIELDS_SCHEMA)?;
    let Value::Map(mut fields) = all_fields_value() else {
        panic!("the test record is a map");
    };
    fields.insert("ffloat".to_string(), Value::from("hi"));
    let err = Serializer::new(&schema)?
        .to_json(&Value::Map(fields))
        .expect_err("a string is not a float");
    assert!(err.is_type_mismatch(), "{err}");
    Ok(())
}

#[rstest]
#[case::null(Value::Null, r#"{"funion_null":null}"#)]
#[case::not_null(Value::Int(1), r#"{"funion_null":{"int":1}}"#)]
fn union_serialization(#[case] item: Value, #[case] json: &str) -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "unions", "fields": [{"name": "funion_null", "type": ["int", "null"]}]}"#,
    )?;
    let value = Value::from_iter([("funion_null", item)]);
    assert_round_trip(&schema, &value, json, &value)
}

#[test]
fn union_without_matching_branch_reports_the_union() -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "unions", "fields": [{"name": "funion_null", "type": ["int", "null"]}]}"#,
    )?;
    let err = Serializer::new(&schema)?
        .to_json(&Value::from_iter([("funion_null", "hi")]))
        .expect_err("a string is neither an int nor null");
    match err.into_details() {
        Details::TypeMismatch { schema, value } => {
            assert_eq!(schema, Schema::parse_str(r#"["int", "null"]"#)?);
            assert_eq!(value, Value::from("hi"));
        }
        other => panic!("Expected a type mismatch, got {other:?}"),
    }
    Ok(())
}

#[rstest]
#[case::first(Value::Int(1), r#"{"funion_rec":{"rec1":{"field":1}}}"#)]
#[case::namespaced(Value::from("hi"), r#"{"funion_rec":{"example.avro.rec2":{"field":"hi"}}}"#)]
fn records_union(#[case] field: Value, #[case] json: &str) -> AvroResult<()> {
    let schema = Schema::parse_str(UNION_RECORDS_SCHEMA)?;
    let value = Value::from_iter([("funion_rec", Value::from_iter([("field", field)]))]);
    assert_round_trip(&schema, &value, json, &value)
}

#[test]
fn map_keeps_its_entries() -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "rec", "fields": [{"name": "intmap", "type": {"type": "map", "values": "int"}}]}"#,
    )?;
    let value = Value::from_iter([("intmap", Value::from_iter([("one", 1), ("two", 2)]))]);
    assert_round_trip(&schema, &value, r#"{"intmap":{"one":1,"two":2}}"#, &value)?;

    // entry order does not matter when comparing maps
    let reordered = Value::from_iter([("intmap", Value::from_iter([("two", 2), ("one", 1)]))]);
    assert_eq!(Deserializer::new(&schema)?.from_value(&reordered)?, value);
    Ok(())
}

#[test]
fn array() -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "rec", "fields": [{"name": "intarr", "type": {"type": "array", "items": "int"}}]}"#,
    )?;
    let value = Value::from_iter([(
        "intarr",
        Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    )]);
    assert_round_trip(&schema, &value, r#"{"intarr":[1,2,3]}"#, &value)
}

#[test]
fn user_record() -> AvroResult<()> {
    let schema = Schema::parse_str(USER_SCHEMA)?;

    let alyssa = Value::from_iter([
        ("name", Value::from("Alyssa")),
        ("favorite_number", Value::Int(256)),
    ]);
    let alyssa_full = Value::from_iter([
        ("name", Value::from("Alyssa")),
        ("favorite_number", Value::Int(256)),
        ("favorite_color", Value::Null),
    ]);
    assert_round_trip(
        &schema,
        &alyssa,
        r#"{"name":"Alyssa","favorite_number":{"int":256},"favorite_color":null}"#,
        &alyssa_full,
    )?;

    let ben = Value::from_iter([
        ("name", Value::from("Ben")),
        ("favorite_number", Value::Int(7)),
        ("favorite_color", Value::from("red")),
    ]);
    assert_round_trip(
        &schema,
        &ben,
        r#"{"name":"Ben","favorite_number":{"int":7},"favorite_color":{"string":"red"}}"#,
        &ben,
    )?;

    let lion = Value::from_iter([("name", "Lion")]);
    let lion_full = Value::from_iter([
        ("name", Value::from("Lion")),
        ("favorite_number", Value::Null),
        ("favorite_color", Value::Null),
    ]);
    assert_round_trip(
        &schema,
        &lion,
        r#"{"name":"Lion","favorite_number":null,"favorite_color":null}"#,
        &lion_full,
    )
}

#[rstest]
#[case::inner_record(
    Value::from_iter([("outer", Value::from_iter([("middle", Value::from_iter([("inner", 1)]))]))]),
    r#"{"outer":{"nested.MiddleType":{"middle":{"nested.InnerType":{"inner":1}}}}}"#
)]
#[case::inner_null(
    Value::from_iter([("outer", Value::from_iter([("middle", Value::Null)]))]),
    r#"{"outer":{"nested.MiddleType":{"middle":null}}}"#
)]
fn nested_union_records(#[case] value: Value, #[case] json: &str) -> AvroResult<()> {
    let schema = Schema::parse_str(NESTED_UNIONS_SCHEMA)?;
    assert_round_trip(&schema, &value, json, &value)
}

#[rstest]
#[case::fixed_non_ascii(
    WITH_FIXED_SCHEMA,
    "ffixed",
    b"(~^\xfbzoW\x13p\x19!4\x0b+\x00\x00".as_slice(),
    r#"{"ffixed":"(~^ûzoW\u0013p\u0019!4\u000b+\u0000\u0000"}"#
)]
#[case::fixed_ascii(
    WITH_FIXED_SCHEMA,
    "ffixed",
    b"fixed text here!".as_slice(),
    r#"{"ffixed":"fixed text here!"}"#
)]
#[case::bytes_non_ascii(
    WITH_BYTES_SCHEMA,
    "fbytes",
    b"(~^\xfbzoW\x13p\x19!4\x0b+\x00\x00\x0b+\x00\x00".as_slice(),
    r#"{"fbytes":"(~^ûzoW\u0013p\u0019!4\u000b+\u0000\u0000\u000b+\u0000\u0000"}"#
)]
#[case::bytes_ascii(
    WITH_BYTES_SCHEMA,
    "fbytes",
    b"this is some long bytes field".as_slice(),
    r#"{"fbytes":"this is some long bytes field"}"#
)]
fn binary_as_latin1_text(
    #[case] raw_schema: &str,
    #[case] field: &str,
    #[case] bytes: &[u8],
    #[case] expected: &str,
) -> AvroResult<()> {
    let schema = Schema::parse_str(raw_schema)?;
    let value = Value::from_iter([(field, bytes)]);

    // non-ASCII characters may be written raw or escaped, so compare the parsed documents
    let json = Serializer::new(&schema)?.to_json(&value)?;
    let written: serde_json::Value = serde_json::from_str(&json).map_err(Details::ParseJson)?;
    let wanted: serde_json::Value = serde_json::from_str(expected).map_err(Details::ParseJson)?;
    assert_eq!(written, wanted);

    let deserializer = Deserializer::new(&schema)?;
    assert_eq!(deserializer.from_json(&json)?, value);
    assert_eq!(deserializer.from_json(expected)?, value);
    Ok(())
}

#[test]
fn missing_nullable_field_with_default_is_an_error() -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "WithDefault",
            "fields": [
                {"type": "string", "name": "name"},
                {"type": ["null", "int"], "name": "version", "default": null}
            ]
        }
        "#,
    )?;
    let err = Deserializer::new(&schema)?
        .from_json(r#"{"name":"mcnameface"}"#)
        .expect_err("the version field is missing");
    assert!(err.is_type_mismatch());
    match err.into_details() {
        Details::MissingField { record, field, .. } => {
            assert_eq!(record.fullname(None), "WithDefault");
            assert_eq!(field, "version");
        }
        other => panic!("Expected a missing field, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_fields_are_ignored() -> AvroResult<()> {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "BasicName", "fields": [{"type": "string", "name": "name"}]}"#,
    )?;
    assert_eq!(
        Deserializer::new(&schema)?.from_json(r#"{"name":"todd","age":1}"#)?,
        Value::from_iter([("name", "todd")])
    );
    Ok(())
}

#[test]
fn binary_from_raw_bytes_or_latin1_text() -> AvroResult<()> {
    let schema = Schema::parse_str(WITH_BYTES_SCHEMA)?;
    let deserializer = Deserializer::new(&schema)?;

    let raw = Value::from_iter([(
        "fbytes",
        b"(~^\xfbzoW\x13p\x19!4\x0b+\x00\x00\x0b+\x00\x00".as_slice(),
    )]);
    assert_eq!(deserializer.from_value(&raw)?, raw);

    let text = Value::Map(IndexMap::from([(
        "fbytes".to_string(),
        Value::from("(~^\u{fb}zoW\u{13}p\u{19}!4\u{b}+\u{0}\u{0}"),
    )]));
    assert_eq!(
        deserializer.from_value(&text)?,
        Value::from_iter([("fbytes", b"(~^\xfbzoW\x13p\x19!4\x0b+\x00\x00".as_slice())])
    );
    Ok(())
}
