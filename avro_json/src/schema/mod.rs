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

//! Logic for parsing and interacting with schemas in Avro format.
//!
//! A [`Schema`] is built once, either by parsing its JSON declaration or with the builders, and
//! is never mutated afterwards. It can be shared by any number of
//! [`Serializer`](crate::Serializer)s and [`Deserializer`](crate::Deserializer)s, across threads.

mod name;
mod parser;
mod record;
mod resolve;
mod union;

pub use crate::schema::{
    name::{Alias, Aliases, Name, Names, NamesRef, Namespace, NamespaceRef},
    record::{RecordField, RecordFieldBuilder, RecordSchema, RecordSchemaBuilder},
    resolve::ResolvedSchema,
    union::UnionSchema,
};
use crate::{
    AvroResult,
    error::{Details, Error},
    schema::parser::Parser,
};
use serde::{
    Deserialize, Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};
use serde_json::Value as JsonValue;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    io::Read,
};
use strum_macros::EnumDiscriminants;

/// Represents documentation for complex Avro schemas.
pub type Documentation = Option<String>;

/// Represents any valid Avro schema
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/current/specification/#schema-declaration)
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(SchemaKind), derive(Hash, Ord, PartialOrd))]
pub enum Schema {
    /// A `null` Avro schema.
    Null,
    /// A `boolean` Avro schema.
    Boolean,
    /// An `int` Avro schema.
    Int,
    /// A `long` Avro schema.
    Long,
    /// A `float` Avro schema.
    Float,
    /// A `double` Avro schema.
    Double,
    /// A `bytes` Avro schema.
    ///
    /// `Bytes` represents a sequence of 8-bit unsigned bytes.
    Bytes,
    /// A `string` Avro schema.
    ///
    /// `String` represents a unicode character sequence.
    String,
    /// An `array` Avro schema.
    ///
    /// All items will have the same schema.
    Array(ArraySchema),
    /// A `map` Avro schema.
    ///
    /// Keys are always a `Schema::String` and all values will have the same schema.
    Map(MapSchema),
    /// A `union` Avro schema.
    Union(UnionSchema),
    /// A `record` Avro schema.
    Record(RecordSchema),
    /// An `enum` Avro schema.
    Enum(EnumSchema),
    /// A `fixed` Avro schema.
    Fixed(FixedSchema),
    /// A reference to a named schema defined elsewhere in the schema tree.
    Ref { name: Name },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub attributes: BTreeMap<String, JsonValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapSchema {
    pub values: Box<Schema>,
    pub attributes: BTreeMap<String, JsonValue>,
}

impl SchemaKind {
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            SchemaKind::Null
                | SchemaKind::Boolean
                | SchemaKind::Int
                | SchemaKind::Long
                | SchemaKind::Double
                | SchemaKind::Float
                | SchemaKind::Bytes
                | SchemaKind::String,
        )
    }

    /// The type keyword used for this kind in a schema declaration.
    ///
    /// For unnamed kinds this is also the tag of the kind inside a union.
    pub fn type_name(self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::Bytes => "bytes",
            SchemaKind::String => "string",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Union => "union",
            SchemaKind::Record => "record",
            SchemaKind::Enum => "enum",
            SchemaKind::Fixed => "fixed",
            SchemaKind::Ref => "ref",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A description of an Enum schema.
#[derive(bon::Builder, Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    #[builder(default)]
    pub aliases: Aliases,
    /// The documentation of the schema
    #[builder(default)]
    pub doc: Documentation,
    /// The set of symbols of the schema
    pub symbols: Vec<String>,
    /// An optional default symbol used for compatibility
    pub default: Option<String>,
    /// The custom attributes of the schema
    #[builder(default = BTreeMap::new())]
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of a Fixed schema.
#[derive(bon::Builder, Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    #[builder(default)]
    pub aliases: Aliases,
    /// The documentation of the schema
    #[builder(default)]
    pub doc: Documentation,
    /// The size of the fixed schema
    pub size: usize,
    /// The custom attributes of the schema
    #[builder(default = BTreeMap::new())]
    pub attributes: BTreeMap<String, JsonValue>,
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> Result<Schema, Error> {
        let mut parser = Parser::default();
        parser.parse_str(input)
    }

    /// Create an array of `Schema`'s from a list of named JSON Avro schemas (Record, Enum, and
    /// Fixed).
    ///
    /// It is allowed that the schemas have cross-dependencies; these will be resolved
    /// during parsing.
    ///
    /// If two of the input schemas have the same fullname, an Error will be returned.
    pub fn parse_list(input: impl IntoIterator<Item = impl AsRef<str>>) -> AvroResult<Vec<Schema>> {
        let input = input.into_iter();
        let input_len = input.size_hint().0;
        let mut input_schemas: HashMap<Name, JsonValue> = HashMap::with_capacity(input_len);
        let mut input_order: Vec<Name> = Vec::with_capacity(input_len);
        for json in input {
            let schema: JsonValue =
                serde_json::from_str(json.as_ref()).map_err(Details::ParseSchemaJson)?;
            if let JsonValue::Object(inner) = &schema {
                let name = Name::parse(inner, None)?;
                if input_schemas.insert(name.clone(), schema).is_some() {
                    return Err(Details::NameCollision(name.fullname(None)).into());
                }
                input_order.push(name);
            } else {
                return Err(Details::GetNameField.into());
            }
        }
        let mut parser = Parser::new(input_schemas, input_order);
        parser.parse_list()
    }

    /// Create a `Schema` from a reader which implements [`Read`].
    pub fn parse_reader(reader: &mut (impl Read + ?Sized)) -> AvroResult<Schema> {
        let mut buf = String::new();
        match reader.read_to_string(&mut buf) {
            Ok(_) => Self::parse_str(&buf),
            Err(e) => Err(Details::ReadSchemaFromReader(e).into()),
        }
    }

    /// Parses an Avro schema from JSON.
    pub fn parse(value: &JsonValue) -> AvroResult<Schema> {
        let mut parser = Parser::default();
        parser.parse(value, None)
    }

    /// Returns whether the schema represents a named type according to the avro specification
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            Schema::Ref { .. } | Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_)
        )
    }

    /// Returns the name of the schema if it has one.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Ref { name }
            | Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Returns the namespace of the schema if it has one.
    pub fn namespace(&self) -> Namespace {
        self.name().and_then(|n| n.namespace.clone())
    }

    /// Returns the doc of the schema if it has one.
    pub fn doc(&self) -> Option<&String> {
        match self {
            Schema::Record(RecordSchema { doc, .. })
            | Schema::Enum(EnumSchema { doc, .. })
            | Schema::Fixed(FixedSchema { doc, .. }) => doc.as_ref(),
            _ => None,
        }
    }

    /// Returns true if this is a union with a `null` branch.
    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Union(union) => union.is_nullable(),
            _ => false,
        }
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self {
            Schema::Ref { name } => serializer.serialize_str(&name.fullname(None)),
            Schema::Null
            | Schema::Boolean
            | Schema::Int
            | Schema::Long
            | Schema::Float
            | Schema::Double
            | Schema::Bytes
            | Schema::String => serializer.serialize_str(SchemaKind::from(self).type_name()),
            Schema::Array(ArraySchema { items, attributes }) => {
                let mut map = serializer.serialize_map(Some(2 + attributes.len()))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
                for (key, value) in attributes {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Schema::Map(MapSchema { values, attributes }) => {
                let mut map = serializer.serialize_map(Some(2 + attributes.len()))?;
                map.serialize_entry("type", "map")?;
                map.serialize_entry("values", values)?;
                for (key, value) in attributes {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Schema::Union(inner) => {
                let variants = inner.variants();
                let mut seq = serializer.serialize_seq(Some(variants.len()))?;
                for v in variants {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Schema::Record(RecordSchema {
                name,
                aliases,
                doc,
                fields,
                attributes,
                is_error,
                lookup: _lookup,
            }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", if *is_error { "error" } else { "record" })?;
                if let Some(ref n) = name.namespace {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", &name.name)?;
                if let Some(docstr) = doc {
                    map.serialize_entry("doc", docstr)?;
                }
                if let Some(aliases) = aliases {
                    map.serialize_entry("aliases", aliases)?;
                }
                map.serialize_entry("fields", fields)?;
                for attr in attributes {
                    map.serialize_entry(attr.0, attr.1)?;
                }
                map.end()
            }
            Schema::Enum(EnumSchema {
                name,
                symbols,
                aliases,
                attributes,
                default,
                doc,
            }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "enum")?;
                if let Some(ref n) = name.namespace {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", &name.name)?;
                map.serialize_entry("symbols", symbols)?;

                if let Some(aliases) = aliases {
                    map.serialize_entry("aliases", aliases)?;
                }
                if let Some(default) = default {
                    map.serialize_entry("default", default)?;
                }
                if let Some(doc) = doc {
                    map.serialize_entry("doc", doc)?;
                }
                for attr in attributes {
                    map.serialize_entry(attr.0, attr.1)?;
                }
                map.end()
            }
            Schema::Fixed(FixedSchema {
                name,
                aliases,
                doc,
                size,
                attributes,
            }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "fixed")?;
                if let Some(n) = name.namespace.as_ref() {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", &name.name)?;
                if let Some(docstr) = doc.as_ref() {
                    map.serialize_entry("doc", docstr)?;
                }
                map.serialize_entry("size", size)?;
                if let Some(aliases) = aliases.as_ref() {
                    map.serialize_entry("aliases", aliases)?;
                }
                for attr in attributes {
                    map.serialize_entry(attr.0, attr.1)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Schema::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_invalid_schema() {
        assert!(Schema::parse_str("invalid").is_err());
    }

    #[test]
    fn test_primitive_schema() -> AvroResult<()> {
        assert_eq!(Schema::Null, Schema::parse_str(r#""null""#)?);
        assert_eq!(Schema::Int, Schema::parse_str(r#""int""#)?);
        assert_eq!(Schema::Double, Schema::parse_str(r#""double""#)?);
        assert_eq!(Schema::Bytes, Schema::parse_str(r#"{"type": "bytes"}"#)?);
        Ok(())
    }

    #[test]
    fn test_array_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "string"}"#)?;
        assert_eq!(
            Schema::Array(ArraySchema {
                items: Box::new(Schema::String),
                attributes: BTreeMap::new(),
            }),
            schema
        );
        Ok(())
    }

    #[test]
    fn test_map_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(r#"{"type": "map", "values": "double"}"#)?;
        assert_eq!(
            Schema::Map(MapSchema {
                values: Box::new(Schema::Double),
                attributes: BTreeMap::new(),
            }),
            schema
        );
        Ok(())
    }

    #[test]
    fn test_union_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(r#"["null", "int"]"#)?;
        assert_eq!(
            Schema::Union(UnionSchema::new(vec![Schema::Null, Schema::Int])?),
            schema
        );
        assert!(schema.is_nullable());
        Ok(())
    }

    #[test]
    fn test_union_unsupported_schema() {
        assert!(Schema::parse_str(r#"["null", ["null", "int"], "string"]"#).is_err());
        assert!(Schema::parse_str(r#"["int", "string", "int"]"#).is_err());
    }

    #[test]
    fn test_enum_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(
            r#"{"type": "enum", "name": "Fruit", "symbols": ["ORANGE", "APPLE", "PINEAPPLE"]}"#,
        )?;

        let expected = Schema::Enum(
            EnumSchema::builder()
                .name(Name::new("Fruit")?)
                .symbols(vec![
                    "ORANGE".to_owned(),
                    "APPLE".to_owned(),
                    "PINEAPPLE".to_owned(),
                ])
                .build(),
        );

        assert_eq!(expected, schema);
        Ok(())
    }

    #[test]
    fn test_enum_schema_duplicate() {
        assert!(
            Schema::parse_str(r#"{"type": "enum", "name": "Suit", "symbols": ["a", "a"]}"#)
                .is_err()
        );
    }

    #[test]
    fn test_fixed_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "fixed_16", "size": 16}"#)?;

        let expected = Schema::Fixed(
            FixedSchema::builder()
                .name(Name::new("fixed_16")?)
                .size(16)
                .build(),
        );

        assert_eq!(expected, schema);
        Ok(())
    }

    #[test]
    fn test_fixed_schema_negative_size() {
        assert!(Schema::parse_str(r#"{"type": "fixed", "name": "f", "size": -1}"#).is_err());
    }

    #[test]
    fn test_record_schema_fields_keep_declared_order() -> AvroResult<()> {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "all_field",
                "namespace": "com.some.thing",
                "fields": [
                    {"name": "fstring", "type": "string"},
                    {"name": "fint", "type": "int"},
                    {"name": "flong", "type": "long", "default": 42}
                ]
            }
            "#,
        )?;

        let Schema::Record(record) = &schema else {
            panic!("Expected a record schema, got {schema:?}");
        };
        assert_eq!(record.name.fullname(None), "com.some.thing.all_field");
        let names: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fstring", "fint", "flong"]);
        assert_eq!(record.fields[2].default, Some(json!(42)));
        assert_eq!(record.lookup.get("fint"), Some(&1));
        Ok(())
    }

    #[test]
    fn test_error_record_schema() -> AvroResult<()> {
        let schema = Schema::parse_str(
            r#"{"type": "error", "name": "Oops", "fields": [{"name": "message", "type": "string"}]}"#,
        )?;
        let Schema::Record(record) = &schema else {
            panic!("Expected a record schema, got {schema:?}");
        };
        assert!(record.is_error);
        assert_eq!(
            serde_json::to_value(&schema).map_err(Details::ParseSchemaJson)?,
            json!({"type": "error", "name": "Oops", "fields": [{"name": "message", "type": "string"}]})
        );
        Ok(())
    }

    #[test]
    fn test_recursive_record_uses_reference() -> AvroResult<()> {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "LongList",
                "fields": [
                    {"name": "value", "type": "long"},
                    {"name": "next", "type": ["null", "LongList"]}
                ]
            }
            "#,
        )?;
        let Schema::Record(record) = &schema else {
            panic!("Expected a record schema, got {schema:?}");
        };
        let Schema::Union(union) = &record.fields[1].schema else {
            panic!("Expected a union schema");
        };
        assert_eq!(
            union.variants()[1],
            Schema::Ref {
                name: Name::new("LongList")?
            }
        );
        Ok(())
    }

    #[test]
    fn test_unknown_logical_type_is_ignored() -> AvroResult<()> {
        let schema = Schema::parse_str(r#"{"type": "bytes", "logicalType": "decimal", "precision": 4}"#)?;
        assert_eq!(schema, Schema::Bytes);
        let schema = Schema::parse_str(r#"{"type": "long", "logicalType": "timestamp-millis"}"#)?;
        assert_eq!(schema, Schema::Long);
        Ok(())
    }

    #[test]
    fn test_parse_list_with_cross_references() -> AvroResult<()> {
        let schemas = Schema::parse_list([
            r#"{"type": "record", "name": "A", "fields": [{"name": "b", "type": "B"}]}"#,
            r#"{"type": "fixed", "name": "B", "size": 4}"#,
        ])?;
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name().map(|n| n.fullname(None)), Some("A".to_string()));
        assert_eq!(schemas[1].name().map(|n| n.fullname(None)), Some("B".to_string()));
        Ok(())
    }

    #[test]
    fn test_schema_serde_round_trip() -> AvroResult<()> {
        let raw = json!({
            "type": "record",
            "namespace": "example.avro",
            "name": "User",
            "fields": [
                {"name": "name", "type": "string"},
                {"name": "favorite_number", "type": ["int", "null"]},
                {"name": "tags", "type": {"type": "map", "values": {"type": "array", "items": "bytes"}}}
            ]
        });
        let schema: Schema = serde_json::from_value(raw.clone()).map_err(Details::ParseSchemaJson)?;
        assert_eq!(
            serde_json::to_value(&schema).map_err(Details::ParseSchemaJson)?,
            raw
        );
        Ok(())
    }

    #[test]
    fn test_schema_kind_type_names() {
        assert_eq!(SchemaKind::Long.to_string(), "long");
        assert_eq!(SchemaKind::from(&Schema::Bytes).type_name(), "bytes");
        assert!(SchemaKind::String.is_primitive());
        assert!(!SchemaKind::Record.is_primitive());
    }
}
