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

use crate::{
    AvroResult, Error,
    bytes::bytes_to_text,
    error::Details,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, RecordSchema, ResolvedSchema,
        Schema,
    },
    types::Value,
    union::{self, Branch},
};
use serde_json::{Map, Number, Value as JsonValue};
use std::{borrow::Borrow, collections::HashMap, fmt::Debug, io::Write};

/// Encode a `Value` into its Avro JSON representation.
///
/// Record fields are written in the order the schema declares them, whatever the order of the
/// entries of the [`Value::Map`]. A field missing from the map is written as `null`, while
/// decoding requires every field, so `from_value(to_json_value(v))` gives `v` back only when `v`
/// lists every field of its records.
pub fn to_json_value(value: &Value, schema: &Schema) -> AvroResult<JsonValue> {
    let rs = ResolvedSchema::try_from(schema)?;
    encode_internal(value, schema, rs.get_names())
}

/// Encode a `Value` into compact Avro JSON text.
pub fn to_json(value: &Value, schema: &Schema) -> AvroResult<String> {
    Serializer::new(schema)?.to_json(value)
}

pub(crate) fn encode_internal<S: Borrow<Schema> + Debug>(
    value: &Value,
    schema: &Schema,
    names: &HashMap<Name, S>,
) -> AvroResult<JsonValue> {
    match (value, schema) {
        (_, Schema::Ref { name }) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| Error::SchemaResolutionError(name.clone()))?;
            encode_internal(value, resolved.borrow(), names)
        }
        (Value::Null, Schema::Null) => Ok(JsonValue::Null),
        (&Value::Boolean(b), Schema::Boolean) => Ok(JsonValue::Bool(b)),
        (&Value::Int(i), Schema::Int) if i32::try_from(i).is_ok() => Ok(JsonValue::from(i)),
        (&Value::Int(i), Schema::Long | Schema::Float | Schema::Double) => Ok(JsonValue::from(i)),
        (&Value::Float(x), Schema::Float | Schema::Double) => Number::from_f64(x)
            .map(JsonValue::Number)
            .ok_or_else(|| Details::ConvertF64ToJson(x).into()),
        (Value::String(s), Schema::String) => Ok(JsonValue::String(s.clone())),
        (Value::String(s), Schema::Enum(EnumSchema { symbols, .. })) if symbols.contains(s) => {
            Ok(JsonValue::String(s.clone()))
        }
        (Value::Bytes(bytes), Schema::Bytes) => Ok(JsonValue::String(bytes_to_text(bytes))),
        (Value::Bytes(bytes), Schema::Fixed(FixedSchema { size, .. })) if bytes.len() == *size => {
            Ok(JsonValue::String(bytes_to_text(bytes)))
        }
        (Value::Array(items), Schema::Array(ArraySchema { items: inner, .. })) => items
            .iter()
            .map(|item| encode_internal(item, inner, names))
            .collect::<AvroResult<Vec<_>>>()
            .map(JsonValue::Array),
        (Value::Map(items), Schema::Map(MapSchema { values: inner, .. })) => items
            .iter()
            .map(|(key, item)| -> AvroResult<(String, JsonValue)> {
                Ok((key.clone(), encode_internal(item, inner, names)?))
            })
            .collect::<AvroResult<Map<_, _>>>()
            .map(JsonValue::Object),
        (Value::Map(items), Schema::Record(RecordSchema { fields, .. })) => {
            let mut record = Map::with_capacity(fields.len());
            for field in fields {
                // an absent field is written as `null`, which only a nullable field accepts
                let item = items.get(&field.name).unwrap_or(&Value::Null);
                record.insert(
                    field.name.clone(),
                    encode_internal(item, &field.schema, names)?,
                );
            }
            Ok(JsonValue::Object(record))
        }
        (_, Schema::Union(inner)) => {
            match union::resolve_for_encode(schema, inner, value, |branch, datum| {
                datum.validate_internal(branch, names).is_none()
            })? {
                Branch::Null => Ok(JsonValue::Null),
                Branch::Wrapped { tag, schema, datum } => {
                    let mut wrapped = Map::with_capacity(1);
                    wrapped.insert(tag.into_owned(), encode_internal(datum, schema, names)?);
                    Ok(JsonValue::Object(wrapped))
                }
            }
        }
        _ => Err(Error::TypeMismatch(schema, value)),
    }
}

/// Encodes [`Value`]s bound to a schema into Avro JSON.
///
/// The named types of the schema are resolved once, when the `Serializer` is created, so it can
/// then be used for any number of values, from any number of threads.
///
/// ```
/// use avro_json::{Schema, Serializer, types::Value};
///
/// let schema = Schema::parse_str(
///     r#"{"type": "record", "name": "Test", "fields": [{"name": "v", "type": ["int", "null"]}]}"#,
/// )?;
/// let serializer = Serializer::new(&schema)?;
/// assert_eq!(serializer.to_json(&Value::from_iter([("v", 7)]))?, r#"{"v":{"int":7}}"#);
/// assert_eq!(serializer.to_json(&Value::from_iter([("v", Value::Null)]))?, r#"{"v":null}"#);
/// # Ok::<(), avro_json::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Serializer<'s> {
    resolved: ResolvedSchema<'s>,
}

impl<'s> Serializer<'s> {
    /// Creates a `Serializer` for `schema`.
    ///
    /// # Errors
    /// When `schema` references a named type it does not define.
    pub fn new(schema: &'s Schema) -> AvroResult<Self> {
        Ok(Self {
            resolved: ResolvedSchema::try_from(schema)?,
        })
    }

    /// Creates a `Serializer` for `schema`, whose references may point at the named types of
    /// `schemata`, as returned by [`Schema::parse_list`].
    pub fn with_schemata(schema: &'s Schema, schemata: &'s [Schema]) -> AvroResult<Self> {
        Ok(Self {
            resolved: ResolvedSchema::new_with_schemata(schema, schemata)?,
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.resolved.get_root_schema()
    }

    /// Encodes `value` into an ordered JSON structure, with record fields in schema order.
    pub fn to_json_value(&self, value: &Value) -> AvroResult<JsonValue> {
        encode_internal(value, self.schema(), self.resolved.get_names())
    }

    /// Encodes `value` into compact JSON text, without any insignificant whitespace.
    pub fn to_json(&self, value: &Value) -> AvroResult<String> {
        serde_json::to_string(&self.to_json_value(value)?)
            .map_err(|e| Details::WriteJson(e).into())
    }

    /// Encodes `value` as compact JSON text into `writer`.
    ///
    /// Nothing is written when `value` does not match the schema.
    pub fn to_writer<W: Write>(&self, writer: W, value: &Value) -> AvroResult<()> {
        let json = self.to_json_value(value)?;
        serde_json::to_writer(writer, &json).map_err(|e| Details::WriteJson(e).into())
    }
}
