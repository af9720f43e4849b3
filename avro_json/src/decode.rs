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
    bytes::text_to_bytes,
    error::Details,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, RecordSchema, ResolvedSchema,
        Schema,
    },
    types::Value,
    union::{self, Branch},
};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value as JsonValue;
use std::{
    borrow::{Borrow, Cow},
    collections::HashMap,
    fmt::Debug,
    io::Read,
};

/// Decode a `Value` from its Avro JSON representation, already parsed into a `Value`.
pub fn from_value(value: &Value, schema: &Schema) -> AvroResult<Value> {
    let rs = ResolvedSchema::try_from(schema)?;
    decode_internal(Some(value), schema, rs.get_names())
}

/// Decode a `Value` from Avro JSON text.
pub fn from_json(json: &str, schema: &Schema) -> AvroResult<Value> {
    Deserializer::new(schema)?.from_json(json)
}

/// Decodes `datum` for `schema`.
///
/// `None` stands for a record field missing from the input. It is never valid, not even for a
/// nullable schema: only an explicit `null` is.
pub(crate) fn decode_internal<S: Borrow<Schema> + Debug>(
    datum: Option<&Value>,
    schema: &Schema,
    names: &HashMap<Name, S>,
) -> AvroResult<Value> {
    let Some(value) = datum else {
        return Err(Details::MissingValue(schema.clone()).into());
    };
    match (value, schema) {
        (_, Schema::Ref { name }) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| Error::SchemaResolutionError(name.clone()))?;
            decode_internal(datum, resolved.borrow(), names)
        }
        (Value::Null, Schema::Null)
        | (Value::Boolean(_), Schema::Boolean)
        | (Value::Int(_), Schema::Long)
        | (Value::Int(_) | Value::Float(_), Schema::Float | Schema::Double)
        | (Value::String(_), Schema::String) => Ok(value.clone()),
        (&Value::Int(i), Schema::Int) if i32::try_from(i).is_ok() => Ok(value.clone()),
        (Value::String(s), Schema::Enum(EnumSchema { symbols, .. })) if symbols.contains(s) => {
            Ok(value.clone())
        }
        (_, Schema::Bytes) => decoded_binary(value)
            .map(|bytes| Value::Bytes(bytes.into_owned()))
            .ok_or_else(|| Error::TypeMismatch(schema, value)),
        (_, Schema::Fixed(FixedSchema { size, .. })) => decoded_binary(value)
            .filter(|bytes| bytes.len() == *size)
            .map(|bytes| Value::Bytes(bytes.into_owned()))
            .ok_or_else(|| Error::TypeMismatch(schema, value)),
        (Value::Array(items), Schema::Array(ArraySchema { items: inner, .. })) => items
            .iter()
            .map(|item| decode_internal(Some(item), inner, names))
            .collect::<AvroResult<Vec<_>>>()
            .map(Value::Array),
        (Value::Map(items), Schema::Map(MapSchema { values: inner, .. })) => items
            .iter()
            .map(|(key, item)| -> AvroResult<(String, Value)> {
                Ok((key.clone(), decode_internal(Some(item), inner, names)?))
            })
            .collect::<AvroResult<IndexMap<_, _>>>()
            .map(Value::Map),
        (Value::Map(items), Schema::Record(record)) => decode_record(items, record, names),
        (_, Schema::Union(inner)) => {
            match union::resolve_for_decode(schema, inner, value, |branch, datum| {
                is_valid(Some(datum), branch, names)
            })? {
                Branch::Null => Ok(Value::Null),
                Branch::Wrapped { schema, datum, .. } => {
                    decode_internal(Some(datum), schema, names)
                }
            }
        }
        _ => Err(Error::TypeMismatch(schema, value)),
    }
}

fn decode_record<S: Borrow<Schema> + Debug>(
    items: &IndexMap<String, Value>,
    record: &RecordSchema,
    names: &HashMap<Name, S>,
) -> AvroResult<Value> {
    for key in items.keys() {
        if !record.fields.iter().any(|field| field.name == *key) {
            debug!(
                "Ignoring field '{key}' which record '{}' does not declare",
                record.name
            );
        }
    }
    let mut decoded = IndexMap::with_capacity(record.fields.len());
    for field in &record.fields {
        let item = items.get(&field.name);
        let value = decode_internal(item, &field.schema, names).map_err(|e| match item {
            None => Error::MissingField(&record.name, &field.name, &field.schema),
            Some(_) => e,
        })?;
        decoded.insert(field.name.clone(), value);
    }
    Ok(Value::Map(decoded))
}

/// Returns the octets of a `bytes` or `fixed` value read from JSON.
///
/// The value is either a string of characters in `U+0000..=U+00FF`, as parsed from JSON text, or
/// raw octets already.
fn decoded_binary(value: &Value) -> Option<Cow<'_, [u8]>> {
    match value {
        Value::String(text) => text_to_bytes(text).ok().map(Cow::Owned),
        Value::Bytes(bytes) => Some(Cow::Borrowed(bytes)),
        _ => None,
    }
}

/// Whether `datum` is a valid Avro JSON value for `schema`.
///
/// Unlike [`Value::validate`] this sees through wrapped union values, reads `bytes` and `fixed`
/// from their string form, and rejects any missing record field.
pub(crate) fn is_valid<S: Borrow<Schema> + Debug>(
    datum: Option<&Value>,
    schema: &Schema,
    names: &HashMap<Name, S>,
) -> bool {
    let Some(value) = datum else {
        return false;
    };
    match (value, schema) {
        (_, Schema::Ref { name }) => names
            .get(name)
            .is_some_and(|resolved| is_valid(datum, resolved.borrow(), names)),
        (_, Schema::Bytes) => decoded_binary(value).is_some(),
        (_, Schema::Fixed(FixedSchema { size, .. })) => {
            decoded_binary(value).is_some_and(|bytes| bytes.len() == *size)
        }
        (Value::Array(items), Schema::Array(ArraySchema { items: inner, .. })) => items
            .iter()
            .all(|item| is_valid(Some(item), inner, names)),
        (Value::Map(items), Schema::Map(MapSchema { values: inner, .. })) => items
            .values()
            .all(|item| is_valid(Some(item), inner, names)),
        (Value::Map(items), Schema::Record(RecordSchema { fields, .. })) => fields
            .iter()
            .all(|field| is_valid(items.get(&field.name), &field.schema, names)),
        (_, Schema::Union(inner)) => inner.variants().iter().any(|branch| {
            union::unwrap(branch, value)
                .is_some_and(|unwrapped| is_valid(Some(unwrapped), branch, names))
        }),
        _ => value.validate_internal(schema, names).is_none(),
    }
}

/// Decodes Avro JSON into [`Value`]s, bound to a schema.
///
/// The named types of the schema are resolved once, when the `Deserializer` is created, so it
/// can then be used for any number of documents, from any number of threads.
///
/// ```
/// use avro_json::{Deserializer, Schema, types::Value};
///
/// let schema = Schema::parse_str(
///     r#"{"type": "record", "name": "Test", "fields": [{"name": "v", "type": ["int", "null"]}]}"#,
/// )?;
/// let deserializer = Deserializer::new(&schema)?;
/// assert_eq!(deserializer.from_json(r#"{"v":{"int":7}}"#)?, Value::from_iter([("v", 7)]));
/// assert!(deserializer.from_json(r#"{}"#).is_err());
/// # Ok::<(), avro_json::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Deserializer<'s> {
    resolved: ResolvedSchema<'s>,
}

impl<'s> Deserializer<'s> {
    /// Creates a `Deserializer` for `schema`.
    ///
    /// # Errors
    /// When `schema` references a named type it does not define.
    pub fn new(schema: &'s Schema) -> AvroResult<Self> {
        Ok(Self {
            resolved: ResolvedSchema::try_from(schema)?,
        })
    }

    /// Creates a `Deserializer` for `schema`, whose references may point at the named types of
    /// `schemata`, as returned by [`Schema::parse_list`].
    pub fn with_schemata(schema: &'s Schema, schemata: &'s [Schema]) -> AvroResult<Self> {
        Ok(Self {
            resolved: ResolvedSchema::new_with_schemata(schema, schemata)?,
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.resolved.get_root_schema()
    }

    /// Decodes an already parsed Avro JSON document.
    ///
    /// `bytes` and `fixed` values may be given either as strings, as they appear in JSON, or as
    /// raw [`Value::Bytes`].
    pub fn from_value(&self, value: &Value) -> AvroResult<Value> {
        decode_internal(Some(value), self.schema(), self.resolved.get_names())
    }

    pub fn from_json_value(&self, json: &JsonValue) -> AvroResult<Value> {
        self.from_value(&Value::from(json.clone()))
    }

    /// Parses and decodes Avro JSON text.
    pub fn from_json(&self, json: &str) -> AvroResult<Value> {
        let json: JsonValue = serde_json::from_str(json).map_err(Details::ParseJson)?;
        self.from_value(&Value::from(json))
    }

    /// Reads, parses and decodes Avro JSON text.
    pub fn from_reader<R: Read>(&self, reader: R) -> AvroResult<Value> {
        let json: JsonValue = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                Details::ReadJson(e.into())
            } else {
                Details::ParseJson(e)
            }
        })?;
        self.from_value(&Value::from(json))
    }
}
