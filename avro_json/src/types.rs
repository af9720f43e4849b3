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

//! Logic handling the intermediate representation of Avro values.
use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, RecordSchema, ResolvedSchema, Schema,
    UnionSchema,
};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value as JsonValue;
use std::{borrow::Borrow, collections::HashMap, fmt::Debug};

/// Represents any valid logical Avro value, the input of encoding and the output of decoding.
///
/// The representation is untyped: a record is a [`Value::Map`] keyed by field name, an enum symbol
/// is a [`Value::String`], and `bytes` and `fixed` both hold their raw octets in
/// [`Value::Bytes`]. Which Avro type a `Value` stands for is decided by the schema it is
/// encoded or decoded with.
#[derive(Clone, Debug, PartialEq, strum_macros::EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Hash))]
pub enum Value {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// An `int` or `long` Avro value.
    Int(i64),
    /// A `float` or `double` Avro value.
    Float(f64),
    /// A `string` or `enum` Avro value.
    String(String),
    /// A `bytes` or `fixed` Avro value, as raw octets.
    Bytes(Vec<u8>),
    /// An `array` Avro value.
    Array(Vec<Value>),
    /// A `map` or `record` Avro value.
    ///
    /// Entries keep their insertion order; comparison ignores it.
    Map(IndexMap<String, Value>),
}

macro_rules! to_value(
    ($type:ty, $variant_constructor:expr) => (
        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                $variant_constructor(value)
            }
        }
    );
);

to_value!(bool, Value::Boolean);
to_value!(i32, |v| Value::Int(i64::from(v)));
to_value!(i64, Value::Int);
to_value!(u32, |v| Value::Int(i64::from(v)));
to_value!(f32, |v| Value::Float(f64::from(v)));
to_value!(f64, Value::Float);
to_value!(String, Value::String);
to_value!(Vec<u8>, Value::Bytes);
to_value!(Vec<Value>, Value::Array);
to_value!(IndexMap<String, Value>, Value::Map);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Self>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Converts a parsed JSON document into a `Value`.
///
/// Numbers become [`Value::Int`] when they fit an `i64` and [`Value::Float`] otherwise. JSON has
/// no bytes, so strings stay strings: turning them into octets is up to the schema.
impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Boolean(b),
            JsonValue::Number(ref n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(items) => Self::Map(
                items
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Validate the value against the given [Schema](../schema/enum.Schema.html).
    ///
    /// See the [Avro specification](https://avro.apache.org/docs/current/specification)
    /// for the full set of rules of schema validation.
    ///
    /// A record field absent from a [`Value::Map`] is validated as [`Value::Null`], and keys not
    /// declared by the record are ignored.
    pub fn validate(&self, schema: &Schema) -> bool {
        match ResolvedSchema::try_from(schema) {
            Ok(rs) => self.validate_with_names(schema, rs.get_names()),
            Err(e) => {
                debug!("Cannot validate against an unresolvable schema: {e}");
                false
            }
        }
    }

    /// Validate the value against `schema`, following references through `names`.
    pub fn validate_with_names<S: Borrow<Schema> + Debug>(
        &self,
        schema: &Schema,
        names: &HashMap<Name, S>,
    ) -> bool {
        match self.validate_internal(schema, names) {
            Some(reason) => {
                debug!("Invalid value: {self:?} for schema: {schema:?}. Reason: {reason}");
                false
            }
            None => true,
        }
    }

    /// Returns the reason the value does not match `schema`, or `None` when it does.
    pub(crate) fn validate_internal<S: Borrow<Schema> + Debug>(
        &self,
        schema: &Schema,
        names: &HashMap<Name, S>,
    ) -> Option<String> {
        match (self, schema) {
            (_, Schema::Ref { name }) => match names.get(name) {
                Some(s) => self.validate_internal(s.borrow(), names),
                None => Some(format!("Unresolved schema reference: '{name}'")),
            },
            (&Value::Null, &Schema::Null) => None,
            (&Value::Boolean(_), &Schema::Boolean) => None,
            (&Value::Int(n), &Schema::Int) => {
                if i32::try_from(n).is_ok() {
                    None
                } else {
                    Some(format!("{n} does not fit an int"))
                }
            }
            (&Value::Int(_), &Schema::Long) => None,
            (&Value::Int(_), &Schema::Float | &Schema::Double) => None,
            (&Value::Float(_), &Schema::Float | &Schema::Double) => None,
            (&Value::String(_), &Schema::String) => None,
            (&Value::Bytes(_), &Schema::Bytes) => None,
            (&Value::Bytes(ref bytes), &Schema::Fixed(FixedSchema { size, .. })) => {
                if bytes.len() == size {
                    None
                } else {
                    Some(format!(
                        "The value's size ({}) is different than the schema's size ({size})",
                        bytes.len()
                    ))
                }
            }
            (Value::String(s), Schema::Enum(EnumSchema { symbols, .. })) => {
                if symbols.contains(s) {
                    None
                } else {
                    Some(format!("'{s}' is not a member of the possible symbols"))
                }
            }
            (Value::Array(items), Schema::Array(ArraySchema { items: inner, .. })) => {
                items.iter().find_map(|item| item.validate_internal(inner, names))
            }
            (Value::Map(items), Schema::Map(MapSchema { values: inner, .. })) => {
                items.iter().find_map(|(key, value)| {
                    value
                        .validate_internal(inner, names)
                        .map(|reason| format!("Map entry '{key}': {reason}"))
                })
            }
            (Value::Map(items), Schema::Record(RecordSchema { fields, .. })) => {
                fields.iter().find_map(|field| {
                    items
                        .get(&field.name)
                        .unwrap_or(&Value::Null)
                        .validate_internal(&field.schema, names)
                        .map(|reason| format!("Field '{}': {reason}", field.name))
                })
            }
            (v, Schema::Union(UnionSchema { schemas, .. })) => {
                if schemas
                    .iter()
                    .any(|branch| v.validate_internal(branch, names).is_none())
                {
                    None
                } else {
                    Some("No branch of the union matches the value".to_string())
                }
            }
            (v, s) => Some(format!(
                "Unsupported value-schema combination! Value: {:?}, schema: {s:?}",
                ValueKind::from(v)
            )),
        }
    }
}
