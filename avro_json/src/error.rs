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
    schema::{Name, Schema, SchemaKind},
    types::Value,
};
use std::{error::Error as _, fmt};

/// Errors encountered while parsing schemas or while encoding and decoding Avro JSON.
///
/// To inspect the details of the error use [`details`](Self::details) or
/// [`into_details`](Self::into_details) to get a [`Details`] which contains more precise error
/// information.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    /// Returns `true` when a datum did not match its schema.
    ///
    /// A record field absent from the decoded input is a mismatch too: the unset marker never
    /// validates against any schema.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            *self.details,
            Details::TypeMismatch { .. } | Details::MissingField { .. } | Details::MissingValue(_)
        )
    }
}

/// Functions for constructing a specific error type.
#[allow(non_snake_case, reason = "Want to mimic the `Details` variants")]
impl Error {
    /// Construct a new [`Error`] with a [`Details::TypeMismatch`].
    pub(crate) fn TypeMismatch(schema: &Schema, value: &Value) -> Self {
        Self::new(Details::TypeMismatch {
            schema: schema.clone(),
            value: value.clone(),
        })
    }

    /// Construct a new [`Error`] with a [`Details::MissingField`].
    pub(crate) fn MissingField(record: &Name, field: &str, schema: &Schema) -> Self {
        Self::new(Details::MissingField {
            record: record.clone(),
            field: field.to_string(),
            schema: schema.clone(),
        })
    }

    /// Construct a new [`Error`] with a [`Details::SchemaResolutionError`].
    pub(crate) fn SchemaResolutionError(name: Name) -> Self {
        Self::new(Details::SchemaResolutionError(name))
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum Details {
    #[error("Value {value:?} does not match schema {}", schema_to_json(.schema))]
    TypeMismatch { schema: Schema, value: Value },

    #[error(
        "Field '{field}' of record '{record}' is missing from the input and its schema {} does not allow it",
        schema_to_json(.schema)
    )]
    MissingField {
        record: Name,
        field: String,
        schema: Schema,
    },

    #[error("No value present for schema {}", schema_to_json(.0))]
    MissingValue(Schema),

    #[error("Character {0:?} is outside of ISO-8859-1 and cannot be converted to a byte")]
    BytesToLatin1(char),

    #[error("Failed to convert float to json: {0}")]
    ConvertF64ToJson(f64),

    #[error("Failed to parse Avro JSON: {0}")]
    ParseJson(#[source] serde_json::Error),

    #[error("Failed to write Avro JSON: {0}")]
    WriteJson(#[source] serde_json::Error),

    #[error("Failed to read Avro JSON: {0}")]
    ReadJson(#[source] std::io::Error),

    /// Error while resolving Schema::Ref
    #[error("Unresolved schema reference: {0}")]
    SchemaResolutionError(Name),

    /// Error when two named schema have the same fully qualified name
    #[error("Two named schema defined for same fullname: {0}.")]
    AmbiguousSchemaDefinition(Name),

    #[error("Failed to parse schema from JSON: {0}")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Failed to read schema: {0}")]
    ReadSchemaFromReader(#[source] std::io::Error),

    #[error("Must be a JSON string, object or array")]
    ParseSchemaFromValidJson,

    #[error("Unknown primitive type: {0}")]
    ParsePrimitive(String),

    #[error("Unknown type: {0}. Did you mean {1}?")]
    ParsePrimitiveSimilar(String, &'static str),

    #[error("No `name` field")]
    GetNameField,

    #[error("No `name` in record field")]
    GetNameFieldFromRecord,

    #[error("Invalid schema name {0}. It must match the regex '{1}'")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace {0}. It must match the regex '{1}'")]
    InvalidNamespace(String, &'static str),

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Duplicate field name {0}")]
    FieldNameDuplicate(String),

    #[error("No `type` field found")]
    GetComplexTypeField,

    #[error("Unknown complex type: {0}")]
    GetComplexType(serde_json::Value),

    #[error("No `fields` in record")]
    GetRecordFieldsJson,

    #[error("Invalid schema: There is no type called '{0}', if you meant to define a non-primitive schema, it should be defined inside `type` attribute.")]
    InvalidSchemaRecord(String),

    #[error("No `symbols` field in enum")]
    GetEnumSymbolsField,

    #[error("Unable to parse `symbols` in enum")]
    GetEnumSymbols,

    #[error("Duplicate enum symbol {0}")]
    EnumSymbolDuplicate(String),

    #[error("No `items` in array")]
    GetArrayItemsField,

    #[error("No `values` in map")]
    GetMapValuesField,

    #[error("Fixed schema `size` value must be a positive integer: {0}")]
    GetFixedSizeFieldPositive(serde_json::Value),

    #[error("Fixed schema has no `size`")]
    GetFixedSizeField,

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate types, found at least two {0}")]
    GetUnionDuplicate(SchemaKind),

    #[error("Unions cannot contain two named types with the same name: {0}")]
    GetUnionDuplicateName(Name),

    #[error("Two schemas with the same fullname were given: {0:?}")]
    NameCollision(String),
}

fn schema_to_json(schema: &Schema) -> String {
    serde_json::to_string(schema).unwrap_or_else(|_| format!("{schema:?}"))
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
