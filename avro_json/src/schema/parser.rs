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

use crate::error::Details;
use crate::schema::{
    Alias, Aliases, ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, Names, NamespaceRef,
    RecordField, RecordSchema, Schema, UnionSchema,
};
use crate::util::MapHelper;
use crate::validator::validate_enum_symbol_name;
use crate::{AvroResult, Error};
use log::{debug, error, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Default)]
pub(crate) struct Parser {
    input_schemas: HashMap<Name, Value>,
    /// Used to resolve cyclic references, i.e. when a
    /// field's type is a reference to its record's type
    resolving_schemas: Names,
    input_order: Vec<Name>,
    /// Used to avoid parsing the same schema twice
    parsed_schemas: Names,
}

impl Parser {
    pub(crate) fn new(input_schemas: HashMap<Name, Value>, input_order: Vec<Name>) -> Self {
        Self {
            input_schemas,
            resolving_schemas: HashMap::default(),
            input_order,
            parsed_schemas: HashMap::default(),
        }
    }

    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub(super) fn parse_str(&mut self, input: &str) -> AvroResult<Schema> {
        let value = serde_json::from_str(input).map_err(Details::ParseSchemaJson)?;
        self.parse(&value, None)
    }

    /// Create an array of `Schema`s from the named input schemas, in input order.
    ///
    /// A schema referenced by another input schema is defined where it is first reached during
    /// parsing; everywhere else it appears as a [`Schema::Ref`].
    pub(super) fn parse_list(&mut self) -> AvroResult<Vec<Schema>> {
        self.parse_input_schemas()?;

        let mut parsed_schemas = Vec::with_capacity(self.input_order.len());
        for name in std::mem::take(&mut self.input_order) {
            let parsed = self
                .parsed_schemas
                .remove(&name)
                .ok_or(Details::SchemaResolutionError(name))?;
            parsed_schemas.push(parsed);
        }
        Ok(parsed_schemas)
    }

    /// Convert the input schemas to `parsed_schemas`.
    fn parse_input_schemas(&mut self) -> AvroResult<()> {
        let order = self.input_order.clone();
        for name in order {
            // already pulled in by a reference from an earlier input schema
            let Some(value) = self.input_schemas.remove(&name) else {
                continue;
            };
            let parsed = self.parse(&value, None)?;
            self.parsed_schemas.entry(name).or_insert(parsed);
        }
        Ok(())
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    pub(super) fn parse(
        &mut self,
        value: &Value,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match *value {
            Value::String(ref t) => self.parse_known_schema(t.as_str(), enclosing_namespace),
            Value::Object(ref data) => self.parse_complex(data, enclosing_namespace),
            Value::Array(ref data) => self.parse_union(data, enclosing_namespace),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        }
    }

    /// Parse a string as a primitive type or reference to `parsed_schemas`.
    fn parse_known_schema(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match name {
            "null" => Ok(Schema::Null),
            "boolean" => Ok(Schema::Boolean),
            "int" => Ok(Schema::Int),
            "long" => Ok(Schema::Long),
            "double" => Ok(Schema::Double),
            "float" => Ok(Schema::Float),
            "bytes" => Ok(Schema::Bytes),
            "string" => Ok(Schema::String),
            _ => self.fetch_schema_ref(name, enclosing_namespace),
        }
    }

    /// Given a name, returns a [`Schema::Ref`] to the named schema it designates.
    ///
    /// The name is looked up among the parsed schemas, then among the schemas currently being
    /// resolved (a record referring to itself), and finally among the not yet parsed input
    /// schemas of [`Schema::parse_list`], which are parsed on demand. An unqualified name is
    /// first qualified with the enclosing namespace, then tried as is.
    fn fetch_schema_ref(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match name {
            "record" | "enum" | "fixed" | "error" => {
                return Err(Details::InvalidSchemaRecord(name.to_string()).into());
            }
            _ => (),
        }

        let name = Name::new(name)?;
        let mut candidates = vec![name.fully_qualified_name(enclosing_namespace)];
        if name.namespace.is_none() && enclosing_namespace.is_some() {
            candidates.push(name.clone());
        }

        for candidate in &candidates {
            if let Some(schema) = self.get_known_ref(candidate) {
                return Ok(schema);
            }
        }

        for candidate in candidates {
            if let Some(value) = self.input_schemas.remove(&candidate) {
                // input schemas never inherit the namespace of the schema referring to them
                let parsed = self.parse(&value, None)?;
                let schema_ref = match parsed.name() {
                    Some(defined) => Schema::Ref {
                        name: defined.clone(),
                    },
                    None => parsed.clone(),
                };
                self.parsed_schemas.entry(candidate).or_insert(parsed);
                return Ok(schema_ref);
            }
        }

        let full_name = name.fullname(enclosing_namespace);
        if full_name == "bool" {
            Err(Details::ParsePrimitiveSimilar(full_name, "boolean").into())
        } else {
            Err(Details::ParsePrimitive(full_name).into())
        }
    }

    /// Returns a reference to an already parsed, or currently resolving, named schema.
    ///
    /// The reference always carries the schema's own name, even when it was found through one of
    /// its aliases.
    fn get_known_ref(&self, name: &Name) -> Option<Schema> {
        self.parsed_schemas
            .get(name)
            .or_else(|| self.resolving_schemas.get(name))
            .map(|known| match known.name() {
                Some(defined) => Schema::Ref {
                    name: defined.clone(),
                },
                None => known.clone(),
            })
    }

    /// Parse a `serde_json::Value` representing a complex Avro type into a `Schema`.
    ///
    /// Avro supports "recursive" definition of types.
    /// e.g: `{"type": {"type": "string"}}`
    pub(super) fn parse_complex(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match complex.get("logicalType") {
            // Logical types are not interpreted: the underlying type is used.
            Some(Value::String(_)) | None => {}
            Some(value) => warn!(
                "Ignoring logicalType {value} which is not a string, the underlying type is used"
            ),
        }
        match complex.get("type") {
            Some(Value::String(t)) => match t.as_str() {
                "record" => self.parse_record(complex, enclosing_namespace, false),
                "error" => self.parse_record(complex, enclosing_namespace, true),
                "enum" => self.parse_enum(complex, enclosing_namespace),
                "array" => self.parse_array(complex, enclosing_namespace),
                "map" => self.parse_map(complex, enclosing_namespace),
                "fixed" => self.parse_fixed(complex, enclosing_namespace),
                other => self.parse_known_schema(other, enclosing_namespace),
            },
            Some(Value::Object(data)) => self.parse_complex(data, enclosing_namespace),
            Some(Value::Array(variants)) => self.parse_union(variants, enclosing_namespace),
            Some(unknown) => Err(Details::GetComplexType(unknown.clone()).into()),
            None => Err(Details::GetComplexTypeField.into()),
        }
    }

    fn register_resolving_schema(&mut self, name: &Name, aliases: &Aliases) {
        let resolving_schema = Schema::Ref { name: name.clone() };
        self.resolving_schemas
            .insert(name.clone(), resolving_schema.clone());

        let namespace = name.namespace.as_deref();

        if let Some(aliases) = aliases {
            aliases.iter().for_each(|alias| {
                self.resolving_schemas.insert(
                    alias.fully_qualified_name(namespace),
                    resolving_schema.clone(),
                );
            });
        }
    }

    fn register_parsed_schema(
        &mut self,
        fully_qualified_name: &Name,
        schema: &Schema,
        aliases: &Aliases,
    ) -> AvroResult<()> {
        self.resolving_schemas.remove(fully_qualified_name);
        if self
            .parsed_schemas
            .insert(fully_qualified_name.clone(), schema.clone())
            .is_some()
        {
            return Err(Details::AmbiguousSchemaDefinition(fully_qualified_name.clone()).into());
        }

        let namespace = fully_qualified_name.namespace.as_deref();

        if let Some(aliases) = aliases {
            aliases.iter().for_each(|alias| {
                let alias_fullname = alias.fully_qualified_name(namespace);
                self.resolving_schemas.remove(&alias_fullname);
                self.parsed_schemas.insert(alias_fullname, schema.clone());
            });
        }
        Ok(())
    }

    /// Returns a reference to an already seen schema when `complex` names a known type instead of
    /// declaring one, e.g. `{"type": "Node"}`.
    fn get_already_seen_schema(
        &self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> Option<Schema> {
        match complex.get("type") {
            Some(Value::String(typ)) => {
                let name = Name::new(typ).ok()?.fully_qualified_name(enclosing_namespace);
                self.get_known_ref(&name)
            }
            _ => None,
        }
    }

    /// Parse a `serde_json::Value` representing an Avro record type into a `Schema`.
    fn parse_record(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        is_error: bool,
    ) -> AvroResult<Schema> {
        let fields_opt = complex.get("fields");

        if fields_opt.is_none()
            && let Some(seen) = self.get_already_seen_schema(complex, enclosing_namespace)
        {
            return Ok(seen);
        }

        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases =
            fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace.as_deref())?;

        self.register_resolving_schema(&fully_qualified_name, &aliases);

        debug!("Going to parse record schema: {fully_qualified_name}");

        let fields: Vec<RecordField> = fields_opt
            .and_then(|fields| fields.as_array())
            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))
            .and_then(|fields| {
                fields
                    .iter()
                    .filter_map(|field| field.as_object())
                    .enumerate()
                    .map(|(position, field)| {
                        RecordField::parse(field, position, self, &fully_qualified_name)
                    })
                    .collect::<Result<_, _>>()
            })?;

        let mut names = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(Details::FieldNameDuplicate(field.name.clone()).into());
            }
        }

        let schema = Schema::Record(
            RecordSchema::builder()
                .name(fully_qualified_name.clone())
                .aliases(aliases.clone())
                .doc(complex.doc())
                .fields(fields)
                .is_error(is_error)
                .attributes(get_custom_attributes(complex, &["fields"]))
                .build(),
        );

        self.register_parsed_schema(&fully_qualified_name, &schema, &aliases)?;
        Ok(schema)
    }

    /// Parse a `serde_json::Value` representing a Avro enum type into a `Schema`.
    fn parse_enum(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let symbols_opt = complex.get("symbols");

        if symbols_opt.is_none()
            && let Some(seen) = self.get_already_seen_schema(complex, enclosing_namespace)
        {
            return Ok(seen);
        }

        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases =
            fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace.as_deref())?;

        let symbols: Vec<String> = symbols_opt
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::from(Details::GetEnumSymbolsField))
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| symbol.as_str().map(|s| s.to_string()))
                    .collect::<Option<_>>()
                    .ok_or_else(|| Error::from(Details::GetEnumSymbols))
            })?;

        let mut existing_symbols: HashSet<&String> = HashSet::with_capacity(symbols.len());
        for symbol in symbols.iter() {
            validate_enum_symbol_name(symbol)?;

            if !existing_symbols.insert(symbol) {
                return Err(Details::EnumSymbolDuplicate(symbol.to_string()).into());
            }
        }

        let schema = Schema::Enum(EnumSchema {
            name: fully_qualified_name.clone(),
            aliases: aliases.clone(),
            doc: complex.doc(),
            default: complex.string("default"),
            symbols,
            attributes: get_custom_attributes(complex, &["symbols", "default"]),
        });

        self.register_parsed_schema(&fully_qualified_name, &schema, &aliases)?;

        Ok(schema)
    }

    /// Parse a `serde_json::Value` representing a Avro array type into a `Schema`.
    fn parse_array(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let items = complex
            .get("items")
            .ok_or_else(|| Details::GetArrayItemsField.into())
            .and_then(|items| self.parse(items, enclosing_namespace))?;
        Ok(Schema::Array(ArraySchema {
            items: Box::new(items),
            attributes: get_custom_attributes(complex, &["items"]),
        }))
    }

    /// Parse a `serde_json::Value` representing a Avro map type into a `Schema`.
    fn parse_map(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let values = complex
            .get("values")
            .ok_or_else(|| Details::GetMapValuesField.into())
            .and_then(|values| self.parse(values, enclosing_namespace))?;
        Ok(Schema::Map(MapSchema {
            values: Box::new(values),
            attributes: get_custom_attributes(complex, &["values"]),
        }))
    }

    /// Parse a `serde_json::Value` representing a Avro union type into a `Schema`.
    fn parse_union(
        &mut self,
        items: &[Value],
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let schemas = items
            .iter()
            .map(|v| self.parse(v, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()?;
        if schemas.is_empty() {
            error!(
                "Union schemas should have at least two members! \
                Please enable debug logging to find out which Record schema \
                declares the union with 'RUST_LOG=avro_json::schema=debug'."
            );
        } else if schemas.len() == 1 {
            warn!(
                "Union schema with just one member! Consider dropping the union! \
                Please enable debug logging to find out which Record schema \
                declares the union with 'RUST_LOG=avro_json::schema=debug'."
            );
        }
        Ok(Schema::Union(UnionSchema::new(schemas)?))
    }

    /// Parse a `serde_json::Value` representing a Avro fixed type into a `Schema`.
    fn parse_fixed(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let size_opt = complex.get("size");
        if size_opt.is_none()
            && let Some(seen) = self.get_already_seen_schema(complex, enclosing_namespace)
        {
            return Ok(seen);
        }

        let size = match size_opt {
            Some(size) => size
                .as_u64()
                .and_then(|size| usize::try_from(size).ok())
                .ok_or_else(|| Details::GetFixedSizeFieldPositive(size.clone())),
            None => Err(Details::GetFixedSizeField),
        }?;

        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases =
            fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace.as_deref())?;

        let schema = Schema::Fixed(FixedSchema {
            name: fully_qualified_name.clone(),
            aliases: aliases.clone(),
            doc: complex.doc(),
            size,
            attributes: get_custom_attributes(complex, &["size"]),
        });

        self.register_parsed_schema(&fully_qualified_name, &schema, &aliases)?;

        Ok(schema)
    }
}

fn get_custom_attributes(
    complex: &Map<String, Value>,
    excluded: &[&'static str],
) -> BTreeMap<String, Value> {
    let mut custom_attributes: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in complex {
        match key.as_str() {
            "type" | "name" | "namespace" | "doc" | "aliases" | "logicalType" => continue,
            candidate if excluded.contains(&candidate) => continue,
            _ => custom_attributes.insert(key.clone(), value.clone()),
        };
    }
    custom_attributes
}

// A type alias may be specified either as a fully namespace-qualified, or relative
// to the namespace of the name it is an alias for. For example, if a type named "a.b"
// has aliases of "c" and "x.y", then the fully qualified names of its aliases are "a.c"
// and "x.y".
// https://avro.apache.org/docs/++version++/specification/#aliases
fn fix_aliases_namespace(aliases: Option<Vec<String>>, namespace: NamespaceRef) -> AvroResult<Aliases> {
    aliases
        .map(|aliases| {
            aliases
                .iter()
                .map(|alias| match namespace {
                    Some(ns) if !alias.contains('.') => Alias::new(&format!("{ns}.{alias}")),
                    _ => Alias::new(alias),
                })
                .collect::<AvroResult<Vec<_>>>()
        })
        .transpose()
}
