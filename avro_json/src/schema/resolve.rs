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

use crate::AvroResult;
use crate::error::{Details, Error};
use crate::schema::{EnumSchema, FixedSchema, Name, NamesRef, RecordSchema, Schema, UnionSchema};
use std::collections::HashMap;

/// A root schema together with every named schema reachable from it.
///
/// Names are stored fully qualified, as produced by the parser, so a [`Schema::Ref`] can be
/// followed with a single lookup.
#[derive(Debug, Clone)]
pub struct ResolvedSchema<'s> {
    names_ref: NamesRef<'s>,
    root: &'s Schema,
}

impl<'s> TryFrom<&'s Schema> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schema: &'s Schema) -> AvroResult<Self> {
        Self::new_with_schemata(schema, &[])
    }
}

impl<'s> ResolvedSchema<'s> {
    /// Resolves `root`, using the named schemas in `schemata` for references that `root` does
    /// not define itself.
    ///
    /// `schemata` is typically the output of [`Schema::parse_list`].
    pub fn new_with_schemata(root: &'s Schema, schemata: &'s [Schema]) -> AvroResult<Self> {
        let mut rs = ResolvedSchema {
            names_ref: HashMap::new(),
            root,
        };
        for schema in schemata {
            rs.define(schema)?;
        }
        rs.define(root)?;
        rs.check_references(root)?;
        for schema in schemata {
            rs.check_references(schema)?;
        }
        Ok(rs)
    }

    pub fn get_root_schema(&self) -> &'s Schema {
        self.root
    }

    pub fn get_names(&self) -> &NamesRef<'s> {
        &self.names_ref
    }

    /// Follows a reference to the named schema it points at.
    pub fn lookup(&self, name: &Name) -> AvroResult<&'s Schema> {
        self.names_ref
            .get(name)
            .copied()
            .ok_or_else(|| Error::SchemaResolutionError(name.clone()))
    }

    /// Registers every named schema defined (not merely referenced) within `schema`.
    fn define(&mut self, schema: &'s Schema) -> AvroResult<()> {
        match schema {
            Schema::Array(array) => self.define(&array.items),
            Schema::Map(map) => self.define(&map.values),
            Schema::Union(UnionSchema { schemas, .. }) => {
                for schema in schemas {
                    self.define(schema)?;
                }
                Ok(())
            }
            Schema::Enum(EnumSchema { name, .. }) | Schema::Fixed(FixedSchema { name, .. }) => {
                self.insert(name, schema)
            }
            Schema::Record(RecordSchema { name, fields, .. }) => {
                self.insert(name, schema)?;
                for field in fields {
                    self.define(&field.schema)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn insert(&mut self, name: &Name, schema: &'s Schema) -> AvroResult<()> {
        match self.names_ref.get(name) {
            // the same definition reached twice, e.g. through `parse_list`
            Some(existing) if std::ptr::eq(*existing, schema) => Ok(()),
            Some(_) => Err(Details::AmbiguousSchemaDefinition(name.clone()).into()),
            None => {
                self.names_ref.insert(name.clone(), schema);
                Ok(())
            }
        }
    }

    fn check_references(&self, schema: &Schema) -> AvroResult<()> {
        match schema {
            Schema::Array(array) => self.check_references(&array.items),
            Schema::Map(map) => self.check_references(&map.values),
            Schema::Union(UnionSchema { schemas, .. }) => {
                schemas.iter().try_for_each(|s| self.check_references(s))
            }
            Schema::Record(RecordSchema { fields, .. }) => fields
                .iter()
                .try_for_each(|field| self.check_references(&field.schema)),
            Schema::Ref { name } => self.lookup(name).map(|_| ()),
            _ => Ok(()),
        }
    }
}
