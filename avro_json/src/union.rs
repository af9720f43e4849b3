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

//! Selection of the branch of a union a value belongs to.
//!
//! In Avro JSON a union value is written as `null` when the `null` branch is selected, and as a
//! single-entry object `{"<tag>": <value>}` otherwise. The tag of a branch is the full name of a
//! named type, or the type keyword of an unnamed one.

use crate::schema::{Schema, SchemaKind, UnionSchema};
use crate::types::Value;
use crate::{AvroResult, Error};
use log::trace;
use std::borrow::Cow;

/// The branch of a union selected for a value.
#[derive(Debug, PartialEq)]
pub(crate) enum Branch<'s, 'v> {
    /// The `null` branch: the value is written as a bare JSON `null`.
    Null,
    /// Any other branch: the value is written wrapped in an object keyed by `tag`.
    Wrapped {
        tag: Cow<'s, str>,
        schema: &'s Schema,
        datum: &'v Value,
    },
}

/// Returns the key that identifies `branch` inside a wrapped union value.
pub(crate) fn branch_tag(branch: &Schema) -> Cow<'_, str> {
    match branch.name() {
        Some(name) => Cow::Owned(name.fullname(None)),
        None => Cow::Borrowed(SchemaKind::from(branch).type_name()),
    }
}

/// Selects the branch `datum` is encoded with.
///
/// The branches are tried in declared order and the first one `datum` is valid for wins, so with
/// `["int", "long"]` a small integer is always tagged `int`. `is_valid` decides whether a plain,
/// unwrapped value matches a branch.
pub(crate) fn resolve_for_encode<'s, 'v>(
    union_schema: &'s Schema,
    union: &'s UnionSchema,
    datum: &'v Value,
    is_valid: impl Fn(&'s Schema, &'v Value) -> bool,
) -> AvroResult<Branch<'s, 'v>> {
    let branch = union
        .variants()
        .iter()
        .find(|branch| is_valid(*branch, datum))
        .ok_or_else(|| Error::TypeMismatch(union_schema, datum))?;
    trace!("Encoding {datum:?} with union branch {}", branch_tag(branch));
    Ok(select(branch, datum))
}

/// Selects the branch of a wrapped union value being decoded.
///
/// A JSON `null` selects the `null` branch. Otherwise `datum` must be a single-entry object
/// whose key is the tag of a branch, and whose entry `is_valid` accepts for that branch. The
/// returned branch carries the unwrapped entry.
pub(crate) fn resolve_for_decode<'s, 'v>(
    union_schema: &'s Schema,
    union: &'s UnionSchema,
    datum: &'v Value,
    is_valid: impl Fn(&'s Schema, &'v Value) -> bool,
) -> AvroResult<Branch<'s, 'v>> {
    let (branch, inner) = union
        .variants()
        .iter()
        .find_map(|branch| {
            unwrap(branch, datum)
                .filter(|inner| is_valid(branch, *inner))
                .map(|inner| (branch, inner))
        })
        .ok_or_else(|| Error::TypeMismatch(union_schema, datum))?;
    trace!("Decoding {datum:?} with union branch {}", branch_tag(branch));
    Ok(select(branch, inner))
}

/// Returns the value wrapped for `branch`, if `datum` is shaped as a value of that branch.
///
/// For the `null` branch, the value is `datum` itself when it is `null`.
pub(crate) fn unwrap<'v>(branch: &Schema, datum: &'v Value) -> Option<&'v Value> {
    match (branch, datum) {
        (Schema::Null, Value::Null) => Some(datum),
        (Schema::Null, _) => None,
        (_, Value::Map(entries)) if entries.len() == 1 => entries.get(&*branch_tag(branch)),
        _ => None,
    }
}

fn select<'s, 'v>(branch: &'s Schema, datum: &'v Value) -> Branch<'s, 'v> {
    match branch {
        Schema::Null => Branch::Null,
        _ => Branch::Wrapped {
            tag: branch_tag(branch),
            schema: branch,
            datum,
        },
    }
}
