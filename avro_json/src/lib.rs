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

//! Encoding and decoding of the **[Avro](https://avro.apache.org/) JSON encoding**.
//!
//! The Avro JSON encoding is the JSON form of Avro data described by the
//! [specification](https://avro.apache.org/docs/current/specification/#json-encoding). It is not
//! the same as dumping a value as plain JSON:
//!
//! - a union value is written as `null` when it holds the `null` branch, and as a single-entry
//!   object `{"<branch>": <value>}` otherwise, where `<branch>` is the full name of a named type or
//!   the type keyword of any other type. This keeps `["int", "long"]` or two records with the same
//!   fields apart.
//! - `bytes` and `fixed` values are written as strings whose characters are the byte values, i.e.
//!   the bytes read as ISO-8859-1.
//! - record fields are written in the order the schema declares them.
//!
//! Values are held in the untyped [`Value`](types::Value) tree. A [`Schema`] is parsed once and
//! then bound to any number of [`Serializer`]s and [`Deserializer`]s:
//!
//! ```
//! use avro_json::{Deserializer, Schema, Serializer, types::Value};
//!
//! let schema = Schema::parse_str(
//!     r#"
//!     {
//!         "type": "record",
//!         "name": "User",
//!         "namespace": "example.avro",
//!         "fields": [
//!             {"name": "name", "type": "string"},
//!             {"name": "favorite_number", "type": ["int", "null"]},
//!             {"name": "avatar", "type": ["null", "bytes"]}
//!         ]
//!     }
//!     "#,
//! )?;
//!
//! let user = Value::from_iter([
//!     ("name", Value::from("Alyssa")),
//!     ("favorite_number", Value::Int(256)),
//!     ("avatar", Value::Bytes(vec![0x00, 0x41])),
//! ]);
//!
//! let json = Serializer::new(&schema)?.to_json(&user)?;
//! assert_eq!(
//!     json,
//!     r#"{"name":"Alyssa","favorite_number":{"int":256},"avatar":{"bytes":"\u0000A"}}"#
//! );
//! assert_eq!(Deserializer::new(&schema)?.from_json(&json)?, user);
//! # Ok::<(), avro_json::Error>(())
//! ```
//!
//! Decoding is strict about missing record fields: a field absent from the input is an error,
//! even when its type is a nullable union. An explicit `null` is accepted. Fields the schema does
//! not declare are ignored.
//!
//! # Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never installs a logger.
//!
//! # MSRV
//!
//! The current MSRV is 1.88.0.

pub mod bytes;
mod decode;
mod encode;
pub mod error;
pub mod schema;
pub mod types;
mod union;
mod util;
pub mod validator;

pub use decode::{Deserializer, from_json, from_value};
pub use encode::{Serializer, to_json, to_json_value};
pub use error::Error;
pub use schema::Schema;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;
