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

//! # Custom naming rules
//!
//! By default, schema names, namespaces, enum symbols and record field names must follow the
//! rules of the [Avro specification](https://avro.apache.org/docs/current/specification/#names).
//!
//! Schemas written for other Avro JSON tools are sometimes more relaxed. For those, the rules can
//! be replaced once per process, before the first schema is parsed:
//!
//! ```
//! # use avro_json::validator::{NamingRules, set_naming_rules};
//! # use regex_lite::Regex;
//! # use std::sync::OnceLock;
//! struct DashedFieldNames;
//!
//! impl NamingRules for DashedFieldNames {
//!     fn field_name_regex(&self) -> &'static Regex {
//!         static FIELD_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
//!         FIELD_NAME_ONCE.get_or_init(|| {
//!             Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("Regex is valid")
//!         })
//!     }
//! }
//!
//! if set_naming_rules(Box::new(DashedFieldNames)).is_err() {
//!     panic!("Naming rules were already configured")
//! }
//! ```
//!
//! **Note**: the rules can be set only once per application lifetime! Parsing a schema before
//! setting them registers the default rules.

use crate::{AvroResult, error::Details};
use log::debug;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Rules that schema names, namespaces, enum symbols and field names must obey.
///
/// Every method has a default implementation that follows the Avro specification, so an
/// implementation only overrides what it wants to relax.
pub trait NamingRules: Send + Sync {
    /// The regex for a (possibly namespace qualified) schema name.
    ///
    /// It must provide a capture group named `name` that captures the name part.
    fn schema_name_regex(&self) -> &'static Regex {
        static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
        SCHEMA_NAME_ONCE.get_or_init(|| {
            Regex::new(
                // An optional namespace (with optional dots) followed by a name without any dots in it.
                r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$",
            )
            .expect("Regex is valid")
        })
    }

    fn namespace_regex(&self) -> &'static Regex {
        static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
        NAMESPACE_ONCE.get_or_init(|| {
            Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$")
                .expect("Regex is valid")
        })
    }

    fn enum_symbol_regex(&self) -> &'static Regex {
        static ENUM_SYMBOL_ONCE: OnceLock<Regex> = OnceLock::new();
        ENUM_SYMBOL_ONCE
            .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
    }

    fn field_name_regex(&self) -> &'static Regex {
        static FIELD_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
        FIELD_NAME_ONCE
            .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
    }
}

/// Follows the Avro specification to the letter.
struct SpecificationRules;

impl NamingRules for SpecificationRules {}

static NAMING_RULES_ONCE: OnceLock<Box<dyn NamingRules>> = OnceLock::new();

/// Replaces the default naming rules.
///
/// Returns `Err(rules)` if rules are already configured.
pub fn set_naming_rules(rules: Box<dyn NamingRules>) -> Result<(), Box<dyn NamingRules>> {
    debug!("Setting custom naming rules.");
    NAMING_RULES_ONCE.set(rules)
}

fn rules() -> &'static dyn NamingRules {
    NAMING_RULES_ONCE
        .get_or_init(|| {
            debug!("Going to use the default naming rules.");
            Box::new(SpecificationRules)
        })
        .as_ref()
}

/// Validates a schema name and returns the start byte of its name part.
pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<usize> {
    let regex = rules().schema_name_regex();
    let caps = regex
        .captures(schema_name)
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()))?;
    caps.name("name")
        .map(|name| name.start())
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()).into())
}

pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    let regex = rules().namespace_regex();
    if regex.is_match(namespace) {
        Ok(())
    } else {
        Err(Details::InvalidNamespace(namespace.to_string(), regex.as_str()).into())
    }
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if rules().enum_symbol_regex().is_match(symbol) {
        Ok(())
    } else {
        Err(Details::EnumSymbolName(symbol.to_string()).into())
    }
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if rules().field_name_regex().is_match(field_name) {
        Ok(())
    } else {
        Err(Details::FieldName(field_name.to_string()).into())
    }
}
