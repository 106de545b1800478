//! In-memory model of the protocol's JSON schema document.
//!
//! Only the keywords the generator understands are modelled: `type`, `items`,
//! `$ref`, `properties`, `required`, `allOf`, `enum` and the open-enumeration
//! extension `_enum`. Everything else in the document is ignored.
//!
//! Definition and property maps are `BTreeMap`s keyed by name, so every walk
//! over them is in name order and regenerated output is diff-stable.

use crate::error::{CodegenError, Result};
use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Prefix every in-document reference must carry
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Named property map of a definition or inline object
pub type Properties = BTreeMap<SmolStr, Property>;

/// Root of a protocol schema document
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Schema {
    #[serde(rename = "$schema")]
    pub schema: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<TypeValue>,
    pub definitions: BTreeMap<SmolStr, Definition>,
}

/// One named schema node
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct Definition {
    #[serde(rename = "type")]
    pub ty: Option<TypeValue>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub required: Vec<SmolStr>,
    /// Base mixins. The protocol only ever uses `[ref to role, own body]`.
    #[serde(default, rename = "allOf")]
    pub all_of: Vec<Definition>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

/// A field inside a definition or an inline `properties` block
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct Property {
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,
    pub description: Option<String>,
}

/// Raw type information attached to a property or array item
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub ty: Option<TypeValue>,
    pub items: Option<Box<TypeDescriptor>>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub required: Vec<SmolStr>,
    /// Closed enumeration: the exhaustive list of legal values
    #[serde(default, rename = "enum")]
    pub closed_enum: Vec<String>,
    /// Open enumeration: suggested, non-exhaustive values
    #[serde(default, rename = "_enum")]
    pub open_enum: Vec<String>,
}

/// The value of a `type` keyword.
///
/// A single keyword, a list of keywords (a union), or anything else the
/// document happens to contain, which is rejected at type resolution time.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum TypeValue {
    Keyword(String),
    Union(Vec<TypeValue>),
    Other(serde_json::Value),
}

impl Schema {
    /// Parse a schema document. `origin` names the source in diagnostics.
    pub fn parse(bytes: &[u8], origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        let schema: Self = serde_json::from_slice(bytes).map_err(|e| {
            let src = String::from_utf8_lossy(bytes).into_owned();
            CodegenError::parse_error_with_source(e, origin.as_str(), src)
        })?;
        tracing::info!("loaded {} definitions from {origin}", schema.len());
        Ok(schema)
    }

    /// All definitions, ordered by name
    pub fn definitions_sorted(&self) -> impl Iterator<Item = (&SmolStr, &Definition)> {
        self.definitions.iter()
    }

    /// Resolve a `#/definitions/<name>` reference
    ///
    /// Returns `None` if the reference has another shape or names an absent
    /// definition.
    pub fn resolve_ref(&self, ref_str: &str) -> Option<(&SmolStr, &Definition)> {
        let name = ref_str.strip_prefix(DEFINITIONS_PREFIX)?;
        self.definitions.get_key_value(name)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the schema has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Property {
    /// Properties and required list of the object this property describes,
    /// following a `$ref` to the named definition if there is one.
    pub fn object_fields<'s>(
        &'s self,
        schema: &'s Schema,
        def_name: &str,
        field_path: &str,
    ) -> Result<(&'s Properties, &'s [SmolStr])> {
        match &self.descriptor.reference {
            None => Ok((&self.descriptor.properties, &self.descriptor.required)),
            Some(reference) => {
                let (_, def) = schema
                    .resolve_ref(reference)
                    .ok_or_else(|| CodegenError::unknown_ref(reference, def_name, field_path))?;
                Ok((&def.properties, &def.required))
            }
        }
    }
}
