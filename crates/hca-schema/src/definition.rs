//! Raw schema definition input.
//!
//! This is the serde-facing shape of a schema before inheritance resolution:
//! a nested mapping of entity-type definitions and enumeration definitions.
//! The concrete source format is whatever the caller deserializes from
//! (the built-in Tier 1 schema is embedded JSON); the resolver only sees
//! these types.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::schema::Schema;

/// A complete, unresolved schema definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDef>,
    #[serde(default)]
    pub enums: BTreeMap<String, EnumDef>,
}

impl SchemaDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flatten inheritance and compile constraints into a queryable [`Schema`].
    pub fn resolve(&self) -> Result<Schema> {
        crate::schema::resolve(self)
    }
}

/// One entity-type definition: an optional base type, optional mixins, field
/// additions, and partial overrides of inherited fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub description: Option<String>,
    /// Single-inheritance base type.
    #[serde(default)]
    pub is_a: Option<String>,
    /// Additional parents contributing fields at equal precedence. A field
    /// defined differently by two parents must be redefined by this class.
    #[serde(default)]
    pub mixins: Vec<String>,
    /// Fields introduced (or wholly redefined) by this class, in declaration
    /// order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Partial overrides of inherited fields, applied by name. Only the
    /// attributes present in the override change; field identity does not.
    #[serde(default)]
    pub overrides: Vec<FieldOverride>,
}

/// One field (slot) definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Range name: a primitive (`string`, `integer`, `decimal`), the special
    /// `column_key` range, an enumeration name, or an entity-type name
    /// (making this a reference field).
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multivalued: bool,
    /// Marks the entity type's identifier field. Identifier fields are
    /// implicitly required.
    #[serde(default)]
    pub identifier: bool,
    /// Deprecated fields are retained for backward compatibility and are not
    /// semantically validated.
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub pattern: Option<PatternDef>,
    #[serde(default)]
    pub example: Option<String>,
}

fn default_range() -> String {
    "string".to_string()
}

/// A regex constraint together with its mandatory human-readable restatement.
/// The hint is what validation errors show; the raw regex alone is not an
/// acceptable error message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatternDef {
    pub regex: String,
    pub hint: String,
}

/// A partial override of an inherited field. `None` means "keep the
/// inherited attribute".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldOverride {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub identifier: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub pattern: Option<PatternDef>,
    #[serde(default)]
    pub example: Option<String>,
}

impl FieldOverride {
    /// Apply this override to an inherited field definition.
    pub(crate) fn apply(&self, base: &mut FieldDef) {
        if let Some(title) = &self.title {
            base.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            base.description = Some(description.clone());
        }
        if let Some(range) = &self.range {
            base.range = range.clone();
        }
        if let Some(required) = self.required {
            base.required = required;
        }
        if let Some(multivalued) = self.multivalued {
            base.multivalued = multivalued;
        }
        if let Some(identifier) = self.identifier {
            base.identifier = identifier;
        }
        if let Some(deprecated) = self.deprecated {
            base.deprecated = deprecated;
        }
        if let Some(pattern) = &self.pattern {
            base.pattern = Some(pattern.clone());
        }
        if let Some(example) = &self.example {
            base.example = Some(example.clone());
        }
    }
}

/// One enumeration definition: a closed, case-sensitive set of permissible
/// string values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumDef {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValueDef {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}
