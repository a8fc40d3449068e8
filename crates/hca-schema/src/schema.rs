//! Resolved schema model.
//!
//! Inheritance is flattened once at load time into per-entity-type effective
//! field lists; after that the schema is a pure read-only structure, safe to
//! share across concurrent validation runs without synchronization.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::definition::{ClassDef, FieldDef, SchemaDefinition};
use crate::error::{Result, SchemaError};

/// The kind of values a field accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    String,
    Integer,
    Decimal,
    /// Values (or list elements) must name a field observed on records of the
    /// same entity type, e.g. `batch_condition` naming covariate columns.
    ColumnKey,
    /// Values must be members of the named enumeration.
    Enum(String),
    /// Values must match identifiers of records of the named entity type
    /// supplied in the same validation run.
    Entity(String),
}

impl Range {
    pub fn as_str(&self) -> &str {
        match self {
            Range::String => "string",
            Range::Integer => "integer",
            Range::Decimal => "decimal",
            Range::ColumnKey => "column_key",
            Range::Enum(name) | Range::Entity(name) => name,
        }
    }
}

/// A compiled pattern constraint. Matching is full-string (anchored at both
/// ends), never substring search.
#[derive(Debug, Clone, Serialize)]
pub struct FieldPattern {
    pub source: String,
    /// Human-readable restatement of the pattern's intent, shown in
    /// validation errors instead of the raw regex.
    pub hint: String,
    #[serde(skip)]
    regex: Regex,
}

impl FieldPattern {
    fn compile(source: &str, hint: &str) -> std::result::Result<Self, regex::Error> {
        let anchored = format!("^(?:{source})$");
        Ok(FieldPattern {
            source: source.to_string(),
            hint: hint.to_string(),
            regex: Regex::new(&anchored)?,
        })
    }

    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// One effective field of an entity type, with inheritance already applied.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub range: Range,
    pub required: bool,
    pub multivalued: bool,
    pub identifier: bool,
    pub deprecated: bool,
    pub pattern: Option<FieldPattern>,
    pub example: Option<String>,
}

/// An entity type with its flattened field list.
#[derive(Debug, Clone, Serialize)]
pub struct EntityType {
    pub name: String,
    pub description: Option<String>,
    /// Base type this entity was flattened from, if any.
    pub base: Option<String>,
    /// Effective fields: base fields in declaration order with overrides
    /// applied in place, additions appended.
    pub fields: Vec<FieldDefinition>,
    /// Name of the identifier field. Exactly one per entity type.
    pub identifier: String,
}

impl EntityType {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn identifier_field(&self) -> &FieldDefinition {
        // Load-time validation guarantees the identifier exists.
        self.fields
            .iter()
            .find(|field| field.name == self.identifier)
            .expect("entity type identifier field")
    }
}

/// A closed set of permissible values. Comparison is exact-match and
/// case-sensitive; no normalization is applied.
#[derive(Debug, Clone, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumValue {
    pub value: String,
    pub description: Option<String>,
}

impl EnumDefinition {
    pub fn contains(&self, candidate: &str) -> bool {
        self.values.iter().any(|entry| entry.value == candidate)
    }

    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|entry| entry.value.as_str())
    }
}

/// A fully resolved, immutable schema.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub name: Option<String>,
    pub description: Option<String>,
    entity_types: BTreeMap<String, EntityType>,
    enums: BTreeMap<String, EnumDefinition>,
}

impl Schema {
    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    /// Ordered effective field definitions for an entity type.
    pub fn fields_for(&self, entity_type: &str) -> Option<&[FieldDefinition]> {
        self.entity_types
            .get(entity_type)
            .map(|entity| entity.fields.as_slice())
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.get(name)
    }

    /// Permissible values of an enumeration.
    pub fn enum_values_for(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        self.enums.get(name).map(EnumDefinition::value_names)
    }

    pub fn identifier_field(&self, entity_type: &str) -> Option<&FieldDefinition> {
        self.entity_types
            .get(entity_type)
            .map(EntityType::identifier_field)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entity_types.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.enums.values()
    }
}

/// Flatten a schema definition into a [`Schema`].
pub(crate) fn resolve(definition: &SchemaDefinition) -> Result<Schema> {
    let mut resolver = Resolver {
        definition,
        resolved: BTreeMap::new(),
        in_progress: Vec::new(),
    };

    let mut entity_types = BTreeMap::new();
    for (class_name, class) in &definition.classes {
        let effective = resolver.effective_fields(class_name)?.clone();
        let entity = compile_entity_type(definition, class_name, class, effective)?;
        debug!(
            entity_type = class_name.as_str(),
            fields = entity.fields.len(),
            "resolved entity type"
        );
        entity_types.insert(class_name.clone(), entity);
    }

    let mut enums = BTreeMap::new();
    for (enum_name, def) in &definition.enums {
        enums.insert(
            enum_name.clone(),
            EnumDefinition {
                name: enum_name.clone(),
                description: def.description.clone(),
                values: def
                    .values
                    .iter()
                    .map(|entry| EnumValue {
                        value: entry.value.clone(),
                        description: entry.description.clone(),
                    })
                    .collect(),
            },
        );
    }

    Ok(Schema {
        name: definition.name.clone(),
        description: definition.description.clone(),
        entity_types,
        enums,
    })
}

/// A field inherited from a parent, tagged with the parent it came from so
/// ambiguous sibling contributions can be reported precisely.
#[derive(Clone)]
struct InheritedField {
    def: FieldDef,
    origin: String,
    /// Set when two parents contributed differing definitions; resolving the
    /// class must redefine the field or the schema is rejected.
    conflict_with: Option<String>,
}

struct Resolver<'a> {
    definition: &'a SchemaDefinition,
    resolved: BTreeMap<String, Vec<FieldDef>>,
    in_progress: Vec<String>,
}

impl Resolver<'_> {
    /// Effective raw field list for a class, memoized. Detects inheritance
    /// cycles and unresolvable parents.
    fn effective_fields(&mut self, class_name: &str) -> Result<&Vec<FieldDef>> {
        if self.resolved.contains_key(class_name) {
            return Ok(&self.resolved[class_name]);
        }
        if self.in_progress.iter().any(|name| name == class_name) {
            return Err(SchemaError::CyclicInheritance(class_name.to_string()));
        }
        self.in_progress.push(class_name.to_string());

        let class = self.definition.classes.get(class_name).ok_or_else(|| {
            let child = self
                .in_progress
                .iter()
                .rev()
                .nth(1)
                .cloned()
                .unwrap_or_else(|| class_name.to_string());
            SchemaError::UnknownParent {
                class: child,
                parent: class_name.to_string(),
            }
        })?;

        let fields = self.flatten_class(class_name, &class.clone())?;
        self.in_progress.pop();
        self.resolved.insert(class_name.to_string(), fields);
        Ok(&self.resolved[class_name])
    }

    fn flatten_class(&mut self, class_name: &str, class: &ClassDef) -> Result<Vec<FieldDef>> {
        let mut inherited: Vec<InheritedField> = Vec::new();

        // Base chain first, then mixins at equal precedence.
        if let Some(base) = &class.is_a {
            for def in self.effective_fields(base)?.clone() {
                inherited.push(InheritedField {
                    def,
                    origin: base.clone(),
                    conflict_with: None,
                });
            }
        }
        for mixin in &class.mixins {
            for def in self.effective_fields(mixin)?.clone() {
                match inherited.iter_mut().find(|f| f.def.name == def.name) {
                    Some(existing) => {
                        if existing.def != def {
                            existing.conflict_with = Some(mixin.clone());
                        }
                    }
                    None => inherited.push(InheritedField {
                        def,
                        origin: mixin.clone(),
                        conflict_with: None,
                    }),
                }
            }
        }

        // The class's own fields wholly redefine inherited ones by name and
        // clear any parent conflict on them.
        let mut fields: Vec<InheritedField> = inherited;
        for def in &class.fields {
            match fields.iter_mut().find(|f| f.def.name == def.name) {
                Some(existing) => {
                    existing.def = def.clone();
                    existing.origin = class_name.to_string();
                    existing.conflict_with = None;
                }
                None => fields.push(InheritedField {
                    def: def.clone(),
                    origin: class_name.to_string(),
                    conflict_with: None,
                }),
            }
        }

        // Partial overrides change only the attributes they name.
        for over in &class.overrides {
            let target = fields
                .iter_mut()
                .find(|f| f.def.name == over.name)
                .ok_or_else(|| SchemaError::UnknownOverrideTarget {
                    class: class_name.to_string(),
                    field: over.name.clone(),
                })?;
            over.apply(&mut target.def);
            target.conflict_with = None;
        }

        // Any surviving parent conflict is an error, never silently resolved.
        if let Some(conflicted) = fields.iter().find(|f| f.conflict_with.is_some()) {
            return Err(SchemaError::AmbiguousFieldOverride {
                class: class_name.to_string(),
                field: conflicted.def.name.clone(),
                left: conflicted.origin.clone(),
                right: conflicted
                    .conflict_with
                    .clone()
                    .unwrap_or_default(),
            });
        }

        Ok(fields.into_iter().map(|f| f.def).collect())
    }
}

fn compile_entity_type(
    definition: &SchemaDefinition,
    class_name: &str,
    class: &ClassDef,
    effective: Vec<FieldDef>,
) -> Result<EntityType> {
    let mut identifier: Option<String> = None;
    for def in &effective {
        if def.identifier {
            match &identifier {
                None => identifier = Some(def.name.clone()),
                Some(first) => {
                    return Err(SchemaError::MultipleIdentifiers {
                        class: class_name.to_string(),
                        first: first.clone(),
                        second: def.name.clone(),
                    });
                }
            }
        }
    }
    let identifier = identifier.ok_or_else(|| SchemaError::MissingIdentifier {
        class: class_name.to_string(),
    })?;

    let mut fields = Vec::with_capacity(effective.len());
    for def in &effective {
        let range = parse_range(definition, class_name, def)?;
        if def.identifier && range != Range::String {
            return Err(SchemaError::InvalidIdentifier {
                class: class_name.to_string(),
                field: def.name.clone(),
            });
        }
        let pattern = match &def.pattern {
            Some(p) => Some(FieldPattern::compile(&p.regex, &p.hint).map_err(|source| {
                SchemaError::InvalidPattern {
                    class: class_name.to_string(),
                    field: def.name.clone(),
                    source,
                }
            })?),
            None => None,
        };
        fields.push(FieldDefinition {
            name: def.name.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            range,
            // Identifier fields are implicitly required.
            required: def.required || def.identifier,
            multivalued: def.multivalued,
            identifier: def.identifier,
            deprecated: def.deprecated,
            pattern,
            example: def.example.clone(),
        });
    }

    Ok(EntityType {
        name: class_name.to_string(),
        description: class.description.clone(),
        base: class.is_a.clone(),
        fields,
        identifier,
    })
}

fn parse_range(definition: &SchemaDefinition, class_name: &str, def: &FieldDef) -> Result<Range> {
    match def.range.as_str() {
        "string" => Ok(Range::String),
        "integer" => Ok(Range::Integer),
        "decimal" => Ok(Range::Decimal),
        "column_key" => Ok(Range::ColumnKey),
        name if definition.enums.contains_key(name) => Ok(Range::Enum(name.to_string())),
        name if definition.classes.contains_key(name) => Ok(Range::Entity(name.to_string())),
        other => Err(SchemaError::UnknownRange {
            class: class_name.to_string(),
            field: def.name.clone(),
            range: other.to_string(),
        }),
    }
}
