//! Data dictionary projection.
//!
//! A flat, serializable view of a resolved schema intended for documentation
//! generation and for submitters who want a human-readable listing of every
//! field, its permissible values, and its constraints.

use serde::Serialize;

use crate::schema::{Range, Schema};

#[derive(Debug, Clone, Serialize)]
pub struct DataDictionary {
    pub schema_name: Option<String>,
    pub entity_types: Vec<EntityEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub range: String,
    pub required: bool,
    pub multivalued: bool,
    pub deprecated: bool,
    /// Permissible values joined with "; " for enum-ranged fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissible_values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl DataDictionary {
    pub fn from_schema(schema: &Schema) -> Self {
        let entity_types = schema
            .entity_types()
            .map(|entity| EntityEntry {
                name: entity.name.clone(),
                description: entity.description.clone(),
                fields: entity
                    .fields
                    .iter()
                    .map(|field| {
                        let permissible_values = match &field.range {
                            Range::Enum(name) => schema.enum_values_for(name).map(|values| {
                                values.collect::<Vec<_>>().join("; ")
                            }),
                            _ => None,
                        };
                        FieldEntry {
                            name: field.name.clone(),
                            title: field.title.clone(),
                            description: field.description.clone(),
                            range: field.range.as_str().to_string(),
                            required: field.required,
                            multivalued: field.multivalued,
                            deprecated: field.deprecated,
                            permissible_values,
                            pattern_hint: field.pattern.as_ref().map(|p| p.hint.clone()),
                            example: field.example.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();
        DataDictionary {
            schema_name: schema.name.clone(),
            entity_types,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier1::tier1;

    #[test]
    fn dictionary_lists_enum_values_and_hints() {
        let dictionary = DataDictionary::from_schema(tier1());
        let donor = dictionary
            .entity_types
            .iter()
            .find(|entry| entry.name == "Donor")
            .unwrap();
        let manner = donor
            .fields
            .iter()
            .find(|field| field.name == "manner_of_death")
            .unwrap();
        assert_eq!(
            manner.permissible_values.as_deref(),
            Some("1; 2; 3; 4; 0; unknown; not applicable")
        );

        let sample = dictionary
            .entity_types
            .iter()
            .find(|entry| entry.name == "Sample")
            .unwrap();
        let enrichment = sample
            .fields
            .iter()
            .find(|field| field.name == "cell_enrichment")
            .unwrap();
        assert!(enrichment.pattern_hint.as_deref().unwrap().contains("Cell Ontology"));
        assert!(enrichment.required);
    }
}
