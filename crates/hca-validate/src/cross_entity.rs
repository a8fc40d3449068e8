//! Cross-entity reference resolution.
//!
//! References are checked against the records supplied in the same batch:
//! a `donor_id` on a sample must match the identifier of some donor record
//! in the run. The index is built once up front so that reference checks
//! during per-record evaluation are plain set lookups.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use hca_schema::{RecordBatch, Schema};

use crate::report::{ConstraintKind, ValidationError};

/// Identifier values per entity type, collected from a batch.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    identifiers: BTreeMap<String, BTreeSet<String>>,
}

impl ReferenceIndex {
    /// Collect identifier values for every entity type present in the batch.
    /// Records with absent or non-scalar identifiers contribute nothing here;
    /// the presence check reports those separately.
    pub fn build(schema: &Schema, batch: &RecordBatch) -> Self {
        let mut identifiers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (entity_type, records) in batch.iter() {
            let Some(id_field) = schema.identifier_field(entity_type) else {
                continue;
            };
            let ids = identifiers.entry(entity_type.to_string()).or_default();
            for record in records {
                if let Some(id) = record.get(&id_field.name).to_scalar_string()
                    && !id.is_empty()
                {
                    ids.insert(id);
                }
            }
        }
        debug!(entity_types = identifiers.len(), "built reference index");
        ReferenceIndex { identifiers }
    }

    /// Whether `value` is the identifier of some record of `entity_type` in
    /// the indexed batch.
    pub fn resolves(&self, entity_type: &str, value: &str) -> bool {
        self.identifiers
            .get(entity_type)
            .is_some_and(|ids| ids.contains(value))
    }
}

/// Errors for identifier values appearing on more than one record of an
/// entity type. Each duplicated occurrence after the first is reported at
/// the row that repeats the value.
pub fn duplicate_identifier_errors(
    schema: &Schema,
    entity_type: &str,
    records: &[hca_schema::Record],
) -> Vec<ValidationError> {
    let Some(id_field) = schema.identifier_field(entity_type) else {
        return Vec::new();
    };
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut errors = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let Some(id) = record.get(&id_field.name).to_scalar_string() else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        match seen.get(&id) {
            Some(first_row) => errors.push(ValidationError {
                entity_type: entity_type.to_string(),
                row,
                primary_key: Some(format!("{}:{id}", id_field.name)),
                field: id_field.name.clone(),
                kind: ConstraintKind::DuplicateIdentifier,
                message: format!(
                    "identifier '{id}' already used by {entity_type} row {first_row}"
                ),
                value: Some(record.get(&id_field.name).clone()),
            }),
            None => {
                seen.insert(id, row);
            }
        }
    }
    errors
}
