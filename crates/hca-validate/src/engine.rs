//! The validation engine.
//!
//! A [`Validator`] borrows a resolved schema and judges record batches
//! against it. Runs are deterministic: the same schema and batch always
//! produce the same report, with errors ordered by the batch's entity-type
//! order, then row, then the entity type's field order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use hca_schema::{EntityType, Record, RecordBatch, Schema, SchemaError, tier1};

use crate::checks::{CheckContext, evaluate_field};
use crate::cross_entity::{ReferenceIndex, duplicate_identifier_errors};
use crate::report::{ValidationError, ValidationReport};

pub struct Validator<'a> {
    schema: &'a Schema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Validator { schema }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Validate a batch of records.
    ///
    /// An entity type the schema does not define is a caller error and aborts
    /// the run; rule failures never do.
    pub fn validate(&self, batch: &RecordBatch) -> Result<ValidationReport, SchemaError> {
        for (entity_type, _) in batch.iter() {
            if self.schema.entity_type(entity_type).is_none() {
                return Err(SchemaError::UnknownEntityType(entity_type.to_string()));
            }
        }

        let references = ReferenceIndex::build(self.schema, batch);

        let mut errors = Vec::new();
        let mut record_counts = BTreeMap::new();
        for (entity_type_name, records) in batch.iter() {
            record_counts.insert(entity_type_name.to_string(), records.len());
            // Existence checked above.
            let Some(entity_type) = self.schema.entity_type(entity_type_name) else {
                continue;
            };
            errors.extend(duplicate_identifier_errors(
                self.schema,
                entity_type_name,
                records,
            ));
            self.validate_group(entity_type, records, &references, &mut errors);
            debug!(
                entity_type = entity_type_name,
                records = records.len(),
                "validated entity group"
            );
        }

        let report = ValidationReport::new(errors, record_counts);
        info!(
            passed = report.passed,
            errors = report.summary.error_count,
            "validation run complete"
        );
        Ok(report)
    }

    fn validate_group(
        &self,
        entity_type: &EntityType,
        records: &[Record],
        references: &ReferenceIndex,
        errors: &mut Vec<ValidationError>,
    ) {
        let known_columns = known_columns(entity_type, records);
        let ctx = CheckContext {
            schema: self.schema,
            entity_type,
            references,
            known_columns: &known_columns,
        };
        let id_field = entity_type.identifier_field();

        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            let primary_key = record
                .get(&id_field.name)
                .to_scalar_string()
                .filter(|id| !id.is_empty())
                .map(|id| format!("{}:{id}", id_field.name));

            for field in &entity_type.fields {
                for finding in evaluate_field(&ctx, field, record.get(&field.name)) {
                    errors.push(ValidationError {
                        entity_type: entity_type.name.clone(),
                        row,
                        primary_key: primary_key.clone(),
                        field: field.name.clone(),
                        kind: finding.kind,
                        message: finding.message,
                        value: finding.value,
                    });
                }
            }
        }
    }
}

/// Validate a batch against the built-in Tier 1 schema.
pub fn validate_tier1(batch: &RecordBatch) -> Result<ValidationReport, SchemaError> {
    Validator::new(tier1()).validate(batch)
}

/// Columns a `column_key` value may name: the entity type's schema-defined
/// fields plus every column actually present on the supplied records.
fn known_columns(entity_type: &EntityType, records: &[Record]) -> BTreeSet<String> {
    let mut columns: BTreeSet<String> = entity_type
        .fields
        .iter()
        .map(|field| field.name.clone())
        .collect();
    for record in records {
        columns.extend(record.field_names().map(str::to_string));
    }
    columns
}
