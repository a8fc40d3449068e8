//! Per-field constraint evaluation.
//!
//! Each field of a record is judged independently against its resolved
//! definition. Checks run in a fixed order: presence, then value type, then
//! the range-specific rule. Absence short-circuits (an absent optional value
//! is simply unchecked) and so does a type mismatch, so a single cell never
//! produces a cascade of findings.

use std::collections::BTreeSet;

use hca_schema::{EntityType, FieldDefinition, Range, Schema, Value};

use crate::cross_entity::ReferenceIndex;
use crate::report::ConstraintKind;

/// Shared inputs for evaluating the fields of one entity-type group.
pub struct CheckContext<'a> {
    pub schema: &'a Schema,
    pub entity_type: &'a EntityType,
    pub references: &'a ReferenceIndex,
    /// Field names a `column_key` value may refer to: every schema-defined
    /// field of the entity type plus every column observed on its records.
    pub known_columns: &'a BTreeSet<String>,
}

/// One constraint failure, not yet located at a row.
#[derive(Debug)]
pub struct Finding {
    pub kind: ConstraintKind,
    pub message: String,
    pub value: Option<Value>,
}

/// Evaluate one field of one record.
pub fn evaluate_field(
    ctx: &CheckContext<'_>,
    field: &FieldDefinition,
    value: &Value,
) -> Vec<Finding> {
    if value.is_absent() {
        if field.required {
            return vec![Finding {
                kind: ConstraintKind::MissingRequired,
                message: format!("required field '{}' is missing", field.name),
                value: None,
            }];
        }
        return Vec::new();
    }

    // Deprecated fields are carried for compatibility but their values are
    // not judged.
    if field.deprecated {
        return Vec::new();
    }

    if field.multivalued {
        let Some(items) = value.as_list() else {
            return vec![Finding {
                kind: ConstraintKind::TypeMismatch,
                message: format!("field '{}' expects a list of values", field.name),
                value: Some(value.clone()),
            }];
        };
        return items
            .iter()
            .flat_map(|item| check_list_element(ctx, field, item))
            .collect();
    }

    if matches!(value, Value::List(_)) {
        return vec![Finding {
            kind: ConstraintKind::TypeMismatch,
            message: format!("field '{}' expects a single value, got a list", field.name),
            value: Some(value.clone()),
        }];
    }

    if let Some(finding) = check_scalar_type(field, value) {
        return vec![finding];
    }
    check_scalar_range(ctx, field, value).into_iter().collect()
}

/// Primitive type check for a scalar value. String-like ranges accept any
/// scalar via its string rendering.
fn check_scalar_type(field: &FieldDefinition, value: &Value) -> Option<Finding> {
    let ok = match field.range {
        Range::Integer => match value {
            Value::Integer(_) => true,
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        Range::Decimal => match value {
            Value::Integer(_) | Value::Decimal(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        },
        Range::String | Range::ColumnKey | Range::Enum(_) | Range::Entity(_) => true,
    };
    if ok {
        None
    } else {
        Some(Finding {
            kind: ConstraintKind::TypeMismatch,
            message: format!(
                "field '{}' expects {} value",
                field.name,
                match field.range {
                    Range::Integer => "an integer",
                    _ => "a decimal",
                }
            ),
            value: Some(value.clone()),
        })
    }
}

/// Range-specific rule for a type-correct scalar.
fn check_scalar_range(
    ctx: &CheckContext<'_>,
    field: &FieldDefinition,
    value: &Value,
) -> Option<Finding> {
    let Some(text) = value.to_scalar_string() else {
        return None;
    };
    match &field.range {
        Range::Enum(name) => {
            let def = ctx.schema.enum_def(name)?;
            if def.contains(&text) {
                None
            } else {
                Some(Finding {
                    kind: ConstraintKind::InvalidEnumValue,
                    message: format!(
                        "'{text}' is not a permissible value for '{}'; expected one of: {}",
                        field.name,
                        def.value_names().collect::<Vec<_>>().join(", ")
                    ),
                    value: Some(value.clone()),
                })
            }
        }
        Range::Entity(target) => {
            if ctx.references.resolves(target, &text) {
                None
            } else {
                Some(Finding {
                    kind: ConstraintKind::UnresolvedReference,
                    message: format!(
                        "'{text}' does not match any {target} record in this submission"
                    ),
                    value: Some(value.clone()),
                })
            }
        }
        Range::ColumnKey => {
            if ctx.known_columns.contains(&text) {
                None
            } else {
                Some(Finding {
                    kind: ConstraintKind::ListElementReferencesUnknownColumn,
                    message: format!(
                        "'{text}' does not name a column of {}",
                        ctx.entity_type.name
                    ),
                    value: Some(value.clone()),
                })
            }
        }
        Range::String | Range::Integer | Range::Decimal => {
            let pattern = field.pattern.as_ref()?;
            if pattern.is_full_match(&text) {
                None
            } else {
                Some(Finding {
                    kind: ConstraintKind::PatternMismatch,
                    message: format!(
                        "'{text}' is not valid for '{}'; expected {}",
                        field.name, pattern.hint
                    ),
                    value: Some(value.clone()),
                })
            }
        }
    }
}

/// One element of a multivalued field. Elements must be non-absent scalars;
/// each is then judged by the field's range rule.
fn check_list_element(
    ctx: &CheckContext<'_>,
    field: &FieldDefinition,
    item: &Value,
) -> Option<Finding> {
    if item.is_absent() || matches!(item, Value::List(_)) {
        return Some(Finding {
            kind: ConstraintKind::InvalidListElement,
            message: format!("field '{}' contains an empty or nested entry", field.name),
            value: Some(item.clone()),
        });
    }
    let text_range = matches!(
        field.range,
        Range::String | Range::ColumnKey | Range::Enum(_) | Range::Entity(_)
    );
    if text_range && !matches!(item, Value::String(_)) {
        return Some(Finding {
            kind: ConstraintKind::InvalidListElement,
            message: format!("field '{}' expects text entries", field.name),
            value: Some(item.clone()),
        });
    }
    if let Some(finding) = check_scalar_type(field, item) {
        return Some(Finding {
            kind: ConstraintKind::InvalidListElement,
            message: finding.message,
            value: finding.value,
        });
    }
    check_scalar_range(ctx, field, item)
}
