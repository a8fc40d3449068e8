//! Validation outcome types.
//!
//! A run always produces a [`ValidationReport`]; individual rule failures are
//! data ([`ValidationError`] records), never control flow. Only schema-level
//! problems abort a run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use hca_schema::Value;

/// JSON report envelope identity.
pub const REPORT_SCHEMA: &str = "hca-validation-report";
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// The constraint a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    MissingRequired,
    TypeMismatch,
    InvalidEnumValue,
    PatternMismatch,
    InvalidListElement,
    ListElementReferencesUnknownColumn,
    UnresolvedReference,
    DuplicateIdentifier,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::MissingRequired => "missing_required",
            ConstraintKind::TypeMismatch => "type_mismatch",
            ConstraintKind::InvalidEnumValue => "invalid_enum_value",
            ConstraintKind::PatternMismatch => "pattern_mismatch",
            ConstraintKind::InvalidListElement => "invalid_list_element",
            ConstraintKind::ListElementReferencesUnknownColumn => {
                "list_element_references_unknown_column"
            }
            ConstraintKind::UnresolvedReference => "unresolved_reference",
            ConstraintKind::DuplicateIdentifier => "duplicate_identifier",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule failure, located by entity type, row and field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub entity_type: String,
    /// 1-based position of the record within its entity-type group.
    pub row: usize,
    /// Identifier of the record as `field:value`, when the identifier field
    /// held a usable scalar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    pub field: String,
    pub kind: ConstraintKind,
    pub message: String,
    /// The offending value, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row {} field '{}': {}",
            self.entity_type, self.row, self.field, self.message
        )?;
        if let Some(key) = &self.primary_key {
            write!(f, " ({key})")?;
        }
        Ok(())
    }
}

/// Per-run tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Records validated per entity type.
    pub record_counts: BTreeMap<String, usize>,
    pub error_count: usize,
}

/// The complete outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<ValidationError>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub(crate) fn new(errors: Vec<ValidationError>, record_counts: BTreeMap<String, usize>) -> Self {
        let summary = ValidationSummary {
            record_counts,
            error_count: errors.len(),
        };
        ValidationReport {
            passed: errors.is_empty(),
            errors,
            summary,
        }
    }

    /// Convert to a `Result` for callers that treat any failure as an error.
    pub fn into_result(self) -> Result<ValidationSummary, ValidationFailed> {
        if self.passed {
            Ok(self.summary)
        } else {
            Err(ValidationFailed { report: self })
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Payload<'a> {
            schema: &'static str,
            schema_version: &'static str,
            #[serde(flatten)]
            report: &'a ValidationReport,
        }
        serde_json::to_string_pretty(&Payload {
            schema: REPORT_SCHEMA,
            schema_version: REPORT_SCHEMA_VERSION,
            report: self,
        })
    }
}

/// A completed run with at least one error, for use at `?` boundaries.
#[derive(Debug, Error)]
#[error("validation failed with {} error(s)", report.summary.error_count)]
pub struct ValidationFailed {
    pub report: ValidationReport,
}
