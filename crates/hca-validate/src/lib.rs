//! Rule evaluation for HCA Tier 1 metadata.
//!
//! Records grouped by entity type go in, a structured [`ValidationReport`]
//! comes out. The schema model (entity types, enums, patterns, the embedded
//! Tier 1 definition) lives in the `hca-schema` crate; this crate applies it:
//!
//! ```
//! use hca_schema::{Record, RecordBatch};
//! use hca_validate::validate_tier1;
//!
//! let mut batch = RecordBatch::new();
//! batch.push(
//!     "Donor",
//!     vec![[("donor_id", "D1"), ("manner_of_death", "5")]
//!         .into_iter()
//!         .collect::<Record>()],
//! );
//! let report = validate_tier1(&batch)?;
//! assert!(!report.passed);
//! # Ok::<(), hca_schema::SchemaError>(())
//! ```

pub mod checks;
pub mod cross_entity;
pub mod engine;
pub mod report;

pub use cross_entity::ReferenceIndex;
pub use engine::{Validator, validate_tier1};
pub use report::{
    ConstraintKind, ValidationError, ValidationFailed, ValidationReport, ValidationSummary,
};
