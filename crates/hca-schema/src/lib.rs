//! Schema model for HCA Tier 1 metadata validation.
//!
//! This crate owns the declarative side of validation: raw schema definitions
//! ([`definition`]), the resolver that flattens inheritance into queryable
//! entity types ([`schema`]), the embedded Tier 1 schema ([`tier1`]), the
//! value model records are expressed in ([`value`]), and a documentation
//! projection ([`dictionary`]). Rule evaluation against records lives in the
//! companion `hca-validate` crate.

pub mod definition;
pub mod dictionary;
pub mod error;
pub mod schema;
pub mod tier1;
pub mod value;

pub use definition::SchemaDefinition;
pub use dictionary::DataDictionary;
pub use error::{Result, SchemaError};
pub use schema::{EntityType, EnumDefinition, FieldDefinition, FieldPattern, Range, Schema};
pub use tier1::{EntityKind, entity_class_name, tier1};
pub use value::{Record, RecordBatch, Value};
