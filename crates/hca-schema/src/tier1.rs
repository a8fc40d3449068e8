//! Built-in Tier 1 schema.
//!
//! The schema definition ships embedded in the binary and is resolved once on
//! first access. Callers normally go through [`tier1`] and
//! [`entity_class_name`] rather than loading a definition themselves.

use std::fmt;
use std::sync::OnceLock;

use crate::definition::SchemaDefinition;
use crate::schema::Schema;

const TIER1_JSON: &str = include_str!("../schema/tier1.json");

/// Bionetworks recognized for entity-type selection. Only `adipose` and
/// `gut` currently carry refined types; the rest validate against the
/// default types.
pub const BIONETWORKS: [&str; 18] = [
    "adipose",
    "breast",
    "development",
    "eye",
    "genetic-diversity",
    "gut",
    "heart",
    "immune",
    "kidney",
    "liver",
    "lung",
    "musculoskeletal",
    "nervous-system",
    "oral",
    "organoid",
    "pancreas",
    "reproduction",
    "skin",
];

pub fn is_known_bionetwork(name: &str) -> bool {
    BIONETWORKS.contains(&name)
}

/// The resolved built-in Tier 1 schema.
pub fn tier1() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let definition =
            SchemaDefinition::from_json(TIER1_JSON).expect("embedded Tier 1 schema parses");
        definition.resolve().expect("embedded Tier 1 schema resolves")
    })
}

/// The kinds of entity the Tier 1 schema describes. Each kind maps to one
/// entity type, possibly refined per bionetwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityKind {
    Dataset,
    Donor,
    Sample,
    Cell,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Dataset,
        EntityKind::Donor,
        EntityKind::Sample,
        EntityKind::Cell,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Dataset => "dataset",
            EntityKind::Donor => "donor",
            EntityKind::Sample => "sample",
            EntityKind::Cell => "cell",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dataset" => Some(EntityKind::Dataset),
            "donor" => Some(EntityKind::Donor),
            "sample" => Some(EntityKind::Sample),
            "cell" => Some(EntityKind::Cell),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity-type name to validate against for a kind in a given bionetwork
/// context. Unrecognized or absent bionetworks fall back to the default
/// types rather than failing.
pub fn entity_class_name(kind: EntityKind, bionetwork: Option<&str>) -> &'static str {
    match (kind, bionetwork) {
        (EntityKind::Dataset, Some("adipose")) => "AdiposeDataset",
        (EntityKind::Dataset, Some("gut")) => "GutDataset",
        (EntityKind::Dataset, _) => "Dataset",
        (EntityKind::Sample, Some("adipose")) => "AdiposeSample",
        (EntityKind::Sample, Some("gut")) => "GutSample",
        (EntityKind::Sample, _) => "Sample",
        (EntityKind::Donor, _) => "Donor",
        (EntityKind::Cell, _) => "Cell",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Range;

    #[test]
    fn embedded_schema_resolves() {
        let schema = tier1();
        for kind in EntityKind::ALL {
            let name = entity_class_name(kind, None);
            assert!(schema.entity_type(name).is_some(), "missing {name}");
        }
        for name in ["AdiposeDataset", "GutDataset", "AdiposeSample", "GutSample"] {
            assert!(schema.entity_type(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn bionetwork_selection() {
        assert_eq!(entity_class_name(EntityKind::Dataset, Some("gut")), "GutDataset");
        assert_eq!(entity_class_name(EntityKind::Sample, Some("adipose")), "AdiposeSample");
        assert_eq!(entity_class_name(EntityKind::Donor, Some("gut")), "Donor");
        assert_eq!(entity_class_name(EntityKind::Dataset, Some("lung")), "Dataset");
        assert_eq!(entity_class_name(EntityKind::Sample, None), "Sample");
        assert!(is_known_bionetwork("lung"));
        assert!(!is_known_bionetwork("cardiac"));
    }

    #[test]
    fn refined_sample_extends_base_fields() {
        let schema = tier1();
        let base = schema.entity_type("Sample").unwrap();
        let gut = schema.entity_type("GutSample").unwrap();
        assert_eq!(gut.base.as_deref(), Some("Sample"));
        assert_eq!(gut.identifier, "sample_id");
        assert!(gut.fields.len() == base.fields.len() + 2);
        // Inherited fields come first, in base declaration order.
        assert_eq!(gut.fields[0].name, base.fields[0].name);
        assert!(gut.field("radial_tissue_term").is_some());
        assert!(gut.field("dissociation_protocol").is_some());
        assert!(base.field("radial_tissue_term").is_none());
    }

    #[test]
    fn identifier_and_reference_ranges() {
        let schema = tier1();
        let donor = schema.entity_type("Donor").unwrap();
        assert_eq!(donor.identifier, "donor_id");
        assert!(donor.identifier_field().required);
        assert_eq!(
            donor.field("dataset_id").unwrap().range,
            Range::Entity("Dataset".to_string())
        );
        let sample = schema.entity_type("Sample").unwrap();
        assert_eq!(
            sample.field("donor_id").unwrap().range,
            Range::Entity("Donor".to_string())
        );
    }

    #[test]
    fn patterns_are_full_match() {
        let schema = tier1();
        let sample = schema.entity_type("Sample").unwrap();
        let pattern = sample.field("cell_enrichment").unwrap().pattern.as_ref().unwrap();
        assert!(pattern.is_full_match("CL:0000057+"));
        assert!(pattern.is_full_match("na"));
        assert!(!pattern.is_full_match("CL:0000057"));
        assert!(!pattern.is_full_match("xCL:0000057+"));
        assert!(!pattern.is_full_match("CL:0000057+x"));

        let year = sample.field("sample_collection_year").unwrap().pattern.as_ref().unwrap();
        assert!(year.is_full_match("2018"));
        assert!(!year.is_full_match("20181"));
    }

    #[test]
    fn manner_of_death_values() {
        let schema = tier1();
        let values: Vec<&str> = schema.enum_values_for("MannerOfDeathEnum").unwrap().collect();
        assert_eq!(values, ["1", "2", "3", "4", "0", "unknown", "not applicable"]);
    }
}
