use hca_schema::{Range, SchemaDefinition, SchemaError};

fn resolve(json: &str) -> Result<hca_schema::Schema, SchemaError> {
    SchemaDefinition::from_json(json)?.resolve()
}

#[test]
fn minimal_schema_resolves() {
    let schema = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [
                        { "name": "thing_id", "identifier": true },
                        { "name": "label" }
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let thing = schema.entity_type("Thing").unwrap();
    assert_eq!(thing.identifier, "thing_id");
    assert!(thing.identifier_field().required, "identifier implies required");
    assert_eq!(thing.field("label").unwrap().range, Range::String);
}

#[test]
fn child_fields_replace_inherited_ones() {
    let schema = resolve(
        r#"{
            "classes": {
                "Base": {
                    "fields": [
                        { "name": "base_id", "identifier": true },
                        { "name": "note", "required": false }
                    ]
                },
                "Child": {
                    "is_a": "Base",
                    "fields": [
                        { "name": "note", "required": true },
                        { "name": "extra" }
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let child = schema.entity_type("Child").unwrap();
    let names: Vec<&str> = child.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["base_id", "note", "extra"]);
    assert!(child.field("note").unwrap().required);
}

#[test]
fn overrides_change_only_named_attributes() {
    let schema = resolve(
        r#"{
            "classes": {
                "Base": {
                    "fields": [
                        { "name": "base_id", "identifier": true },
                        { "name": "code", "description": "a code", "required": false }
                    ]
                },
                "Child": {
                    "is_a": "Base",
                    "overrides": [
                        { "name": "code", "required": true }
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let code = schema.entity_type("Child").unwrap().field("code").unwrap();
    assert!(code.required);
    assert_eq!(code.description.as_deref(), Some("a code"));
}

#[test]
fn override_of_unknown_field_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [{ "name": "thing_id", "identifier": true }],
                    "overrides": [{ "name": "missing", "required": true }]
                }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownOverrideTarget { class, field }
            if class == "Thing" && field == "missing"
    ));
}

#[test]
fn cyclic_inheritance_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "A": { "is_a": "B", "fields": [{ "name": "a_id", "identifier": true }] },
                "B": { "is_a": "A" }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::CyclicInheritance(_)));
}

#[test]
fn unknown_parent_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "A": { "is_a": "Ghost", "fields": [{ "name": "a_id", "identifier": true }] }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownParent { class, parent } if class == "A" && parent == "Ghost"
    ));
}

#[test]
fn unknown_range_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [
                        { "name": "thing_id", "identifier": true },
                        { "name": "status", "range": "StatusEnum" }
                    ]
                }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownRange { field, range, .. }
            if field == "status" && range == "StatusEnum"
    ));
}

#[test]
fn missing_and_duplicate_identifiers_are_rejected() {
    let err = resolve(r#"{ "classes": { "Thing": { "fields": [{ "name": "label" }] } } }"#)
        .unwrap_err();
    assert!(matches!(err, SchemaError::MissingIdentifier { class } if class == "Thing"));

    let err = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [
                        { "name": "a", "identifier": true },
                        { "name": "b", "identifier": true }
                    ]
                }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::MultipleIdentifiers { .. }));
}

#[test]
fn non_string_identifier_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [{ "name": "thing_id", "identifier": true, "range": "integer" }]
                }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));
}

#[test]
fn conflicting_mixin_fields_require_redefinition() {
    let conflicted = r#"{
        "classes": {
            "Left": { "fields": [
                { "name": "left_id", "identifier": true },
                { "name": "shared", "required": true }
            ] },
            "Right": { "fields": [
                { "name": "right_id", "identifier": true },
                { "name": "shared", "required": false }
            ] },
            "Both": {
                "is_a": "Left",
                "mixins": ["Right"],
                "fields": [{ "name": "right_id", "identifier": false }]
            }
        }
    }"#;
    let err = resolve(conflicted).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::AmbiguousFieldOverride { class, field, .. }
            if class == "Both" && field == "shared"
    ));

    // Redefining the conflicted field locally resolves the ambiguity.
    let redefined = conflicted.replace(
        r#""fields": [{ "name": "right_id", "identifier": false }]"#,
        r#""fields": [
            { "name": "right_id", "identifier": false },
            { "name": "shared", "required": true }
        ]"#,
    );
    let schema = resolve(&redefined).unwrap();
    assert!(schema.entity_type("Both").unwrap().field("shared").unwrap().required);
}

#[test]
fn invalid_pattern_is_rejected() {
    let err = resolve(
        r#"{
            "classes": {
                "Thing": {
                    "fields": [
                        { "name": "thing_id", "identifier": true },
                        {
                            "name": "code",
                            "pattern": { "regex": "([", "hint": "unclosed" }
                        }
                    ]
                }
            }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidPattern { .. }));
}
