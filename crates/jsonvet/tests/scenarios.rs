//! End-to-end checks against small, realistic schemas.
use jsonvet::ValidationErrorKind;
use serde_json::json;

#[test]
fn integer_minimum() {
    let schema = json!({"type": "integer", "minimum": 0});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!(7)));
    let instance = json!(-1);
    let error = validator.validate(&instance).expect_err("Should fail");
    assert_eq!(error.keyword(), "minimum");
    match &error.kind {
        ValidationErrorKind::Minimum { limit } => assert_eq!(limit, &json!(0)),
        kind => panic!("Unexpected kind: {kind:?}"),
    }
}

#[test]
fn missing_required_property() {
    let schema = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"]
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    let instance = json!({});
    let error = validator.validate(&instance).expect_err("Should fail");
    assert_eq!(error.keyword(), "required");
    assert_eq!(error.instance_path.as_str(), "/name");
    match &error.kind {
        ValidationErrorKind::Required { property } => assert_eq!(property, "name"),
        kind => panic!("Unexpected kind: {kind:?}"),
    }
}

#[test]
fn duplicate_items() {
    let schema = json!({"type": "array", "items": {"type": "string"}, "uniqueItems": true});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!(["a", "b"])));
    let instance = json!(["a", "b", "a"]);
    let error = validator.validate(&instance).expect_err("Should fail");
    assert_eq!(error.keyword(), "uniqueItems");
}

#[test]
fn recursive_linked_list() {
    let schema = json!({
        "$defs": {
            "Node": {
                "type": "object",
                "properties": {"next": {"$ref": "#/$defs/Node"}}
            }
        },
        "$ref": "#/$defs/Node"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!({"next": {"next": {}}})));
    assert!(!validator.is_valid(&json!({"next": {"next": 1}})));
}

#[test]
fn any_of_alternatives() {
    let schema = json!({
        "anyOf": [
            {"type": "string", "minLength": 3},
            {"type": "integer", "minimum": 100}
        ]
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!("abcd")));
    assert!(!validator.is_valid(&json!(42)));
}

#[test]
fn unevaluated_property_is_rejected() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}},
        "unevaluatedProperties": false
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    let instance = json!({"a": 1, "b": 2});
    let error = validator.validate(&instance).expect_err("Should fail");
    assert_eq!(error.keyword(), "unevaluatedProperties");
    match &error.kind {
        ValidationErrorKind::UnevaluatedProperties { unexpected } => {
            assert_eq!(unexpected, &["b"]);
        }
        kind => panic!("Unexpected kind: {kind:?}"),
    }
}

#[test]
fn surrogate_pairs_count_as_single_code_points() {
    let schema = json!({"minLength": 2, "maxLength": 3});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    // Two astral-plane characters: four UTF-16 units, two code points
    assert!(validator.is_valid(&json!("\u{1D11E}\u{1D11E}")));
    assert!(!validator.is_valid(&json!("\u{1D11E}")));
}

#[test]
fn float_noise_in_multiple_of() {
    let schema = json!({"multipleOf": 0.1});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!(0.3)));
    assert!(validator.is_valid(&json!(19.8)));
    assert!(!validator.is_valid(&json!(0.35)));
}

#[test]
fn min_contains_zero_disables_contains() {
    let schema = json!({"contains": {"type": "string"}, "minContains": 0});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!([])));
    assert!(validator.is_valid(&json!([1, 2])));
}

#[test]
fn object_duplicates_differ_only_by_key_order() {
    let schema = json!({"uniqueItems": true});
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(!validator.is_valid(&json!([
        {"a": 1, "b": 2},
        {"b": 2, "a": 1}
    ])));
}

#[test]
fn prototype_names_are_ordinary_properties() {
    let schema = json!({
        "properties": {
            "toString": {"type": "integer"},
            "constructor": {"type": "integer"},
            "__proto__": {"type": "integer"}
        },
        "required": ["toString", "constructor", "__proto__"]
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!({
        "toString": 1, "constructor": 2, "__proto__": 3
    })));
    assert!(!validator.is_valid(&json!({"toString": 1, "constructor": 2})));
}

#[test]
fn validation_is_reentrant_across_threads() {
    let schema = json!({"items": {"type": "integer", "minimum": 0}});
    let validator = std::sync::Arc::new(jsonvet::validator_for(&schema).expect("Invalid schema"));
    let handles: Vec<_> = (0..4)
        .map(|shard| {
            let validator = std::sync::Arc::clone(&validator);
            std::thread::spawn(move || {
                let instance = json!([shard, shard + 1]);
                assert!(validator.is_valid(&instance));
                assert!(validator.validate(&instance).is_ok());
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}
