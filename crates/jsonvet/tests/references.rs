//! Reference-graph behavior: remotes, anchors, and dynamic resolution.
use jsonvet::Resource;
use serde_json::json;

#[test]
fn remote_document() {
    let remote = Resource::from_contents(json!({
        "type": "object",
        "properties": {"id": {"type": "integer"}},
        "required": ["id"]
    }))
    .expect("Unknown dialect");
    let schema = json!({"$ref": "http://example.com/entity.json"});
    let validator = jsonvet::options()
        .with_resource("http://example.com/entity.json", remote)
        .build(&schema)
        .expect("Invalid schema");
    assert!(validator.is_valid(&json!({"id": 1})));
    assert!(!validator.is_valid(&json!({})));
}

#[test]
fn transitive_remote_references() {
    let inner = Resource::from_contents(json!({"type": "string"})).expect("Unknown dialect");
    let outer = Resource::from_contents(json!({
        "items": {"$ref": "http://example.com/inner.json"}
    }))
    .expect("Unknown dialect");
    let validator = jsonvet::options()
        .with_resource("http://example.com/inner.json", inner)
        .with_resource("http://example.com/outer.json", outer)
        .build(&json!({"$ref": "http://example.com/outer.json"}))
        .expect("Invalid schema");
    assert!(validator.is_valid(&json!(["a", "b"])));
    assert!(!validator.is_valid(&json!(["a", 1])));
}

#[test]
fn missing_remote_is_a_compile_error() {
    let schema = json!({"$ref": "http://example.com/absent.json"});
    assert!(jsonvet::validator_for(&schema).is_err());
}

#[test]
fn anchors_resolve_within_the_document() {
    let schema = json!({
        "$defs": {
            "positive": {"$anchor": "positive", "type": "integer", "minimum": 1}
        },
        "properties": {"count": {"$ref": "#positive"}}
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!({"count": 2})));
    assert!(!validator.is_valid(&json!({"count": 0})));
}

#[test]
fn id_rebases_nested_references() {
    let schema = json!({
        "$id": "http://example.com/root.json",
        "$defs": {
            "child": {
                "$id": "child.json",
                "$defs": {"leaf": {"type": "boolean"}},
                "properties": {"flag": {"$ref": "#/$defs/leaf"}}
            }
        },
        "$ref": "child.json"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!({"flag": true})));
    assert!(!validator.is_valid(&json!({"flag": 1})));
}

#[test]
fn pointer_escapes_in_references() {
    let schema = json!({
        "$defs": {"a/b": {"type": "integer"}},
        "$ref": "#/$defs/a~1b"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!(1)));
    assert!(!validator.is_valid(&json!("x")));
}

#[test]
fn percent_encoded_pointer_segments() {
    let schema = json!({
        "$defs": {"per cent": {"type": "integer"}},
        "$ref": "#/$defs/per%20cent"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!(1)));
}

#[test]
fn dynamic_ref_falls_back_to_the_static_target() {
    // No other dynamic anchor in scope: behaves like a plain reference
    let schema = json!({
        "$defs": {
            "content": {"$dynamicAnchor": "content", "type": "string"}
        },
        "$dynamicRef": "#content"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!("text")));
    assert!(!validator.is_valid(&json!(1)));
}

#[test]
fn dynamic_anchor_overrides_through_the_scope() {
    // The classic extensible-list shape: the generic list of anything is
    // narrowed to a list of numbers by the outer scope's dynamic anchor.
    let list = Resource::from_contents(json!({
        "$id": "https://example.com/list",
        "$defs": {
            "anything": {"$dynamicAnchor": "content", "type": ["number", "string", "boolean", "null", "array", "object"]}
        },
        "type": "array",
        "items": {"$dynamicRef": "#content"}
    }))
    .expect("Unknown dialect");
    let schema = json!({
        "$id": "https://example.com/numbers",
        "$defs": {
            "numbersOnly": {"$dynamicAnchor": "content", "type": "number"}
        },
        "$ref": "https://example.com/list"
    });
    let validator = jsonvet::options()
        .with_resource("https://example.com/list", list)
        .build(&schema)
        .expect("Invalid schema");
    assert!(validator.is_valid(&json!([1, 2.5])));
    assert!(!validator.is_valid(&json!([1, "nope"])));
}

#[test]
fn recursive_ref_in_draft_2019() {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/2019-09/schema",
        "$recursiveAnchor": true,
        "type": "object",
        "properties": {"child": {"$recursiveRef": "#"}}
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&json!({"child": {"child": {}}})));
    assert!(!validator.is_valid(&json!({"child": {"child": []}})));
}

#[test]
fn deep_recursion_validates_without_overflow() {
    let schema = json!({
        "$defs": {"node": {"properties": {"next": {"$ref": "#/$defs/node"}}}},
        "$ref": "#/$defs/node"
    });
    let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
    let mut instance = json!({});
    for _ in 0..512 {
        instance = json!({"next": instance});
    }
    assert!(validator.is_valid(&instance));
}
