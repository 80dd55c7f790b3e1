//! `additionalProperties`, fused with its `properties` / `patternProperties`
//! siblings.
//!
//! The three keywords partition an object's members, so compiling them into
//! one validator avoids re-discovering which names were already covered.
use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::{pattern_properties::compile_patterns, properties::compile_map, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use fancy_regex::Regex;
use serde_json::{Map, Value};

/// Whether this emitter subsumes `properties` and `patternProperties`.
///
/// `additionalProperties: true` imposes nothing, so the sibling emitters stay
/// responsible for themselves in that case.
pub(crate) fn takes_over(parent: &Map<String, Value>) -> bool {
    matches!(
        parent.get("additionalProperties"),
        Some(Value::Object(_) | Value::Bool(false))
    )
}

enum Rest {
    /// `additionalProperties: <schema>`: leftovers validate against it.
    Schema(SchemaNode),
    /// `additionalProperties: false`: leftovers are rejected.
    Forbidden,
}

pub(crate) struct AdditionalPropertiesValidator {
    properties: Vec<(String, SchemaNode)>,
    patterns: Vec<(Regex, SchemaNode)>,
    rest: Rest,
    location: Location,
}

impl AdditionalPropertiesValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        parent: &'a Map<String, Value>,
        schema: &'a Value,
    ) -> CompilationResult<'a> {
        let properties = match parent.get("properties") {
            Some(Value::Object(map)) => compile_map(ctx, map)?,
            _ => Vec::new(),
        };
        let patterns = match parent.get("patternProperties") {
            Some(Value::Object(map)) => compile_patterns(ctx, map)?,
            _ => Vec::new(),
        };
        let rest = match schema {
            Value::Bool(false) => Rest::Forbidden,
            _ => {
                let rctx = ctx.new_at_location("additionalProperties");
                Rest::Schema(compiler::compile(&rctx, rctx.as_resource_ref(schema))?)
            }
        };
        Ok(Box::new(AdditionalPropertiesValidator {
            properties,
            patterns,
            rest,
            location: ctx.location().join("additionalProperties"),
        }))
    }

    fn named(&self, key: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }
}

impl Validate for AdditionalPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            for (key, value) in item {
                let mut covered = false;
                if let Some(node) = self.named(key) {
                    covered = true;
                    if !node.is_valid(value) {
                        return false;
                    }
                }
                for (regex, node) in &self.patterns {
                    if regex.is_match(key).unwrap_or(false) {
                        covered = true;
                        if !node.is_valid(value) {
                            return false;
                        }
                    }
                }
                if !covered {
                    match &self.rest {
                        Rest::Schema(node) => {
                            if !node.is_valid(value) {
                                return false;
                            }
                        }
                        Rest::Forbidden => return false,
                    }
                }
            }
        }
        true
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Object(item) = instance {
            let mut unexpected = Vec::new();
            for (key, value) in item {
                let mut covered = false;
                if let Some(node) = self.named(key) {
                    covered = true;
                    node.validate(value, &location.push(key))?;
                }
                for (regex, node) in &self.patterns {
                    if regex.is_match(key).unwrap_or(false) {
                        covered = true;
                        node.validate(value, &location.push(key))?;
                    }
                }
                if !covered {
                    match &self.rest {
                        Rest::Schema(node) => node.validate(value, &location.push(key))?,
                        Rest::Forbidden => unexpected.push(key.clone()),
                    }
                }
            }
            if !unexpected.is_empty() {
                return Err(ValidationError::additional_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ));
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let mut errors = Vec::new();
            let mut unexpected = Vec::new();
            for (key, value) in item {
                let mut covered = false;
                if let Some(node) = self.named(key) {
                    covered = true;
                    errors.extend(node.iter_errors(value, &location.push(key)));
                }
                for (regex, node) in &self.patterns {
                    if regex.is_match(key).unwrap_or(false) {
                        covered = true;
                        errors.extend(node.iter_errors(value, &location.push(key)));
                    }
                }
                if !covered {
                    match &self.rest {
                        Rest::Schema(node) => {
                            errors.extend(node.iter_errors(value, &location.push(key)));
                        }
                        Rest::Forbidden => unexpected.push(key.clone()),
                    }
                }
            }
            if !unexpected.is_empty() {
                errors.push(ValidationError::additional_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ));
            }
            Box::new(errors.into_iter())
        } else {
            no_error()
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    if !takes_over(parent) {
        // `additionalProperties: true` (or a non-schema value caught by the
        // sibling emitters) imposes nothing
        return None;
    }
    Some(AdditionalPropertiesValidator::compile(ctx, parent, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"additionalProperties": false}), &json!({}))]
    #[test_case(
        &json!({"additionalProperties": false, "properties": {"foo": {}}}),
        &json!({"foo": 1})
    )]
    #[test_case(
        &json!({
            "additionalProperties": {"type": "string"},
            "properties": {"foo": {}},
            "patternProperties": {"^v": {"type": "integer"}}
        }),
        &json!({"foo": null, "v1": 2, "extra": "ok"})
    )]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"additionalProperties": false, "properties": {"foo": {}}}),
        &json!({"foo": 1, "bar": 2})
    )]
    #[test_case(
        &json!({
            "additionalProperties": {"type": "string"},
            "patternProperties": {"^v": {}}
        }),
        &json!({"v1": 1, "extra": 2})
    )]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn unexpected_names_are_reported() {
        let schema = json!({"additionalProperties": false, "properties": {"a": {}}});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let instance = json!({"a": 1, "b": 2, "c": 3});
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.to_string(), "must NOT have additional properties");
        match &error.kind {
            crate::ValidationErrorKind::AdditionalProperties { unexpected } => {
                assert_eq!(unexpected, &["b", "c"]);
            }
            kind => panic!("Unexpected kind: {kind:?}"),
        }
    }

    #[test]
    fn prototype_like_names_are_plain_data() {
        let schema = json!({
            "properties": {"constructor": {"type": "integer"}},
            "additionalProperties": false
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!({"constructor": 1})));
        assert!(!validator.is_valid(&json!({"constructor": 1, "__proto__": 2})));
    }
}
