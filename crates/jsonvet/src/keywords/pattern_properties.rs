use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::{additional_properties, pattern::compile_pattern, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use fancy_regex::Regex;
use serde_json::{Map, Value};

pub(crate) struct PatternPropertiesValidator {
    patterns: Vec<(Regex, SchemaNode)>,
}

impl PatternPropertiesValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        map: &'a Map<String, Value>,
    ) -> CompilationResult<'a> {
        Ok(Box::new(PatternPropertiesValidator {
            patterns: compile_patterns(ctx, map)?,
        }))
    }
}

/// Compile a `patternProperties` map into `(regex, sub-validator)` pairs.
pub(crate) fn compile_patterns<'a>(
    ctx: &compiler::Context,
    map: &'a Map<String, Value>,
) -> Result<Vec<(Regex, SchemaNode)>, ValidationError<'a>> {
    let kctx = ctx.new_at_location("patternProperties");
    let mut patterns = Vec::with_capacity(map.len());
    for (pattern, subschema) in map {
        let pctx = kctx.new_at_location(pattern.as_str());
        let Ok(regex) = compile_pattern(pattern) else {
            return Err(ValidationError::format(
                Location::new(),
                kctx.location().clone(),
                subschema,
                "regex",
            ));
        };
        patterns.push((
            regex,
            compiler::compile(&pctx, pctx.as_resource_ref(subschema))?,
        ));
    }
    Ok(patterns)
}

impl Validate for PatternPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            self.patterns.iter().all(|(regex, node)| {
                item.iter()
                    .filter(|(key, _)| regex.is_match(key).unwrap_or(false))
                    .all(|(_, value)| node.is_valid(value))
            })
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Object(item) = instance {
            for (regex, node) in &self.patterns {
                for (key, value) in item {
                    if regex.is_match(key).unwrap_or(false) {
                        node.validate(value, &location.push(key))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let errors: Vec<_> = self
                .patterns
                .iter()
                .flat_map(|(regex, node)| {
                    item.iter()
                        .filter(|(key, _)| regex.is_match(key).unwrap_or(false))
                        .flat_map(|(key, value)| node.iter_errors(value, &location.push(key)))
                        .collect::<Vec<_>>()
                })
                .collect();
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
    if additional_properties::takes_over(parent) {
        return None;
    }
    match schema {
        Value::Object(map) => Some(PatternPropertiesValidator::compile(ctx, map)),
        _ => Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Object,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({"patternProperties": {"^f": {"type": "string"}}}),
        &json!({"foo": 1}),
        "/patternProperties/^f/type"
    )]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn both_matching_patterns_apply() {
        let schema = json!({"patternProperties": {
            "^a": {"type": "integer"},
            "a$": {"minimum": 2}
        }});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!({"a": 2})));
        assert!(!validator.is_valid(&json!({"a": 1})));
        assert!(!validator.is_valid(&json!({"a": "x"})));
    }
}
