use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::{additional_properties, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct PropertiesValidator {
    properties: Vec<(String, SchemaNode)>,
}

impl PropertiesValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        map: &'a Map<String, Value>,
    ) -> CompilationResult<'a> {
        Ok(Box::new(PropertiesValidator {
            properties: compile_map(ctx, map)?,
        }))
    }
}

/// Compile a `properties` map into per-name sub-validators.
pub(crate) fn compile_map<'a>(
    ctx: &compiler::Context,
    map: &'a Map<String, Value>,
) -> Result<Vec<(String, SchemaNode)>, ValidationError<'a>> {
    let kctx = ctx.new_at_location("properties");
    let mut properties = Vec::with_capacity(map.len());
    for (key, subschema) in map {
        let pctx = kctx.new_at_location(key.as_str());
        properties.push((
            key.clone(),
            compiler::compile(&pctx, pctx.as_resource_ref(subschema))?,
        ));
    }
    Ok(properties)
}

impl Validate for PropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            self.properties.iter().all(|(name, node)| {
                item.get(name).map_or(true, |value| node.is_valid(value))
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
            for (name, node) in &self.properties {
                if let Some(value) = item.get(name) {
                    node.validate(value, &location.push(name))?;
                }
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let errors: Vec<_> = self
                .properties
                .iter()
                .filter_map(|(name, node)| {
                    item.get(name)
                        .map(|value| node.iter_errors(value, &location.push(name)))
                })
                .flatten()
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
        // The combined emitter covers `properties` as well
        return None;
    }
    match schema {
        Value::Object(map) => Some(PropertiesValidator::compile(ctx, map)),
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
        &json!({"properties": {"a": {"type": "integer"}}}),
        &json!({"a": "x"}),
        "/properties/a/type"
    )]
    #[test_case(
        &json!({"properties": {"a": {"properties": {"b": {"minimum": 3}}}}}),
        &json!({"a": {"b": 1}}),
        "/properties/a/properties/b/minimum"
    )]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn instance_path_points_at_the_member() {
        let schema = json!({"properties": {"a/b": {"type": "integer"}}});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let error = validator
            .validate(&json!({"a/b": "x"}))
            .expect_err("Should fail");
        assert_eq!(error.instance_path.as_str(), "/a~1b");
    }
}
