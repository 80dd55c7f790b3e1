use crate::{
    compiler,
    error::ValidationError,
    keywords::{
        exclusive_maximum::ExclusiveMaximumValidator,
        helpers::{is_above, NumberLimit},
        CompilationResult,
    },
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

pub(crate) struct MaximumValidator {
    limit: NumberLimit,
    limit_val: Value,
    location: Location,
}

impl Validate for MaximumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Number(item) = instance {
            !is_above(item, self.limit)
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::maximum(
                self.location.clone(),
                location.into(),
                instance,
                self.limit_val.clone(),
            ))
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    if let Value::Number(limit) = schema {
        let location = ctx.location().join("maximum");
        // Draft 4 spells exclusivity as a boolean modifier
        if ctx.draft() == Draft::Draft4
            && parent
                .get("exclusiveMaximum")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        {
            return Some(Ok(Box::new(ExclusiveMaximumValidator {
                limit: limit.into(),
                limit_val: schema.clone(),
                location: ctx.location().join("exclusiveMaximum"),
            })));
        }
        Some(Ok(Box::new(MaximumValidator {
            limit: limit.into(),
            limit_val: schema.clone(),
            location,
        })))
    } else {
        Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Number,
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maximum": 1_u64 << 54}), &json!((1_u64 << 54) + 1); "no precision loss past 2^53")]
    #[test_case(&json!({"maximum": 5}), &json!(5.5))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn draft4_boolean_exclusive_maximum() {
        let schema = json!({"maximum": 3, "exclusiveMaximum": true});
        let validator = crate::options()
            .with_draft(Draft::Draft4)
            .build(&schema)
            .expect("Invalid schema");
        assert!(!validator.is_valid(&json!(3)));
        assert!(validator.is_valid(&json!(2.9)));
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"maximum": 5}), &json!(10), "/maximum");
    }
}
