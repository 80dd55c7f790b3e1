use crate::{
    compiler,
    error::ValidationError,
    keywords::{
        exclusive_minimum::ExclusiveMinimumValidator,
        helpers::{is_below, NumberLimit},
        CompilationResult,
    },
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

pub(crate) struct MinimumValidator {
    limit: NumberLimit,
    limit_val: Value,
    location: Location,
}

impl Validate for MinimumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Number(item) = instance {
            !is_below(item, self.limit)
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
            Err(ValidationError::minimum(
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
        let location = ctx.location().join("minimum");
        // Draft 4 spells exclusivity as a boolean modifier
        if ctx.draft() == Draft::Draft4
            && parent
                .get("exclusiveMinimum")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        {
            return Some(Ok(Box::new(ExclusiveMinimumValidator {
                limit: limit.into(),
                limit_val: schema.clone(),
                location: ctx.location().join("exclusiveMinimum"),
            })));
        }
        Some(Ok(Box::new(MinimumValidator {
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
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 0}), &json!(-1))]
    #[test_case(&json!({"minimum": 1.1}), &json!(0.6))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_parameters() {
        let validator =
            crate::validator_for(&json!({"type": "integer", "minimum": 0})).expect("Invalid schema");
        let error = validator.validate(&json!(-1)).expect_err("Should fail");
        assert_eq!(error.keyword(), "minimum");
        match &error.kind {
            crate::ValidationErrorKind::Minimum { limit } => assert_eq!(limit, &json!(0)),
            kind => panic!("Unexpected kind: {kind:?}"),
        }
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"minimum": 5}), &json!(1), "/minimum");
    }
}
