use crate::{
    compiler,
    error::ValidationError,
    keywords::{
        helpers::{is_above, NumberLimit},
        CompilationResult,
    },
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

pub(crate) struct ExclusiveMinimumValidator {
    pub(crate) limit: NumberLimit,
    pub(crate) limit_val: Value,
    pub(crate) location: Location,
}

impl Validate for ExclusiveMinimumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Number(item) = instance {
            is_above(item, self.limit)
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
            Err(ValidationError::exclusive_minimum(
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
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    if ctx.draft() == Draft::Draft4 {
        // A boolean modifier for `minimum` there; handled in that emitter
        return None;
    }
    if let Value::Number(limit) = schema {
        Some(Ok(Box::new(ExclusiveMinimumValidator {
            limit: limit.into(),
            limit_val: schema.clone(),
            location: ctx.location().join("exclusiveMinimum"),
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

    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(1.1))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(1.0))]
    #[test_case(&json!({"exclusiveMinimum": 1.0}), &json!(1))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
