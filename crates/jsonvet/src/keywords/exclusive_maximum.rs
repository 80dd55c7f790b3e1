use crate::{
    compiler,
    error::ValidationError,
    keywords::{
        helpers::{is_below, NumberLimit},
        CompilationResult,
    },
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

pub(crate) struct ExclusiveMaximumValidator {
    pub(crate) limit: NumberLimit,
    pub(crate) limit_val: Value,
    pub(crate) location: Location,
}

impl Validate for ExclusiveMaximumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Number(item) = instance {
            is_below(item, self.limit)
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
            Err(ValidationError::exclusive_maximum(
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
        // A boolean modifier for `maximum` there; handled in that emitter
        return None;
    }
    if let Value::Number(limit) = schema {
        Some(Ok(Box::new(ExclusiveMaximumValidator {
            limit: limit.into(),
            limit_val: schema.clone(),
            location: ctx.location().join("exclusiveMaximum"),
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
