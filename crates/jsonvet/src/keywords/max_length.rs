use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers::expect_limit, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct MaxLengthValidator {
    limit: u64,
    location: Location,
}

impl Validate for MaxLengthValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            (bytecount::num_chars(item.as_bytes()) as u64) <= self.limit
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
            Err(ValidationError::max_length(
                self.location.clone(),
                location.into(),
                instance,
                self.limit,
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
    let location = ctx.location().join("maxLength");
    match expect_limit(ctx, schema) {
        Ok(limit) => Some(Ok(Box::new(MaxLengthValidator { limit, location }))),
        Err(err) => Some(Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;

    #[test]
    fn code_points_not_bytes() {
        tests_util::is_valid(&json!({"maxLength": 2}), &json!("ää"));
        tests_util::is_not_valid(&json!({"maxLength": 2}), &json!("äää"));
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"maxLength": 2}), &json!("foo"), "/maxLength");
    }
}
