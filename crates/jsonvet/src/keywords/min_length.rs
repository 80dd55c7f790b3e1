use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers::expect_limit, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct MinLengthValidator {
    limit: u64,
    location: Location,
}

impl Validate for MinLengthValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            // Lengths are code points, not bytes or UTF-16 units
            (bytecount::num_chars(item.as_bytes()) as u64) >= self.limit
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
            Err(ValidationError::min_length(
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
    let location = ctx.location().join("minLength");
    match expect_limit(ctx, schema) {
        Ok(limit) => Some(Ok(Box::new(MinLengthValidator { limit, location }))),
        Err(err) => Some(Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;

    #[test]
    fn surrogate_pairs_count_as_one() {
        // U+1F600 is two UTF-16 units but one code point
        tests_util::is_valid(&json!({"minLength": 2, "maxLength": 2}), &json!("\u{1F600}\u{1F601}"));
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"minLength": 1}), &json!(""), "/minLength");
    }
}
