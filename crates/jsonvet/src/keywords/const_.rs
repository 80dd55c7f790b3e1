use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct ConstValidator {
    expected: Value,
    location: Location,
}

impl ConstValidator {
    #[inline]
    pub(crate) fn compile<'a>(expected: &Value, location: Location) -> CompilationResult<'a> {
        Ok(Box::new(ConstValidator {
            expected: expected.clone(),
            location,
        }))
    }
}

impl Validate for ConstValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        helpers::equal(instance, &self.expected)
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::constant(
                self.location.clone(),
                location.into(),
                instance,
                &self.expected,
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
    Some(ConstValidator::compile(
        schema,
        ctx.location().join("const"),
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": 0.0}), &json!(0))]
    #[test_case(&json!({"const": {"a": [1.0]}}), &json!({"a": [1]}))]
    #[test_case(&json!({"const": null}), &json!(null))]
    fn numeric_equivalence(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn message_and_location() {
        let validator = crate::validator_for(&json!({"const": 2})).expect("Invalid schema");
        let instance = json!(5);
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.to_string(), "must be equal to constant");
        assert_eq!(error.schema_path.as_str(), "/const");
    }
}
