use crate::{
    error::ValidationError,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::Value;

/// The `false` schema: rejects everything.
pub(crate) struct FalseValidator {
    location: Location,
}

impl FalseValidator {
    #[inline]
    pub(crate) fn compile<'a>(location: Location) -> CompilationResult<'a> {
        Ok(Box::new(FalseValidator { location }))
    }
}

impl Validate for FalseValidator {
    fn is_valid(&self, _: &Value) -> bool {
        false
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        Err(ValidationError::false_schema(
            self.location.clone(),
            location.into(),
            instance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn rejects_everything() {
        let validator = crate::validator_for(&json!(false)).expect("Invalid schema");
        assert!(!validator.is_valid(&json!(null)));
        assert!(!validator.is_valid(&json!({})));
        let instance = json!(1);
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.to_string(), "boolean schema is false");
    }
}
