//! The runtime shape of a compiled schema.
use crate::{
    coercion::Coercer,
    error::{error, no_error, ErrorIterator},
    node::SchemaNode,
    paths::LazyLocation,
    options::ValidationOptions,
    Draft, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;

/// A predicate over JSON values produced by the compiler.
///
/// Keyword validators implement this trait. `is_valid` is the boolean hot
/// path and never constructs errors; it is also what applicators use to probe
/// branches (`not`, `if`, `anyOf`) where failure is an expected outcome.
/// `validate` reports the first failure. `iter_errors` is the opt-in
/// collect-all mode; validators that compose sub-schemas override it to keep
/// collecting after the first failure.
pub(crate) trait Validate: Send + Sync {
    fn is_valid(&self, instance: &Value) -> bool;

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>>;

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        match self.validate(instance, location) {
            Ok(()) => no_error(),
            Err(err) => error(err),
        }
    }
}

/// A compiled JSON Schema validator.
///
/// Holds the root of the compiled node tree and the configuration it was
/// built with. The validator is immutable after compilation and safe to share
/// across threads.
#[derive(Debug)]
pub struct Validator {
    pub(crate) root: SchemaNode,
    pub(crate) config: Arc<ValidationOptions>,
    pub(crate) coercer: Option<Coercer>,
}

impl Validator {
    /// Create a validator using the default options.
    ///
    /// # Errors
    ///
    /// Fails on invalid schemas and unresolvable references.
    pub fn new(schema: &Value) -> Result<Validator, ValidationError<'static>> {
        Self::options().build(schema)
    }
    /// Create default [`ValidationOptions`] for configuring validation.
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    /// Check whether `instance` conforms to the schema.
    ///
    /// This is the fastest way to use a compiled validator; no error objects
    /// are constructed.
    #[must_use]
    #[inline]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.root.is_valid(instance)
    }

    /// Validate `instance`, reporting the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered in keyword order.
    #[inline]
    pub fn validate<'i>(&self, instance: &'i Value) -> Result<(), ValidationError<'i>> {
        self.root.validate(instance, &LazyLocation::new())
    }

    /// Iterate over every validation error for `instance`.
    ///
    /// Slower than [`Validator::validate`]; use when all failures are needed.
    #[inline]
    pub fn iter_errors<'i>(&self, instance: &'i Value) -> ErrorIterator<'i> {
        self.root.iter_errors(instance, &LazyLocation::new())
    }

    /// Run the coercion pass over `instance` in place.
    ///
    /// Returns whether the value changed. Does nothing unless coercion was
    /// enabled via [`ValidationOptions::with_coercion`].
    pub fn coerce(&self, instance: &mut Value) -> bool {
        match &self.coercer {
            Some(coercer) => coercer.coerce(instance),
            None => false,
        }
    }

    /// The draft this validator was compiled under.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.config.draft()
    }
    /// The options this validator was compiled with.
    #[must_use]
    pub fn config(&self) -> Arc<ValidationOptions> {
        Arc::clone(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::Validator;
    use serde_json::json;

    #[test]
    fn validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn first_error_wins_in_validate() {
        let schema = json!({"minProperties": 2, "propertyNames": {"minLength": 3}});
        let instance = json!({"a": 3});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.keyword(), "minProperties");
    }

    #[test]
    fn iter_errors_collects_everything() {
        let schema = json!({"minProperties": 2, "propertyNames": {"minLength": 3}});
        let instance = json!({"a": 3});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let errors: Vec<_> = validator.iter_errors(&instance).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "must NOT have fewer than 2 properties");
        assert_eq!(
            errors[1].to_string(),
            "property name is invalid: must NOT have fewer than 3 characters"
        );
    }

    #[test]
    fn deterministic_verdicts() {
        let schema = json!({"anyOf": [{"type": "string", "minLength": 3}, {"type": "integer"}]});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let instance = json!("abcd");
        for _ in 0..3 {
            assert!(validator.is_valid(&instance));
            assert!(validator.validate(&instance).is_ok());
        }
    }
}
