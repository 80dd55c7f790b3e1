//! A high-performance JSON Schema validator.
//!
//! Schemas are compiled once into a tree of specialized validator nodes and
//! then applied to documents on a hot path. Drafts 4, 6, 7, 2019-09 and
//! 2020-12 are supported, including `$ref` across documents, `$anchor`,
//! `$dynamicAnchor`/`$dynamicRef` and the `unevaluated*` keywords.
//!
//! # Validation
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "object", "required": ["name"]});
//! let validator = jsonvet::validator_for(&schema).expect("Invalid schema");
//!
//! // Boolean result - the fastest path
//! assert!(validator.is_valid(&json!({"name": "Pastel"})));
//!
//! // First error
//! let error = validator.validate(&json!({})).expect_err("Should fail");
//! assert_eq!(error.to_string(), "must have required property 'name'");
//!
//! // Every error
//! for error in validator.iter_errors(&json!(42)) {
//!     println!("{error} at {}", error.instance_path);
//! }
//! ```
//!
//! # Configuration
//!
//! ```rust
//! use jsonvet::Draft;
//! use serde_json::json;
//!
//! let validator = jsonvet::options()
//!     .with_draft(Draft::Draft7)
//!     .should_validate_formats(true)
//!     .build(&json!({"format": "email"}))
//!     .expect("Invalid schema");
//! assert!(!validator.is_valid(&json!("not an email")));
//! ```
//!
//! Remote documents referenced via `$ref` are supplied up front through
//! [`ValidationOptions::with_resource`]; an unresolvable reference is a
//! compile-time error, never a silent pass.
mod coercion;
mod compiler;
mod ecma;
mod error;
mod formats;
mod keywords;
mod node;
mod options;
mod paths;
mod primitive_type;
mod validator;

pub use coercion::CoercionRules;
pub use error::{ErrorIterator, TypeKind, ValidationError, ValidationErrorKind};
pub use options::ValidationOptions;
pub use paths::{LazyLocation, Location, LocationSegment};
pub use primitive_type::{PrimitiveType, PrimitiveTypes};
pub use referencing::{Draft, Error as ReferencingError, Resource};
pub use validator::Validator;

use serde_json::Value;

/// Compile a schema with the default options.
///
/// # Errors
///
/// Fails on malformed schemas and unresolvable references.
pub fn validator_for(schema: &Value) -> Result<Validator, ValidationError<'static>> {
    Validator::new(schema)
}

/// Create [`ValidationOptions`] for configuring a validator.
#[must_use]
pub fn options() -> ValidationOptions {
    ValidationOptions::default()
}

/// One-shot validity check.
///
/// # Panics
///
/// Panics when the schema itself is invalid; compile the schema explicitly
/// via [`validator_for`] to handle that case.
#[must_use]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    validator_for(schema)
        .expect("Invalid schema")
        .is_valid(instance)
}

/// One-shot validation, reporting the first error.
///
/// # Errors
///
/// Returns the first [`ValidationError`] produced by the instance.
///
/// # Panics
///
/// Panics when the schema itself is invalid.
pub fn validate<'i>(schema: &Value, instance: &'i Value) -> Result<(), ValidationError<'i>> {
    validator_for(schema)
        .expect("Invalid schema")
        .validate(instance)
}

#[cfg(test)]
pub(crate) mod tests_util {
    use super::Draft;
    use serde_json::Value;

    #[track_caller]
    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let validator = crate::validator_for(schema).expect("Invalid schema");
        assert!(
            validator.is_valid(instance),
            "{instance} should be valid against {schema}"
        );
        assert!(validator.validate(instance).is_ok());
    }

    #[track_caller]
    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        let validator = crate::validator_for(schema).expect("Invalid schema");
        assert!(
            !validator.is_valid(instance),
            "{instance} should not be valid against {schema}"
        );
        assert!(validator.validate(instance).is_err());
        assert!(validator.iter_errors(instance).next().is_some());
    }

    #[track_caller]
    pub(crate) fn assert_schema_location(schema: &Value, instance: &Value, expected: &str) {
        let validator = crate::validator_for(schema).expect("Invalid schema");
        let error = validator.validate(instance).expect_err("Should fail");
        assert_eq!(error.schema_path.as_str(), expected);
    }

    #[track_caller]
    pub(crate) fn assert_schema_location_with_draft(
        draft: Draft,
        schema: &Value,
        instance: &Value,
        expected: &str,
    ) {
        let validator = crate::options()
            .with_draft(draft)
            .build(schema)
            .expect("Invalid schema");
        let error = validator.validate(instance).expect_err("Should fail");
        assert_eq!(error.schema_path.as_str(), expected);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn compilation_is_idempotent() {
        let schema = json!({"type": "object", "properties": {"a": {"minimum": 2}}});
        let first = crate::validator_for(&schema).expect("Invalid schema");
        let second = crate::validator_for(&schema).expect("Invalid schema");
        for instance in [json!({}), json!({"a": 1}), json!({"a": 3}), json!(null)] {
            assert_eq!(first.is_valid(&instance), second.is_valid(&instance));
        }
    }

    #[test]
    fn wrong_schema_type() {
        assert!(crate::validator_for(&json!([1])).is_err());
    }
}
