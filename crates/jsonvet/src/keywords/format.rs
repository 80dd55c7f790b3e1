//! The `format` keyword.
//!
//! Whether `format` asserts depends on the draft: 4/6/7 validate by default,
//! 2019-09 and 2020-12 treat it as an annotation unless the options force
//! assertion. Unknown formats pass silently unless configured otherwise.
use crate::{
    compiler,
    error::ValidationError,
    formats::{self, Format},
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use serde_json::{Map, Value};
use std::sync::Arc;

enum Checker {
    Builtin(fn(&str) -> bool),
    Custom(Arc<dyn Format>),
}

pub(crate) struct FormatValidator {
    name: String,
    checker: Checker,
    location: Location,
}

impl Validate for FormatValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        // Formats only constrain strings
        if let Value::String(item) = instance {
            match &self.checker {
                Checker::Builtin(check) => check(item),
                Checker::Custom(format) => format.is_valid(item),
            }
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
            Err(ValidationError::format(
                self.location.clone(),
                location.into(),
                instance,
                self.name.clone(),
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
    let Value::String(name) = schema else {
        return Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::String,
        )));
    };
    if !ctx.validates_formats_by_default() {
        return None;
    }
    let location = ctx.location().join("format");
    if let Some((name, format)) = ctx.config().get_format(name) {
        return Some(Ok(Box::new(FormatValidator {
            name: name.clone(),
            checker: Checker::Custom(Arc::clone(format)),
            location,
        })));
    }
    match formats::builtin(ctx.draft(), name) {
        Some(check) => Some(Ok(Box::new(FormatValidator {
            name: name.clone(),
            checker: Checker::Builtin(check),
            location,
        }))),
        None if ctx.config().unknown_formats_ignored() => None,
        None => Some(Err(ValidationError::format(
            Location::new(),
            location,
            schema,
            name.clone(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn asserting(schema: &Value) -> crate::Validator {
        crate::options()
            .should_validate_formats(true)
            .build(schema)
            .expect("Invalid schema")
    }

    #[test_case(&json!({"format": "ipv4"}), &json!("127.0.0.1"), true)]
    #[test_case(&json!({"format": "ipv4"}), &json!("not-an-ip"), false)]
    #[test_case(&json!({"format": "uuid"}), &json!("2eb8aa08-aa98-11ea-b4aa-73b441d16380"), true)]
    #[test_case(&json!({"format": "date-time"}), &json!("1990-02-31T15:59:59Z"), false; "impossible date")]
    #[test_case(&json!({"format": "ipv4"}), &json!(12), true; "non-strings pass")]
    fn assertion(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(asserting(schema).is_valid(instance), expected);
    }

    #[test]
    fn annotation_only_by_default_in_2020_12() {
        let validator = crate::validator_for(&json!({"format": "ipv4"})).expect("Invalid schema");
        assert!(validator.is_valid(&json!("not-an-ip")));
    }

    #[test]
    fn asserted_by_default_in_draft7() {
        let validator = crate::options()
            .with_draft(crate::Draft::Draft7)
            .build(&json!({"format": "ipv4"}))
            .expect("Invalid schema");
        assert!(!validator.is_valid(&json!("not-an-ip")));
    }

    #[test]
    fn unknown_formats_pass_silently() {
        let validator = asserting(&json!({"format": "no-such-format"}));
        assert!(validator.is_valid(&json!("anything")));
    }

    #[test]
    fn unknown_formats_can_fail_compilation() {
        let error = crate::options()
            .should_validate_formats(true)
            .should_ignore_unknown_formats(false)
            .build(&json!({"format": "no-such-format"}))
            .expect_err("Should fail");
        assert_eq!(error.keyword(), "format");
    }
}
