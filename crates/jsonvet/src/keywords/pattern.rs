use crate::{
    compiler, ecma,
    error::ValidationError,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use fancy_regex::Regex;
use serde_json::{Map, Value};

pub(crate) struct PatternValidator {
    original: String,
    pattern: Regex,
    location: Location,
}

impl Validate for PatternValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::String(item) = instance {
            self.pattern.is_match(item).unwrap_or(false)
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::String(item) = instance {
            match self.pattern.is_match(item) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(ValidationError::pattern(
                        self.location.clone(),
                        location.into(),
                        instance,
                        self.original.clone(),
                    ))
                }
                Err(err) => {
                    return Err(ValidationError::backtrack_limit(
                        self.location.clone(),
                        location.into(),
                        instance,
                        err,
                    ))
                }
            }
        }
        Ok(())
    }
}

/// Translate an ECMA 262 pattern and compile it for the runtime engine.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, ()> {
    let translated = ecma::to_rust_regex(pattern)?;
    Regex::new(&translated).map_err(|_| ())
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match schema {
        Value::String(item) => {
            let location = ctx.location().join("pattern");
            match compile_pattern(item) {
                Ok(pattern) => Some(Ok(Box::new(PatternValidator {
                    original: item.clone(),
                    pattern,
                    location,
                }))),
                Err(()) => Some(Err(ValidationError::format(
                    Location::new(),
                    location,
                    schema,
                    "regex",
                ))),
            }
        }
        _ => Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::String,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"pattern": "^a*$"}), &json!("aaa"))]
    #[test_case(&json!({"pattern": "\\d{3}"}), &json!("x123y"); "unanchored and translated")]
    #[test_case(&json!({"pattern": "^(?=.*b)a"}), &json!("ab"); "lookahead via fancy engine")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        assert!(crate::validator_for(&json!({"pattern": "a{3,2}"})).is_err());
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"pattern": "^a*$"}), &json!("abc"), "/pattern");
    }
}
