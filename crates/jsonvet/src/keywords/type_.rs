use crate::{
    compiler,
    error::ValidationError,
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    primitive_type::{PrimitiveType, PrimitiveTypes},
    validator::Validate,
    Draft,
};
use serde_json::{json, Map, Number, Value};
use std::convert::TryFrom;

/// How `integer` treats floats: draft 4 requires an integral representation,
/// later drafts accept numbers with a zero fractional part (`1.0`).
#[derive(Clone, Copy)]
enum IntegerStrictness {
    Draft4,
    ZeroFraction,
}

fn is_integer(number: &Number, strictness: IntegerStrictness) -> bool {
    match strictness {
        IntegerStrictness::Draft4 => number.is_u64() || number.is_i64(),
        IntegerStrictness::ZeroFraction => {
            number.is_u64()
                || number.is_i64()
                || number.as_f64().expect("Always valid").fract() == 0.
        }
    }
}

pub(crate) struct SingleTypeValidator {
    type_: PrimitiveType,
    strictness: IntegerStrictness,
    location: Location,
}

impl SingleTypeValidator {
    #[inline]
    fn compile<'a>(
        type_: PrimitiveType,
        strictness: IntegerStrictness,
        location: Location,
    ) -> CompilationResult<'a> {
        Ok(Box::new(SingleTypeValidator {
            type_,
            strictness,
            location,
        }))
    }
}

impl Validate for SingleTypeValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match self.type_ {
            PrimitiveType::Array => instance.is_array(),
            PrimitiveType::Boolean => instance.is_boolean(),
            PrimitiveType::Null => instance.is_null(),
            PrimitiveType::Object => instance.is_object(),
            PrimitiveType::String => instance.is_string(),
            PrimitiveType::Number => instance.is_number(),
            PrimitiveType::Integer => match instance {
                Value::Number(number) => is_integer(number, self.strictness),
                _ => false,
            },
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
            Err(ValidationError::single_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.type_,
            ))
        }
    }
}

pub(crate) struct MultipleTypesValidator {
    types: PrimitiveTypes,
    strictness: IntegerStrictness,
    location: Location,
}

impl MultipleTypesValidator {
    #[inline]
    fn compile<'a>(
        items: &'a [Value],
        strictness: IntegerStrictness,
        location: Location,
    ) -> CompilationResult<'a> {
        let mut types = PrimitiveTypes::new();
        for item in items {
            match item {
                Value::String(name) => {
                    if let Ok(type_) = PrimitiveType::try_from(name.as_str()) {
                        types |= type_;
                    } else {
                        return Err(ValidationError::enumeration(
                            Location::new(),
                            location,
                            item,
                            &json!([
                                "array", "boolean", "integer", "null", "number", "object", "string"
                            ]),
                        ));
                    }
                }
                _ => {
                    return Err(ValidationError::single_type_error(
                        Location::new(),
                        location,
                        item,
                        PrimitiveType::String,
                    ))
                }
            }
        }
        Ok(Box::new(MultipleTypesValidator {
            types,
            strictness,
            location,
        }))
    }
}

impl Validate for MultipleTypesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance {
            Value::Array(_) => self.types.contains(PrimitiveType::Array),
            Value::Bool(_) => self.types.contains(PrimitiveType::Boolean),
            Value::Null => self.types.contains(PrimitiveType::Null),
            Value::Object(_) => self.types.contains(PrimitiveType::Object),
            Value::String(_) => self.types.contains(PrimitiveType::String),
            Value::Number(number) => {
                self.types.contains(PrimitiveType::Number)
                    || (self.types.contains(PrimitiveType::Integer)
                        && is_integer(number, self.strictness))
            }
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
            Err(ValidationError::multiple_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.types,
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
    let location = ctx.location().join("type");
    let strictness = if ctx.draft() == Draft::Draft4 {
        IntegerStrictness::Draft4
    } else {
        IntegerStrictness::ZeroFraction
    };
    match schema {
        Value::String(_) => Some(compile_single(schema, strictness, location)),
        Value::Array(items) => {
            if let [item @ Value::String(_)] = items.as_slice() {
                Some(compile_single(item, strictness, location))
            } else {
                Some(MultipleTypesValidator::compile(items, strictness, location))
            }
        }
        _ => Some(Err(ValidationError::multiple_type_error(
            Location::new(),
            location,
            schema,
            PrimitiveTypes::new()
                .with(PrimitiveType::String)
                .with(PrimitiveType::Array),
        ))),
    }
}

fn compile_single<'a>(
    schema: &'a Value,
    strictness: IntegerStrictness,
    location: Location,
) -> CompilationResult<'a> {
    let name = schema.as_str().expect("schema is Value::String");
    match PrimitiveType::try_from(name) {
        Ok(type_) => SingleTypeValidator::compile(type_, strictness, location),
        Err(()) => Err(ValidationError::enumeration(
            Location::new(),
            location,
            schema,
            &json!(["array", "boolean", "integer", "null", "number", "object", "string"]),
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "integer"}), &json!(1.0), true)]
    #[test_case(&json!({"type": "integer"}), &json!(1.5), false)]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!(1.0), true)]
    #[test_case(&json!({"type": "number"}), &json!(1), true)]
    fn zero_fraction_integers(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(crate::is_valid(schema, instance), expected);
    }

    #[test]
    fn draft4_integers_are_strict() {
        let validator = crate::options()
            .with_draft(Draft::Draft4)
            .build(&json!({"type": "integer"}))
            .expect("Invalid schema");
        assert!(validator.is_valid(&json!(1)));
        assert!(!validator.is_valid(&json!(1.0)));
    }

    #[test_case(&json!({"type": "array"}), &json!(1))]
    #[test_case(&json!({"type": ["string", "object"]}), &json!(1))]
    fn location(schema: &Value, instance: &Value) {
        tests_util::assert_schema_location(schema, instance, "/type");
    }
}
