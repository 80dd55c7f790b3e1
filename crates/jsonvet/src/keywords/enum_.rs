use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers, CompilationResult},
    paths::{LazyLocation, Location},
    primitive_type::{PrimitiveType, PrimitiveTypes},
    validator::Validate,
};
use ahash::AHashSet;
use serde_json::{Map, Value};

/// Above this size a string-only enum switches to a hashed lookup; below it,
/// the constant overhead of hashing loses to a linear scan.
const SET_LOOKUP_THRESHOLD: usize = 15;

pub(crate) struct EnumValidator {
    options: Value,
    /// Types present among the options: anything else can be rejected without
    /// comparing at all.
    types: PrimitiveTypes,
    items: Vec<Value>,
    location: Location,
}

impl EnumValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        schema: &'a Value,
        items: &'a [Value],
        location: Location,
    ) -> CompilationResult<'a> {
        let mut types = PrimitiveTypes::new();
        for item in items {
            types |= PrimitiveType::from(item);
        }
        Ok(Box::new(EnumValidator {
            options: schema.clone(),
            types,
            items: items.to_vec(),
            location,
        }))
    }
}

impl Validate for EnumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.types.contains(PrimitiveType::from(instance))
            && self.items.iter().any(|item| helpers::equal(instance, item))
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::enumeration(
                self.location.clone(),
                location.into(),
                instance,
                &self.options,
            ))
        }
    }
}

/// Large all-string enums: a hashed set beats the linear scan.
pub(crate) struct StringEnumValidator {
    options: Value,
    items: AHashSet<String>,
    location: Location,
}

impl StringEnumValidator {
    #[inline]
    fn compile<'a>(schema: &'a Value, items: &'a [Value], location: Location) -> CompilationResult<'a> {
        Ok(Box::new(StringEnumValidator {
            options: schema.clone(),
            items: items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            location,
        }))
    }
}

impl Validate for StringEnumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance {
            Value::String(value) => self.items.contains(value),
            _ => false,
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
            Err(ValidationError::enumeration(
                self.location.clone(),
                location.into(),
                instance,
                &self.options,
            ))
        }
    }
}

pub(crate) struct SingleValueEnumValidator {
    value: Value,
    options: Value,
    location: Location,
}

impl SingleValueEnumValidator {
    #[inline]
    fn compile<'a>(schema: &'a Value, value: &'a Value, location: Location) -> CompilationResult<'a> {
        Ok(Box::new(SingleValueEnumValidator {
            options: schema.clone(),
            value: value.clone(),
            location,
        }))
    }
}

impl Validate for SingleValueEnumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        helpers::equal(&self.value, instance)
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::enumeration(
                self.location.clone(),
                location.into(),
                instance,
                &self.options,
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
    if let Value::Array(items) = schema {
        let location = ctx.location().join("enum");
        if let [value] = items.as_slice() {
            Some(SingleValueEnumValidator::compile(schema, value, location))
        } else if items.len() > SET_LOOKUP_THRESHOLD && items.iter().all(Value::is_string) {
            Some(StringEnumValidator::compile(schema, items, location))
        } else {
            Some(EnumValidator::compile(schema, items, location))
        }
    } else {
        Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Array,
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1]}), &json!(2), "/enum")]
    #[test_case(&json!({"enum": [1, 3]}), &json!(2), "/enum")]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn hashed_lookup_for_large_string_enums() {
        let options: Vec<Value> = (0..20).map(|i| json!(format!("v{i}"))).collect();
        let schema = json!({"enum": options});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!("v17")));
        assert!(!validator.is_valid(&json!("v20")));
        assert!(!validator.is_valid(&json!(17)));
    }

    #[test]
    fn numeric_equivalence() {
        tests_util::is_valid(&json!({"enum": [[1.0], "a"]}), &json!([1]));
    }
}
