use crate::{
    compiler,
    error::{ErrorIterator, ValidationError},
    keywords::CompilationResult,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct RequiredValidator {
    required: Vec<String>,
    location: Location,
}

impl RequiredValidator {
    #[inline]
    pub(crate) fn compile<'a>(items: &'a [Value], location: Location) -> CompilationResult<'a> {
        let mut required = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(name) => required.push(name.clone()),
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
        Ok(Box::new(RequiredValidator { required, location }))
    }
}

impl Validate for RequiredValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            self.required.iter().all(|name| item.contains_key(name))
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Object(item) = instance {
            // One compound scan; the first missing name produces the error
            if let Some(missing) = self
                .required
                .iter()
                .find(|name| !item.contains_key(name.as_str()))
            {
                return Err(ValidationError::required(
                    self.location.clone(),
                    Location::from(&location.push(missing)),
                    instance,
                    missing.clone(),
                ));
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let errors: Vec<_> = self
                .required
                .iter()
                .filter(|name| !item.contains_key(name.as_str()))
                .map(|missing| {
                    ValidationError::required(
                        self.location.clone(),
                        Location::from(&location.push(missing)),
                        instance,
                        missing.clone(),
                    )
                })
                .collect();
            Box::new(errors.into_iter())
        } else {
            crate::error::no_error()
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    let location = ctx.location().join("required");
    match schema {
        Value::Array(items) => Some(RequiredValidator::compile(items, location)),
        _ => Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Array,
        ))),
    }
}
