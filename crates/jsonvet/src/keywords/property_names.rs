use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct PropertyNamesValidator {
    node: SchemaNode,
    location: Location,
}

impl PropertyNamesValidator {
    #[inline]
    pub(crate) fn compile<'a>(ctx: &compiler::Context, schema: &'a Value) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("propertyNames");
        Ok(Box::new(PropertyNamesValidator {
            node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            location: ctx.location().join("propertyNames"),
        }))
    }

    fn check_key<'i>(
        &self,
        instance: &'i Value,
        key: &str,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        // The key itself is the value under validation
        let name = Value::String(key.to_string());
        if let Err(error) = self.node.validate(&name, &location.push(key)) {
            return Err(ValidationError::property_names(
                self.location.clone(),
                location.into(),
                instance,
                error,
            ));
        }
        Ok(())
    }
}

impl Validate for PropertyNamesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            item.keys()
                .all(|key| self.node.is_valid(&Value::String(key.clone())))
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
            for key in item.keys() {
                self.check_key(instance, key, location)?;
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let errors: Vec<_> = item
                .keys()
                .filter_map(|key| self.check_key(instance, key, location).err())
                .collect();
            Box::new(errors.into_iter())
        } else {
            no_error()
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    Some(PropertyNamesValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abc": 1}))]
    #[test_case(&json!({"propertyNames": {"pattern": "^a"}}), &json!({"a1": 1, "a2": 2}))]
    #[test_case(&json!({"propertyNames": false}), &json!({}))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abcd": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({"a": 1}))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"propertyNames": {"maxLength": 1}}),
            &json!({"ab": 1}),
            "/propertyNames",
        );
    }
}
