use crate::{
    compiler,
    error::ValidationError,
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct OneOfValidator {
    schemas: Vec<SchemaNode>,
    location: Location,
}

impl OneOfValidator {
    #[inline]
    pub(crate) fn compile<'a>(ctx: &compiler::Context, items: &'a [Value]) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("oneOf");
        let mut schemas = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let ictx = kctx.new_at_location(idx);
            schemas.push(compiler::compile(&ictx, ictx.as_resource_ref(item))?);
        }
        Ok(Box::new(OneOfValidator {
            schemas,
            location: kctx.location().clone(),
        }))
    }

    fn first_valid(&self, instance: &Value) -> Option<usize> {
        self.schemas
            .iter()
            .position(|node| node.is_valid(instance))
    }

    fn any_other_valid(&self, instance: &Value, after: usize) -> bool {
        self.schemas
            .iter()
            .skip(after + 1)
            .any(|node| node.is_valid(instance))
    }
}

impl Validate for OneOfValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match self.first_valid(instance) {
            Some(idx) => !self.any_other_valid(instance, idx),
            None => false,
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        match self.first_valid(instance) {
            Some(idx) => {
                if self.any_other_valid(instance, idx) {
                    Err(ValidationError::one_of_multiple_valid(
                        self.location.clone(),
                        location.into(),
                        instance,
                    ))
                } else {
                    Ok(())
                }
            }
            None => Err(ValidationError::one_of_not_valid(
                self.location.clone(),
                location.into(),
                instance,
            )),
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match schema {
        Value::Array(items) => Some(OneOfValidator::compile(ctx, items)),
        _ => Some(Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Array,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3); "both match")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5); "neither matches")]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"oneOf": [{"type": "string"}]}),
            &json!(0),
            "/oneOf",
        );
    }
}
