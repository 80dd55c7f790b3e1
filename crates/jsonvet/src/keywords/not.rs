use crate::{
    compiler,
    error::ValidationError,
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

pub(crate) struct NotValidator {
    node: SchemaNode,
    original: Value,
    location: Location,
}

impl NotValidator {
    #[inline]
    pub(crate) fn compile<'a>(ctx: &compiler::Context, schema: &'a Value) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("not");
        Ok(Box::new(NotValidator {
            node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            original: schema.clone(),
            location: ctx.location().join("not"),
        }))
    }
}

impl Validate for NotValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        // The inner outcome is only a boolean; no errors are built for it
        !self.node.is_valid(instance)
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::not(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
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
    Some(NotValidator::compile(ctx, schema))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;

    #[test]
    fn negation() {
        tests_util::is_valid(&json!({"not": {"type": "string"}}), &json!(1));
        tests_util::is_not_valid(&json!({"not": {"type": "string"}}), &json!("a"));
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(&json!({"not": {"type": "integer"}}), &json!(1), "/not");
    }
}
