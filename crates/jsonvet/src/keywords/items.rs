use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::{PrimitiveType, PrimitiveTypes},
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

/// Schema-form `items`: every element past `skip` validates against one node.
///
/// `skip` is the length of `prefixItems` in draft 2020-12 and zero elsewhere.
pub(crate) struct ItemsValidator {
    node: SchemaNode,
    skip: usize,
}

impl ItemsValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        schema: &'a Value,
        skip: usize,
    ) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("items");
        Ok(Box::new(ItemsValidator {
            node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            skip,
        }))
    }
}

impl Validate for ItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            items.iter().skip(self.skip).all(|item| self.node.is_valid(item))
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Array(items) = instance {
            for (idx, item) in items.iter().enumerate().skip(self.skip) {
                self.node.validate(item, &location.push(idx))?;
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Array(items) = instance {
            let errors: Vec<_> = items
                .iter()
                .enumerate()
                .skip(self.skip)
                .flat_map(|(idx, item)| self.node.iter_errors(item, &location.push(idx)))
                .collect();
            Box::new(errors.into_iter())
        } else {
            no_error()
        }
    }
}

/// Tuple-form `items` (drafts 4 through 2019-09).
pub(crate) struct TupleItemsValidator {
    schemas: Vec<SchemaNode>,
}

impl TupleItemsValidator {
    #[inline]
    fn compile<'a>(ctx: &compiler::Context, items: &'a [Value]) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("items");
        let mut schemas = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let ictx = kctx.new_at_location(idx);
            schemas.push(compiler::compile(&ictx, ictx.as_resource_ref(item))?);
        }
        Ok(Box::new(TupleItemsValidator { schemas }))
    }
}

impl Validate for TupleItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            self.schemas
                .iter()
                .zip(items)
                .all(|(node, item)| node.is_valid(item))
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Array(items) = instance {
            for (idx, (node, item)) in self.schemas.iter().zip(items).enumerate() {
                node.validate(item, &location.push(idx))?;
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Array(items) = instance {
            let errors: Vec<_> = self
                .schemas
                .iter()
                .zip(items)
                .enumerate()
                .flat_map(|(idx, (node, item))| node.iter_errors(item, &location.push(idx)))
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
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    if ctx.draft() == Draft::Draft202012 {
        let skip = parent
            .get("prefixItems")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        match schema {
            Value::Object(_) | Value::Bool(_) => Some(ItemsValidator::compile(ctx, schema, skip)),
            _ => Some(Err(ValidationError::multiple_type_error(
                Location::new(),
                ctx.location().clone(),
                schema,
                PrimitiveTypes::new()
                    .with(PrimitiveType::Object)
                    .with(PrimitiveType::Boolean),
            ))),
        }
    } else {
        match schema {
            Value::Array(items) => Some(TupleItemsValidator::compile(ctx, items)),
            Value::Object(_) | Value::Bool(_) => Some(ItemsValidator::compile(ctx, schema, 0)),
            _ => Some(Err(ValidationError::multiple_type_error(
                Location::new(),
                ctx.location().clone(),
                schema,
                PrimitiveTypes::new()
                    .with(PrimitiveType::Object)
                    .with(PrimitiveType::Boolean)
                    .with(PrimitiveType::Array),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": {"type": "string"}}), &json!(["a", 1]), "/items/type")]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn items_after_prefix_items() {
        let schema = json!({
            "prefixItems": [{"type": "integer"}],
            "items": {"type": "string"}
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!([1, "a", "b"])));
        assert!(!validator.is_valid(&json!([1, "a", 2])));
        assert!(!validator.is_valid(&json!(["a"])));
    }

    #[test]
    fn tuple_form_in_draft7() {
        let schema = json!({"items": [{"type": "integer"}, {"type": "string"}]});
        let validator = crate::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .expect("Invalid schema");
        assert!(validator.is_valid(&json!([1, "a", null])));
        assert!(!validator.is_valid(&json!(["a", "b"])));
    }
}
