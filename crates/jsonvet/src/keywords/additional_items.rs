use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use serde_json::{Map, Value};

/// `additionalItems: <schema>`: elements past the tuple prefix validate
/// against it.
pub(crate) struct AdditionalItemsSchemaValidator {
    node: SchemaNode,
    start: usize,
}

impl Validate for AdditionalItemsSchemaValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            items
                .iter()
                .skip(self.start)
                .all(|item| self.node.is_valid(item))
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
            for (idx, item) in items.iter().enumerate().skip(self.start) {
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
                .skip(self.start)
                .flat_map(|(idx, item)| self.node.iter_errors(item, &location.push(idx)))
                .collect();
            Box::new(errors.into_iter())
        } else {
            no_error()
        }
    }
}

/// `additionalItems: false`: the array may not be longer than the tuple.
pub(crate) struct AdditionalItemsFalseValidator {
    limit: usize,
    location: Location,
}

impl Validate for AdditionalItemsFalseValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            items.len() <= self.limit
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
            Err(ValidationError::additional_items(
                self.location.clone(),
                location.into(),
                instance,
                self.limit,
            ))
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    // Only meaningful when `items` is a tuple; otherwise `items` already
    // covers every element
    let start = match parent.get("items") {
        Some(Value::Array(items)) => items.len(),
        _ => return None,
    };
    match schema {
        Value::Bool(false) => Some(Ok(Box::new(AdditionalItemsFalseValidator {
            limit: start,
            location: ctx.location().join("additionalItems"),
        }))),
        Value::Bool(true) => None,
        _ => {
            let kctx = ctx.new_at_location("additionalItems");
            let node = match compiler::compile(&kctx, kctx.as_resource_ref(schema)) {
                Ok(node) => node,
                Err(err) => return Some(Err(err)),
            };
            Some(Ok(Box::new(AdditionalItemsSchemaValidator { node, start })))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn build(schema: &Value) -> crate::Validator {
        crate::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .expect("Invalid schema")
    }

    #[test_case(&json!([1, 2]), true)]
    #[test_case(&json!([1, 2, 3]), false)]
    fn false_form_bounds_length(instance: &Value, expected: bool) {
        let validator = build(&json!({"items": [{}, {}], "additionalItems": false}));
        assert_eq!(validator.is_valid(instance), expected);
    }

    #[test]
    fn schema_form_checks_the_tail() {
        let validator = build(&json!({
            "items": [{"type": "integer"}],
            "additionalItems": {"type": "string"}
        }));
        assert!(validator.is_valid(&json!([1, "a", "b"])));
        assert!(!validator.is_valid(&json!([1, "a", 2])));
    }

    #[test]
    fn ignored_without_tuple_items() {
        let validator = build(&json!({"items": {}, "additionalItems": false}));
        assert!(validator.is_valid(&json!([1, 2, 3])));
    }

    #[test]
    fn message() {
        let validator = build(&json!({"items": [{}], "additionalItems": false}));
        let instance = json!([1, 2]);
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.to_string(), "must NOT have more than 1 items");
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location_with_draft(
            Draft::Draft7,
            &json!({"items": [{}], "additionalItems": false}),
            &json!([1, 2]),
            "/additionalItems",
        );
    }
}
