use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers::map_get_u64, CompilationResult},
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

/// `contains` with the optional `minContains` / `maxContains` window.
///
/// `minContains: 0` with no upper bound disables the keyword, which the
/// emitter handles by not compiling a validator at all.
pub(crate) struct ContainsValidator {
    node: SchemaNode,
    min_contains: u64,
    max_contains: Option<u64>,
    location: Location,
}

impl ContainsValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        schema: &'a Value,
        min_contains: u64,
        max_contains: Option<u64>,
    ) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("contains");
        Ok(Box::new(ContainsValidator {
            node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            min_contains,
            max_contains,
            location: ctx.location().join("contains"),
        }))
    }

    fn matches_in_window(&self, items: &[Value]) -> bool {
        let mut matches = 0;
        for item in items {
            if self.node.is_valid(item) {
                matches += 1;
                match self.max_contains {
                    // Exceeding the upper bound can short-circuit
                    Some(max) if matches > max => return false,
                    // Without an upper bound, reaching the lower one is enough
                    None if matches >= self.min_contains => return true,
                    _ => {}
                }
            }
        }
        matches >= self.min_contains
    }
}

impl Validate for ContainsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            self.matches_in_window(items)
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
            Err(ValidationError::contains(
                self.location.clone(),
                location.into(),
                instance,
                self.min_contains,
                self.max_contains,
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
    let (min_contains, max_contains) = if ctx.draft() >= Draft::Draft201909 {
        let min = match map_get_u64(parent, ctx, "minContains").transpose() {
            Ok(value) => value.unwrap_or(1),
            Err(err) => return Some(Err(err)),
        };
        let max = match map_get_u64(parent, ctx, "maxContains").transpose() {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };
        (min, max)
    } else {
        (1, None)
    };
    if min_contains == 0 && max_contains.is_none() {
        // Trivially satisfied; `contains` still participates in
        // `unevaluatedItems` marking, which is handled over there
        return None;
    }
    Some(ContainsValidator::compile(
        ctx,
        schema,
        min_contains,
        max_contains,
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 5, 3]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 0}), &json!([]); "minContains zero disables the check")]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 2}), &json!([5, 6]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "maxContains": 2}), &json!([5, 6, 1]))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 3, 4]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 2}), &json!([5]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "maxContains": 1}), &json!([5, 6]))]
    #[test_case(&json!({"contains": {"minimum": 5}, "minContains": 0, "maxContains": 1}), &json!([5, 6]))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"contains": {"const": 2}}),
            &json!([]),
            "/contains",
        );
    }
}
