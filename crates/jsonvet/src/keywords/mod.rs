//! Per-keyword emitters and their dispatch table.
pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod boolean;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod prefix_items;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod ref_;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unevaluated_items;
pub(crate) mod unevaluated_properties;
pub(crate) mod unique_items;

use serde_json::{Map, Value};

use crate::{compiler, error::ValidationError, validator::Validate, Draft};

pub(crate) type BoxedValidator = Box<dyn Validate + Send + Sync>;
pub(crate) type CompilationResult<'a> = Result<BoxedValidator, ValidationError<'a>>;

type CompileFunc =
    for<'a> fn(&compiler::Context, &'a Map<String, Value>, &'a Value) -> Option<CompilationResult<'a>>;

/// The order keyword checks execute in within one schema scope.
///
/// Cheap gates come first (`type`, `const`, `enum`), then scalar constraints,
/// then object and array structure, then the composition applicators. The
/// `unevaluated*` pair runs after every applicator so annotations are final,
/// and `format` closes the scope.
pub(crate) const DISPATCH_ORDER: &[&str] = &[
    "$ref",
    "$recursiveRef",
    "$dynamicRef",
    "type",
    "const",
    "enum",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "patternProperties",
    "additionalProperties",
    "prefixItems",
    "items",
    "additionalItems",
    "contains",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "propertyNames",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "unevaluatedProperties",
    "unevaluatedItems",
    "format",
];

/// Select the emitter for a keyword under the given draft, if any.
pub(crate) fn get_for_draft(draft: Draft, keyword: &str) -> Option<CompileFunc> {
    match (draft, keyword) {
        (_, "$ref") => Some(ref_::compile),
        (Draft::Draft201909, "$recursiveRef") => Some(ref_::compile_recursive_ref),
        (Draft::Draft202012, "$dynamicRef") => Some(ref_::compile_dynamic_ref),
        (_, "type") => Some(type_::compile),
        (_, "enum") => Some(enum_::compile),
        (_, "multipleOf") => Some(multiple_of::compile),
        (_, "maximum") => Some(maximum::compile),
        (_, "minimum") => Some(minimum::compile),
        (_, "maxLength") => Some(max_length::compile),
        (_, "minLength") => Some(min_length::compile),
        (_, "pattern") => Some(pattern::compile),
        (_, "maxItems") => Some(max_items::compile),
        (_, "minItems") => Some(min_items::compile),
        (_, "uniqueItems") => Some(unique_items::compile),
        (_, "maxProperties") => Some(max_properties::compile),
        (_, "minProperties") => Some(min_properties::compile),
        (_, "required") => Some(required::compile),
        (_, "properties") => Some(properties::compile),
        (_, "patternProperties") => Some(pattern_properties::compile),
        (_, "additionalProperties") => Some(additional_properties::compile),
        (_, "items") => Some(items::compile),
        (_, "dependencies") => Some(dependencies::compile),
        (_, "allOf") => Some(all_of::compile),
        (_, "anyOf") => Some(any_of::compile),
        (_, "oneOf") => Some(one_of::compile),
        (_, "not") => Some(not::compile),
        (_, "format") => Some(format::compile),
        (Draft::Draft4 | Draft::Draft6 | Draft::Draft7 | Draft::Draft201909, "additionalItems") => {
            Some(additional_items::compile)
        }
        (Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012, "const") => {
            Some(const_::compile)
        }
        (Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012, "contains") => {
            Some(contains::compile)
        }
        (
            Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012,
            "exclusiveMaximum",
        ) => Some(exclusive_maximum::compile),
        (
            Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012,
            "exclusiveMinimum",
        ) => Some(exclusive_minimum::compile),
        (
            Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012,
            "propertyNames",
        ) => Some(property_names::compile),
        (Draft::Draft7 | Draft::Draft201909 | Draft::Draft202012, "if") => Some(if_::compile),
        (Draft::Draft201909 | Draft::Draft202012, "dependentRequired") => {
            Some(dependencies::compile_dependent_required)
        }
        (Draft::Draft201909 | Draft::Draft202012, "dependentSchemas") => {
            Some(dependencies::compile_dependent_schemas)
        }
        (Draft::Draft201909 | Draft::Draft202012, "unevaluatedProperties") => {
            Some(unevaluated_properties::compile)
        }
        (Draft::Draft201909 | Draft::Draft202012, "unevaluatedItems") => {
            Some(unevaluated_items::compile)
        }
        (Draft::Draft202012, "prefixItems") => Some(prefix_items::compile),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    // Keywords from later drafts are plain annotations in earlier ones
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-04/schema#", "const": 1}), &json!(2))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-06/schema#", "if": {"type": "string"}, "then": false}), &json!("x"))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-07/schema#", "unevaluatedProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-07/schema#", "prefixItems": [{"type": "string"}]}), &json!([1]))]
    fn unknown_keywords_are_ignored(schema: &Value, instance: &Value) {
        assert!(crate::is_valid(schema, instance));
    }

    #[test_case(&json!({"minimum": 5}); "scalar")]
    #[test_case(&json!({"items": {"type": "integer"}}); "applicator")]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "string"}}}); "patterns")]
    fn non_matching_types_pass(schema: &Value) {
        // Keyword checks gate on the instance type
        assert!(crate::is_valid(schema, &json!(null)));
    }
}
