//! `unevaluatedProperties`.
//!
//! The emitter builds a compile-time mirror of the sibling keywords - which
//! names `properties` covers, which patterns `patternProperties` covers,
//! whether `additionalProperties` swallows the rest - plus recursively built
//! mirrors for every in-place applicator. At runtime the mirror marks the
//! object's members in a bitset; marks flow up only from branches that
//! succeed, and whatever stays unmarked is checked against the keyword's own
//! subschema.
use crate::{
    compiler, ecma,
    error::ValidationError,
    keywords::{
        ref_::{resolve_for_tracking, ExpansionGuard},
        CompilationResult,
    },
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
};
use ahash::AHashSet;
use fancy_regex::Regex;
use serde_json::{Map, Value};

pub(crate) struct UnevaluatedPropertiesValidator {
    unevaluated: SchemaNode,
    filter: PropertiesFilter,
    location: Location,
}

impl UnevaluatedPropertiesValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        parent: &'a Map<String, Value>,
        schema: &'a Value,
    ) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("unevaluatedProperties");
        Ok(Box::new(UnevaluatedPropertiesValidator {
            unevaluated: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            filter: PropertiesFilter::new(ctx, parent, true, &ExpansionGuard::default())?,
            location: ctx.location().join("unevaluatedProperties"),
        }))
    }
}

impl Validate for UnevaluatedPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            let mut evaluated = vec![false; item.len()];
            self.filter.mark(item, instance, &mut evaluated);
            for ((_, value), evaluated) in item.iter().zip(evaluated) {
                if !evaluated && !self.unevaluated.is_valid(value) {
                    return false;
                }
            }
        }
        true
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Object(item) = instance {
            let mut evaluated = vec![false; item.len()];
            self.filter.mark(item, instance, &mut evaluated);
            let unexpected: Vec<String> = item
                .iter()
                .zip(evaluated)
                .filter(|((_, value), evaluated)| !evaluated && !self.unevaluated.is_valid(value))
                .map(|((key, _), _)| key.clone())
                .collect();
            if !unexpected.is_empty() {
                return Err(ValidationError::unevaluated_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ));
            }
        }
        Ok(())
    }
}

/// The compile-time mirror of one schema scope.
struct PropertiesFilter {
    /// Everything counts as evaluated: `additionalProperties` present, or a
    /// nested `unevaluatedProperties` that swallowed the remainder.
    all: bool,
    properties: AHashSet<String>,
    patterns: Vec<Regex>,
    referenced: Vec<PropertiesFilter>,
    conditional: Option<Box<ConditionalFilter>>,
    dependent: Vec<(String, SchemaNode, PropertiesFilter)>,
    all_of: Vec<(SchemaNode, PropertiesFilter)>,
    any_of: Vec<(SchemaNode, PropertiesFilter)>,
    one_of: Vec<(SchemaNode, PropertiesFilter)>,
}

struct ConditionalFilter {
    condition: SchemaNode,
    if_: Option<PropertiesFilter>,
    then_: Option<PropertiesFilter>,
    else_: Option<PropertiesFilter>,
}

impl PropertiesFilter {
    fn empty() -> PropertiesFilter {
        PropertiesFilter {
            all: false,
            properties: AHashSet::new(),
            patterns: Vec::new(),
            referenced: Vec::new(),
            conditional: None,
            dependent: Vec::new(),
            all_of: Vec::new(),
            any_of: Vec::new(),
            one_of: Vec::new(),
        }
    }

    fn new(
        ctx: &compiler::Context,
        parent: &Map<String, Value>,
        is_checking_scope: bool,
        guard: &ExpansionGuard,
    ) -> Result<PropertiesFilter, ValidationError<'static>> {
        let mut filter = PropertiesFilter::empty();

        if parent.contains_key("additionalProperties")
            || (!is_checking_scope && parent.contains_key("unevaluatedProperties"))
        {
            filter.all = true;
        }
        if let Some(Value::Object(properties)) = parent.get("properties") {
            filter.properties = properties.keys().cloned().collect();
        }
        if let Some(Value::Object(patterns)) = parent.get("patternProperties") {
            for pattern in patterns.keys() {
                if let Ok(Ok(regex)) = ecma::to_rust_regex(pattern).map(|p| Regex::new(&p)) {
                    filter.patterns.push(regex);
                }
            }
        }

        for keyword in ["$ref", "$recursiveRef", "$dynamicRef"] {
            if let Some(Value::String(reference)) = parent.get(keyword) {
                // Cyclic tails degrade to marking nothing
                if let Some(key) = guard.enter(ctx, reference) {
                    if let Some((contents, tctx)) = resolve_for_tracking(ctx, keyword, reference) {
                        if let Some(target) = contents.as_object() {
                            filter
                                .referenced
                                .push(PropertiesFilter::new(&tctx, target, false, guard)?);
                        }
                    }
                    guard.leave(key);
                }
            }
        }

        if let Some(condition) = parent.get("if") {
            let node = compiler::compile(ctx, ctx.as_resource_ref(condition))
                .map_err(ValidationError::into_owned)?;
            filter.conditional = Some(Box::new(ConditionalFilter {
                condition: node,
                if_: Self::subfilter(ctx, condition, guard)?,
                then_: match parent.get("then") {
                    Some(subschema) => Self::subfilter(ctx, subschema, guard)?,
                    None => None,
                },
                else_: match parent.get("else") {
                    Some(subschema) => Self::subfilter(ctx, subschema, guard)?,
                    None => None,
                },
            }));
        }

        if let Some(Value::Object(dependent)) = parent.get("dependentSchemas") {
            for (trigger, subschema) in dependent {
                let node = compiler::compile(ctx, ctx.as_resource_ref(subschema))
                    .map_err(ValidationError::into_owned)?;
                let branch = Self::subfilter(ctx, subschema, guard)?.unwrap_or_else(Self::empty);
                filter.dependent.push((trigger.clone(), node, branch));
            }
        }

        filter.all_of = Self::branches(ctx, parent.get("allOf"), guard)?;
        filter.any_of = Self::branches(ctx, parent.get("anyOf"), guard)?;
        filter.one_of = Self::branches(ctx, parent.get("oneOf"), guard)?;

        Ok(filter)
    }

    fn subfilter(
        ctx: &compiler::Context,
        subschema: &Value,
        guard: &ExpansionGuard,
    ) -> Result<Option<PropertiesFilter>, ValidationError<'static>> {
        match subschema.as_object() {
            Some(map) => {
                let bctx = ctx.in_subresource(ctx.as_resource_ref(subschema))?;
                Ok(Some(PropertiesFilter::new(&bctx, map, false, guard)?))
            }
            None => Ok(None),
        }
    }

    fn branches(
        ctx: &compiler::Context,
        subschemas: Option<&Value>,
        guard: &ExpansionGuard,
    ) -> Result<Vec<(SchemaNode, PropertiesFilter)>, ValidationError<'static>> {
        let Some(Value::Array(subschemas)) = subschemas else {
            return Ok(Vec::new());
        };
        let mut branches = Vec::with_capacity(subschemas.len());
        for subschema in subschemas {
            let node = compiler::compile(ctx, ctx.as_resource_ref(subschema))
                .map_err(ValidationError::into_owned)?;
            let branch = Self::subfilter(ctx, subschema, guard)?.unwrap_or_else(Self::empty);
            branches.push((node, branch));
        }
        Ok(branches)
    }

    /// Mark the members this scope evaluates, gated on branch outcomes.
    fn mark(&self, item: &Map<String, Value>, instance: &Value, evaluated: &mut [bool]) {
        if self.all {
            for entry in evaluated.iter_mut() {
                *entry = true;
            }
            return;
        }
        if !self.properties.is_empty() || !self.patterns.is_empty() {
            for (idx, (key, _)) in item.iter().enumerate() {
                if evaluated[idx] {
                    continue;
                }
                if self.properties.contains(key)
                    || self
                        .patterns
                        .iter()
                        .any(|regex| regex.is_match(key).unwrap_or(false))
                {
                    evaluated[idx] = true;
                }
            }
        }
        for referenced in &self.referenced {
            referenced.mark(item, instance, evaluated);
        }
        if let Some(conditional) = &self.conditional {
            if conditional.condition.is_valid(instance) {
                if let Some(branch) = &conditional.if_ {
                    branch.mark(item, instance, evaluated);
                }
                if let Some(branch) = &conditional.then_ {
                    branch.mark(item, instance, evaluated);
                }
            } else if let Some(branch) = &conditional.else_ {
                branch.mark(item, instance, evaluated);
            }
        }
        for (trigger, node, branch) in &self.dependent {
            if item.contains_key(trigger) && node.is_valid(instance) {
                branch.mark(item, instance, evaluated);
            }
        }
        for (node, branch) in self.all_of.iter().chain(&self.any_of) {
            if node.is_valid(instance) {
                branch.mark(item, instance, evaluated);
            }
        }
        let mut valid_one_of = self
            .one_of
            .iter()
            .filter(|(node, _)| node.is_valid(instance));
        if let (Some((_, branch)), None) = (valid_one_of.next(), valid_one_of.next()) {
            branch.mark(item, instance, evaluated);
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match schema.as_bool() {
        // `true` accepts whatever is left over - nothing to check
        Some(true) => None,
        _ => Some(UnevaluatedPropertiesValidator::compile(ctx, parent, schema)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({"properties": {"a": {"type": "integer"}}, "unevaluatedProperties": false}),
        &json!({"a": 1})
    )]
    #[test_case(
        &json!({
            "allOf": [{"properties": {"a": true}}],
            "unevaluatedProperties": false
        }),
        &json!({"a": 1}); "marks flow out of allOf"
    )]
    #[test_case(
        &json!({
            "anyOf": [
                {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
                {"properties": {"b": {"type": "integer"}}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        }),
        &json!({"a": 1}); "only the passing anyOf branch marks"
    )]
    #[test_case(
        &json!({
            "if": {"required": ["a"]},
            "then": {"properties": {"a": true, "b": true}},
            "unevaluatedProperties": false
        }),
        &json!({"a": 1, "b": 2}); "then branch marks"
    )]
    #[test_case(
        &json!({
            "$ref": "#/$defs/base",
            "$defs": {"base": {"properties": {"a": true}}},
            "unevaluatedProperties": false
        }),
        &json!({"a": 1}); "marks flow through references"
    )]
    #[test_case(
        &json!({"patternProperties": {"^x": true}, "unevaluatedProperties": false}),
        &json!({"x1": 1, "x2": 2})
    )]
    #[test_case(
        &json!({"unevaluatedProperties": {"type": "integer"}}),
        &json!({"anything": 3}); "schema form validates leftovers"
    )]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"properties": {"a": {"type": "integer"}}, "unevaluatedProperties": false}),
        &json!({"a": 1, "b": 2})
    )]
    #[test_case(
        &json!({
            "anyOf": [
                {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
                {"properties": {"b": {"type": "integer"}}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        }),
        &json!({"a": 1, "b": "x"}); "failing branch does not mark"
    )]
    #[test_case(
        &json!({
            "if": {"required": ["a"]},
            "then": {"properties": {"a": true, "b": true}},
            "unevaluatedProperties": false
        }),
        &json!({"b": 2}); "untaken branch does not mark"
    )]
    #[test_case(
        &json!({"unevaluatedProperties": {"type": "integer"}}),
        &json!({"anything": "x"})
    )]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_lists_the_offenders() {
        let schema = json!({"properties": {"a": true}, "unevaluatedProperties": false});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let error = validator
            .validate(&json!({"a": 1, "b": 2}))
            .expect_err("Should fail");
        assert_eq!(error.keyword(), "unevaluatedProperties");
        assert_eq!(error.to_string(), "must NOT have unevaluated properties");
        match &error.kind {
            crate::ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                assert_eq!(unexpected, &["b"]);
            }
            kind => panic!("Unexpected kind: {kind:?}"),
        }
    }

    #[test]
    fn nested_unevaluated_swallows_for_the_outer_scope() {
        let schema = json!({
            "allOf": [{"unevaluatedProperties": true}],
            "unevaluatedProperties": false
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!({"a": 1})));
    }

    #[test]
    fn recursive_reference_does_not_hang_compilation() {
        let schema = json!({
            "$defs": {
                "node": {
                    "$ref": "#/$defs/node"
                }
            },
            "$ref": "#/$defs/node",
            "unevaluatedProperties": false
        });
        // Compilation must terminate; the cyclic tail simply marks nothing
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(!validator.is_valid(&json!({"a": 1})));
    }
}
