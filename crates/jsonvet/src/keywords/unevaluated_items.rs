//! `unevaluatedItems`, the array analog of `unevaluatedProperties`.
//!
//! Indexes are marked through a prefix high-water mark (`prefixItems` /
//! tuple-form `items`), an everything-evaluated flag (schema-form `items`,
//! `additionalItems`), out-of-order marks from `contains`, and branch-gated
//! marks from the in-place applicators.
use crate::{
    compiler,
    error::ValidationError,
    keywords::{
        ref_::{resolve_for_tracking, ExpansionGuard},
        CompilationResult,
    },
    node::SchemaNode,
    paths::{LazyLocation, Location},
    validator::Validate,
    Draft,
};
use serde_json::{Map, Value};

pub(crate) struct UnevaluatedItemsValidator {
    unevaluated: SchemaNode,
    filter: ItemsFilter,
    location: Location,
}

impl UnevaluatedItemsValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        parent: &'a Map<String, Value>,
        schema: &'a Value,
    ) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location("unevaluatedItems");
        Ok(Box::new(UnevaluatedItemsValidator {
            unevaluated: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
            filter: ItemsFilter::new(ctx, parent, true, &ExpansionGuard::default())?,
            location: ctx.location().join("unevaluatedItems"),
        }))
    }
}

impl Validate for UnevaluatedItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            let mut evaluated = vec![false; items.len()];
            self.filter.mark(items, instance, &mut evaluated);
            for (item, evaluated) in items.iter().zip(evaluated) {
                if !evaluated && !self.unevaluated.is_valid(item) {
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
        if let Value::Array(items) = instance {
            let mut evaluated = vec![false; items.len()];
            self.filter.mark(items, instance, &mut evaluated);
            let unexpected: Vec<usize> = items
                .iter()
                .zip(evaluated)
                .enumerate()
                .filter(|(_, (item, evaluated))| !evaluated && !self.unevaluated.is_valid(item))
                .map(|(idx, _)| idx)
                .collect();
            if !unexpected.is_empty() {
                return Err(ValidationError::unevaluated_items(
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

struct ItemsFilter {
    /// Every element counts as evaluated.
    all: bool,
    /// Elements below this index count as evaluated.
    prefix: usize,
    contains: Option<SchemaNode>,
    referenced: Vec<ItemsFilter>,
    conditional: Option<Box<ConditionalFilter>>,
    all_of: Vec<(SchemaNode, ItemsFilter)>,
    any_of: Vec<(SchemaNode, ItemsFilter)>,
    one_of: Vec<(SchemaNode, ItemsFilter)>,
}

struct ConditionalFilter {
    condition: SchemaNode,
    if_: Option<ItemsFilter>,
    then_: Option<ItemsFilter>,
    else_: Option<ItemsFilter>,
}

impl ItemsFilter {
    fn empty() -> ItemsFilter {
        ItemsFilter {
            all: false,
            prefix: 0,
            contains: None,
            referenced: Vec::new(),
            conditional: None,
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
    ) -> Result<ItemsFilter, ValidationError<'static>> {
        let mut filter = ItemsFilter::empty();

        if !is_checking_scope && parent.contains_key("unevaluatedItems") {
            filter.all = true;
        }
        match ctx.draft() {
            Draft::Draft202012 => {
                if parent.contains_key("items") {
                    filter.all = true;
                }
                if let Some(Value::Array(prefix)) = parent.get("prefixItems") {
                    filter.prefix = prefix.len();
                }
            }
            _ => match parent.get("items") {
                Some(Value::Array(prefix)) => {
                    if parent.contains_key("additionalItems") {
                        filter.all = true;
                    } else {
                        filter.prefix = prefix.len();
                    }
                }
                Some(_) => filter.all = true,
                None => {}
            },
        }
        if let Some(subschema) = parent.get("contains") {
            filter.contains = Some(
                compiler::compile(ctx, ctx.as_resource_ref(subschema))
                    .map_err(ValidationError::into_owned)?,
            );
        }

        for keyword in ["$ref", "$recursiveRef", "$dynamicRef"] {
            if let Some(Value::String(reference)) = parent.get(keyword) {
                if let Some(key) = guard.enter(ctx, reference) {
                    if let Some((contents, tctx)) = resolve_for_tracking(ctx, keyword, reference) {
                        if let Some(target) = contents.as_object() {
                            filter
                                .referenced
                                .push(ItemsFilter::new(&tctx, target, false, guard)?);
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

        filter.all_of = Self::branches(ctx, parent.get("allOf"), guard)?;
        filter.any_of = Self::branches(ctx, parent.get("anyOf"), guard)?;
        filter.one_of = Self::branches(ctx, parent.get("oneOf"), guard)?;

        Ok(filter)
    }

    fn subfilter(
        ctx: &compiler::Context,
        subschema: &Value,
        guard: &ExpansionGuard,
    ) -> Result<Option<ItemsFilter>, ValidationError<'static>> {
        match subschema.as_object() {
            Some(map) => {
                let bctx = ctx.in_subresource(ctx.as_resource_ref(subschema))?;
                Ok(Some(ItemsFilter::new(&bctx, map, false, guard)?))
            }
            None => Ok(None),
        }
    }

    fn branches(
        ctx: &compiler::Context,
        subschemas: Option<&Value>,
        guard: &ExpansionGuard,
    ) -> Result<Vec<(SchemaNode, ItemsFilter)>, ValidationError<'static>> {
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

    fn mark(&self, items: &[Value], instance: &Value, evaluated: &mut [bool]) {
        if self.all {
            for entry in evaluated.iter_mut() {
                *entry = true;
            }
            return;
        }
        for entry in evaluated.iter_mut().take(self.prefix) {
            *entry = true;
        }
        if let Some(contains) = &self.contains {
            // `contains` marks exactly the matching elements
            for (item, entry) in items.iter().zip(evaluated.iter_mut()) {
                if !*entry && contains.is_valid(item) {
                    *entry = true;
                }
            }
        }
        for referenced in &self.referenced {
            referenced.mark(items, instance, evaluated);
        }
        if let Some(conditional) = &self.conditional {
            if conditional.condition.is_valid(instance) {
                if let Some(branch) = &conditional.if_ {
                    branch.mark(items, instance, evaluated);
                }
                if let Some(branch) = &conditional.then_ {
                    branch.mark(items, instance, evaluated);
                }
            } else if let Some(branch) = &conditional.else_ {
                branch.mark(items, instance, evaluated);
            }
        }
        for (node, branch) in self.all_of.iter().chain(&self.any_of) {
            if node.is_valid(instance) {
                branch.mark(items, instance, evaluated);
            }
        }
        let mut valid_one_of = self
            .one_of
            .iter()
            .filter(|(node, _)| node.is_valid(instance));
        if let (Some((_, branch)), None) = (valid_one_of.next(), valid_one_of.next()) {
            branch.mark(items, instance, evaluated);
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
        Some(true) => None,
        _ => Some(UnevaluatedItemsValidator::compile(ctx, parent, schema)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({"prefixItems": [{"type": "integer"}], "unevaluatedItems": false}),
        &json!([1])
    )]
    #[test_case(
        &json!({"items": {"type": "integer"}, "unevaluatedItems": false}),
        &json!([1, 2, 3]); "schema-form items evaluates everything"
    )]
    #[test_case(
        &json!({"contains": {"type": "string"}, "unevaluatedItems": {"type": "integer"}}),
        &json!(["a", 1, "b"]); "contains marks its matches"
    )]
    #[test_case(
        &json!({
            "allOf": [{"prefixItems": [true, true]}],
            "unevaluatedItems": false
        }),
        &json!([1, 2]); "prefix flows out of allOf"
    )]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"prefixItems": [{"type": "integer"}], "unevaluatedItems": false}),
        &json!([1, 2])
    )]
    #[test_case(
        &json!({"contains": {"type": "string"}, "unevaluatedItems": {"type": "integer"}}),
        &json!(["a", null])
    )]
    #[test_case(
        &json!({
            "if": {"prefixItems": [{"const": "ok"}]},
            "then": {"prefixItems": [true, true]},
            "unevaluatedItems": false
        }),
        &json!(["nope", "x"]); "untaken conditional branch does not mark"
    )]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_reports_indexes() {
        let schema = json!({"prefixItems": [true], "unevaluatedItems": false});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let error = validator
            .validate(&json!([1, 2, 3]))
            .expect_err("Should fail");
        assert_eq!(error.keyword(), "unevaluatedItems");
        match &error.kind {
            crate::ValidationErrorKind::UnevaluatedItems { unexpected } => {
                assert_eq!(unexpected, &[1, 2]);
            }
            kind => panic!("Unexpected kind: {kind:?}"),
        }
    }

    #[test]
    fn draft_2019_tuple_items_set_the_prefix() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "items": [{"type": "integer"}],
            "unevaluatedItems": false
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!([1])));
        assert!(!validator.is_valid(&json!([1, 2])));
    }
}
