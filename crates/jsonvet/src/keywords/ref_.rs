//! `$ref`, `$recursiveRef` (2019-09) and `$dynamicRef` (2020-12).
//!
//! References compile eagerly into the referring node. Cycles cannot be
//! expressed in an ownership tree, so a reference already on the current
//! compilation path becomes a lazily-initialized node instead: its identity
//! exists immediately, its body is built on first use. Dynamic resolution
//! happens at lookup time through the resolver's captured scope.
use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc};

use crate::{
    compiler,
    error::{ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::LazyLocation,
    validator::Validate,
    ValidationOptions,
};
use ahash::AHashSet;
use once_cell::sync::OnceCell;
use referencing::{uri, Draft, Registry, Resource, Uri};
use serde_json::{Map, Value};

pub(crate) enum RefValidator {
    Default { inner: SchemaNode },
    Lazy(LazyRefValidator),
}

impl RefValidator {
    #[inline]
    fn compile<'a>(
        ctx: &compiler::Context,
        reference: &str,
        is_recursive: bool,
    ) -> CompilationResult<'a> {
        if let Some((base_uri, scopes, resource)) =
            ctx.lookup_maybe_recursive(reference, is_recursive)?
        {
            Ok(Box::new(RefValidator::Lazy(LazyRefValidator {
                resource,
                config: Arc::clone(ctx.config()),
                registry: Arc::clone(&ctx.registry),
                base_uri,
                scopes,
                draft: ctx.draft(),
                inner: OnceCell::default(),
            })))
        } else {
            let (contents, resolver, draft) = ctx.lookup(reference)?.into_inner();
            let resource_ref = draft.create_resource_ref(contents);
            let ctx = ctx.with_resolver_and_draft(resolver, resource_ref.draft());
            let inner =
                compiler::compile_with(&ctx, resource_ref).map_err(ValidationError::into_owned)?;
            Ok(Box::new(RefValidator::Default { inner }))
        }
    }
}

impl Validate for RefValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match self {
            RefValidator::Default { inner } => inner.is_valid(instance),
            RefValidator::Lazy(lazy) => lazy.is_valid(instance),
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        match self {
            RefValidator::Default { inner } => inner.validate(instance, location),
            RefValidator::Lazy(lazy) => lazy.validate(instance, location),
        }
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        match self {
            RefValidator::Default { inner } => inner.iter_errors(instance, location),
            RefValidator::Lazy(lazy) => lazy.iter_errors(instance, location),
        }
    }
}

/// A node whose body is compiled on first use.
///
/// INVARIANT: the captured resource was already compiled successfully once on
/// the path that discovered the cycle, so the deferred compilation cannot
/// fail.
pub(crate) struct LazyRefValidator {
    resource: Resource,
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    base_uri: Uri<String>,
    scopes: VecDeque<Uri<String>>,
    draft: Draft,
    inner: OnceCell<SchemaNode>,
}

impl LazyRefValidator {
    #[inline]
    pub(crate) fn compile<'a>(ctx: &compiler::Context) -> CompilationResult<'a> {
        let scopes = ctx.scopes();
        let resolved = ctx.lookup_recursive_reference()?;
        let resource = resolved.draft().create_resource(resolved.contents().clone());
        let mut base_uri = resolved.resolver().base_uri().to_owned();
        if let Some(id) = resource.id() {
            base_uri = uri::resolve_against(&base_uri.borrow(), id)?;
        }
        Ok(Box::new(LazyRefValidator {
            resource,
            config: Arc::clone(ctx.config()),
            registry: Arc::clone(&ctx.registry),
            base_uri,
            scopes,
            draft: ctx.draft(),
            inner: OnceCell::default(),
        }))
    }

    fn lazy_compile(&self) -> &SchemaNode {
        self.inner.get_or_init(|| {
            let resolver = self
                .registry
                .resolver_from_raw_parts(self.base_uri.clone(), self.scopes.clone());
            let ctx = compiler::Context::new(
                Arc::clone(&self.config),
                Arc::clone(&self.registry),
                Rc::new(resolver),
                self.draft,
            );
            compiler::compile(&ctx, self.resource.as_ref()).expect("Invalid schema")
        })
    }
}

impl Validate for LazyRefValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.lazy_compile().is_valid(instance)
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        self.lazy_compile().validate(instance, location)
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        self.lazy_compile().iter_errors(instance, location)
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    // Non-string values are not references at all
    let reference = schema.as_str()?;
    let is_recursive = parent
        .get("$recursiveAnchor")
        .and_then(Value::as_bool)
        .unwrap_or_default();
    Some(RefValidator::compile(ctx, reference, is_recursive))
}

#[inline]
pub(crate) fn compile_recursive_ref<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    schema.as_str()?;
    Some(LazyRefValidator::compile(ctx))
}

#[inline]
pub(crate) fn compile_dynamic_ref<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    // The dynamic-anchor walk happens inside the resolver; by the time the
    // lookup returns, the scope has been consulted
    let reference = schema.as_str()?;
    Some(RefValidator::compile(ctx, reference, false))
}

/// Expand a reference for compile-time mirrors (the unevaluated trackers):
/// resolves the target and hands back its contents plus an evolved context.
pub(crate) fn resolve_for_tracking<'a>(
    ctx: &'a compiler::Context<'a>,
    keyword: &str,
    reference: &str,
) -> Option<(&'a Value, compiler::Context<'a>)> {
    let resolved = if keyword == "$recursiveRef" {
        ctx.lookup_recursive_reference().ok()?
    } else {
        ctx.lookup(reference).ok()?
    };
    let (contents, resolver, draft) = resolved.into_inner();
    let tctx = ctx.with_resolver_and_draft(resolver, draft);
    Some((contents, tctx))
}

/// Guard for cyclic reference expansion inside trackers.
#[derive(Debug, Default)]
pub(crate) struct ExpansionGuard(RefCell<AHashSet<String>>);

impl ExpansionGuard {
    pub(crate) fn enter(&self, ctx: &compiler::Context, reference: &str) -> Option<String> {
        let key = format!("{}#{}", ctx.location(), reference);
        if self.0.borrow_mut().insert(key.clone()) {
            Some(key)
        } else {
            None
        }
    }
    pub(crate) fn leave(&self, key: String) {
        self.0.borrow_mut().remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({
            "properties": {"foo": {"$ref": "#/$defs/foo"}},
            "$defs": {"foo": {"type": "string"}}
        }),
        &json!({"foo": 42}),
        "/properties/foo/type"
    )]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn recursive_list() {
        let schema = json!({
            "$defs": {
                "node": {
                    "type": "object",
                    "properties": {"next": {"$ref": "#/$defs/node"}}
                }
            },
            "$ref": "#/$defs/node"
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!({"next": {"next": {}}})));
        assert!(!validator.is_valid(&json!({"next": {"next": 3}})));
    }

    #[test]
    fn mutually_recursive() {
        let schema = json!({
            "$defs": {
                "even": {"anyOf": [{"const": 0}, {"properties": {"n": {"$ref": "#/$defs/odd"}}}]},
                "odd": {"anyOf": [{"const": 1}, {"properties": {"n": {"$ref": "#/$defs/even"}}}]}
            },
            "$ref": "#/$defs/even"
        });
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        assert!(validator.is_valid(&json!({"n": {"n": 0}})));
    }

    #[test]
    fn unresolvable_reference_fails_compilation() {
        let schema = json!({"$ref": "http://example.com/nowhere.json"});
        let error = crate::validator_for(&schema).expect_err("Should fail");
        assert_eq!(error.keyword(), "$ref");
    }

    #[test]
    fn ref_siblings_are_ignored_in_draft7() {
        let schema = json!({
            "definitions": {"any": {}},
            "properties": {
                "x": {"$ref": "#/definitions/any", "type": "string"}
            }
        });
        let validator = crate::options()
            .with_draft(crate::Draft::Draft7)
            .build(&schema)
            .expect("Invalid schema");
        // The sibling `type` is an annotation under pre-2019-09 semantics
        assert!(validator.is_valid(&json!({"x": 42})));
    }

    #[test]
    fn legacy_ref_opt_in_on_modern_drafts() {
        let schema = json!({
            "$defs": {"any": true},
            "properties": {
                "x": {"$ref": "#/$defs/any", "type": "string"}
            }
        });
        let strict = crate::validator_for(&schema).expect("Invalid schema");
        assert!(!strict.is_valid(&json!({"x": 42})));
        let legacy = crate::options()
            .should_ignore_ref_siblings(true)
            .build(&schema)
            .expect("Invalid schema");
        assert!(legacy.is_valid(&json!({"x": 42})));
    }
}
