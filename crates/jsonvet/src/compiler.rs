//! The compiler driver: walks a schema and lowers every scope into a
//! [`SchemaNode`] by dispatching keyword emitters in a fixed order.
use crate::{
    coercion::Coercer,
    keywords,
    node::SchemaNode,
    options::ValidationOptions,
    paths::{Location, LocationSegment},
    primitive_type::{PrimitiveType, PrimitiveTypes},
    ValidationError, Validator,
};
use ahash::AHashSet;
use referencing::{uri, Draft, Registry, Resolved, Resolver, Resource, ResourceRef, Uri};
use serde_json::Value;
use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc};

pub(crate) const DEFAULT_ROOT_URL: &str = "json-schema:///";

/// Compile-time state threaded through keyword emitters.
///
/// Tracks the schema location of the keyword being compiled and carries the
/// resolver for the current resource, including its dynamic scope.
#[derive(Debug, Clone)]
pub(crate) struct Context<'a> {
    config: Arc<ValidationOptions>,
    pub(crate) registry: Arc<Registry>,
    resolver: Rc<Resolver<'a>>,
    location: Location,
    draft: Draft,
    /// Reference URIs already entered on this compilation path; a repeat
    /// visit means a cycle.
    seen: Rc<RefCell<AHashSet<Uri<String>>>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        config: Arc<ValidationOptions>,
        registry: Arc<Registry>,
        resolver: Rc<Resolver<'a>>,
        draft: Draft,
    ) -> Self {
        Context {
            config,
            registry,
            resolver,
            location: Location::new(),
            draft,
            seen: Rc::new(RefCell::new(AHashSet::new())),
        }
    }

    pub(crate) fn draft(&self) -> Draft {
        self.draft
    }
    pub(crate) fn config(&self) -> &Arc<ValidationOptions> {
        &self.config
    }
    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    #[inline]
    pub(crate) fn new_at_location<'s>(&self, segment: impl Into<LocationSegment<'s>>) -> Self {
        Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::clone(&self.resolver),
            location: self.location.join(segment),
            draft: self.draft,
            seen: Rc::clone(&self.seen),
        }
    }

    /// Enter a subresource: the base URI moves when it declares an id, and
    /// its `$schema` may switch the draft.
    pub(crate) fn in_subresource(
        &'a self,
        resource: ResourceRef,
    ) -> Result<Context<'a>, referencing::Error> {
        let resolver = self.resolver.in_subresource(resource)?;
        Ok(Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::new(resolver),
            location: self.location.clone(),
            draft: resource.draft(),
            seen: Rc::clone(&self.seen),
        })
    }

    pub(crate) fn with_resolver_and_draft(
        &self,
        resolver: Resolver<'a>,
        draft: Draft,
    ) -> Context<'a> {
        Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::new(resolver),
            location: self.location.clone(),
            draft,
            seen: Rc::clone(&self.seen),
        }
    }

    pub(crate) fn as_resource_ref<'r>(&self, contents: &'r Value) -> ResourceRef<'r> {
        self.draft
            .detect(contents)
            .unwrap_or(self.draft)
            .create_resource_ref(contents)
    }

    pub(crate) fn lookup(&self, reference: &str) -> Result<Resolved<'a>, referencing::Error> {
        self.resolver.lookup(reference)
    }
    pub(crate) fn lookup_recursive_reference(&self) -> Result<Resolved<'a>, referencing::Error> {
        self.resolver.lookup_recursive_ref()
    }
    pub(crate) fn scopes(&self) -> VecDeque<Uri<String>> {
        self.resolver.dynamic_scope().cloned().collect()
    }

    pub(crate) fn supports_adjacent_validation(&self) -> bool {
        !matches!(self.draft, Draft::Draft4 | Draft::Draft6 | Draft::Draft7)
    }
    pub(crate) fn validates_formats_by_default(&self) -> bool {
        self.config
            .validate_formats()
            .unwrap_or_else(|| matches!(self.draft, Draft::Draft4 | Draft::Draft6 | Draft::Draft7))
    }

    fn is_circular_reference(&self, reference: &str) -> Result<bool, referencing::Error> {
        let uri = uri::resolve_against(&self.resolver.base_uri(), reference)?;
        Ok(self.seen.borrow().contains(&uri))
    }
    fn mark_seen(&self, reference: &str) -> Result<(), referencing::Error> {
        let uri = uri::resolve_against(&self.resolver.base_uri(), reference)?;
        self.seen.borrow_mut().insert(uri);
        Ok(())
    }

    /// Resolve a reference that may be part of a cycle.
    ///
    /// Returns the captured `(base URI, dynamic scope, resource)` for known
    /// cycles, which the caller turns into a lazily-initialized node. `None`
    /// means the reference is safe to compile inline right now.
    pub(crate) fn lookup_maybe_recursive(
        &self,
        reference: &str,
        is_recursive: bool,
    ) -> Result<Option<(Uri<String>, VecDeque<Uri<String>>, Resource)>, ValidationError<'static>>
    {
        let resolved = if reference == "#" {
            // Either a plain self-reference or `$recursiveAnchor` dispatch
            self.resolver.lookup_recursive_ref()?
        } else if self.is_circular_reference(reference)? {
            self.resolver.lookup(reference)?
        } else {
            if !is_recursive {
                self.mark_seen(reference)?;
            }
            return Ok(None);
        };
        let resource = resolved.draft().create_resource(resolved.contents().clone());
        let mut base_uri = resolved.resolver().base_uri().to_owned();
        let scopes: VecDeque<_> = resolved.resolver().dynamic_scope().cloned().collect();
        if let Some(id) = resource.id() {
            base_uri = uri::resolve_against(&base_uri.borrow(), id)?;
        }
        Ok(Some((base_uri, scopes, resource)))
    }
}

pub(crate) fn build_validator(
    mut config: ValidationOptions,
    schema: &Value,
) -> Result<Validator, ValidationError<'static>> {
    let draft = config.draft_for(schema);
    let resource = draft.create_resource(schema.clone());
    let resource_ref = draft.create_resource_ref(schema);
    let base_uri = resource.id().unwrap_or(DEFAULT_ROOT_URL).to_string();

    // The root plus every caller-supplied remote goes into one registry;
    // anything else a `$ref` may point at is a compile-time error.
    let mut resources = Vec::with_capacity(1 + config.resources.len());
    resources.push((base_uri.clone(), resource));
    for (uri, resource) in config.resources.drain() {
        resources.push((uri, resource));
    }
    let registry = Arc::new(Registry::try_from_resources(resources)?);
    let resolver = Rc::new(registry.try_resolver(&base_uri)?);

    let config = Arc::new(config);
    let ctx = Context::new(Arc::clone(&config), Arc::clone(&registry), resolver, draft);
    let root = compile(&ctx, resource_ref).map_err(ValidationError::into_owned)?;

    let coercer = config.coercion_rules().map(|rules| {
        Coercer::new(
            Arc::clone(&registry),
            schema.clone(),
            base_uri.clone(),
            draft,
            rules,
        )
    });
    Ok(Validator {
        root,
        config,
        coercer,
    })
}

/// Compile a schema resource into a tree node, entering it as a subresource.
pub(crate) fn compile<'a>(
    ctx: &Context,
    resource: ResourceRef<'a>,
) -> Result<SchemaNode, ValidationError<'a>> {
    let ctx = ctx.in_subresource(resource)?;
    compile_with(&ctx, resource)
}

/// Compile a schema resource without re-entering it as a subresource.
pub(crate) fn compile_with<'a>(
    ctx: &Context,
    resource: ResourceRef<'a>,
) -> Result<SchemaNode, ValidationError<'a>> {
    match resource.contents() {
        Value::Bool(true) => Ok(SchemaNode::new(ctx, Vec::new())),
        Value::Bool(false) => {
            let validator = keywords::boolean::FalseValidator::compile(ctx.location().clone())?;
            Ok(SchemaNode::new(ctx, vec![validator]))
        }
        Value::Object(schema) => {
            if let Some(reference) = schema.get("$ref") {
                if !ctx.supports_adjacent_validation() || ctx.config().ignores_ref_siblings() {
                    // Pre-2019-09 semantics: `$ref` replaces its siblings
                    if let Some(validator) = keywords::ref_::compile(ctx, schema, reference) {
                        return Ok(SchemaNode::new(ctx, vec![validator?]));
                    }
                }
            }
            let mut validators = Vec::with_capacity(schema.len());
            for &keyword in keywords::DISPATCH_ORDER {
                if let Some(value) = schema.get(keyword) {
                    if let Some(compile_fn) = keywords::get_for_draft(ctx.draft(), keyword) {
                        if let Some(validator) = compile_fn(ctx, schema, value) {
                            validators.push(validator?);
                        }
                    }
                }
            }
            Ok(SchemaNode::new(ctx, validators))
        }
        contents => Err(ValidationError::multiple_type_error(
            Location::new(),
            ctx.location().clone(),
            contents,
            PrimitiveTypes::new()
                .with(PrimitiveType::Boolean)
                .with(PrimitiveType::Object),
        )),
    }
}
