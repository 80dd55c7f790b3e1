use core::fmt;
use std::collections::VecDeque;

use fluent_uri::Uri;
use serde_json::Value;

use crate::{uri, Draft, Error, Registry, ResourceRef};

/// Resolves references against a base URI and looks the result up in a
/// [`Registry`].
///
/// A resolver also carries the dynamic scope: the chain of resources entered
/// so far, which `$dynamicRef` and `$recursiveRef` consult at lookup time.
#[derive(Clone)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    base_uri: Uri<String>,
    scopes: VecDeque<Uri<String>>,
}

impl PartialEq for Resolver<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base_uri == other.base_uri
    }
}
impl Eq for Resolver<'_> {}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("base_uri", &self.base_uri.as_str())
            .finish_non_exhaustive()
    }
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry, base_uri: Uri<String>) -> Self {
        Self {
            registry,
            base_uri,
            scopes: VecDeque::new(),
        }
    }
    pub(crate) fn from_parts(
        registry: &'r Registry,
        base_uri: Uri<String>,
        scopes: VecDeque<Uri<String>>,
    ) -> Self {
        Self {
            registry,
            base_uri,
            scopes,
        }
    }
    #[must_use]
    pub fn base_uri(&self) -> Uri<&str> {
        self.base_uri.borrow()
    }
    pub(crate) fn registry(&self) -> &'r Registry {
        self.registry
    }
    /// The dynamic scope, newest entry first.
    pub fn dynamic_scope(&self) -> impl Iterator<Item = &Uri<String>> {
        self.scopes.iter()
    }

    /// Resolve a reference to the resource it points to.
    ///
    /// # Errors
    ///
    /// Fails when the reference is syntactically invalid, points into a
    /// document absent from the registry, or addresses a location or anchor
    /// that does not exist.
    pub fn lookup(&self, reference: &str) -> Result<Resolved<'r>, Error> {
        let (uri, fragment) = if let Some(fragment) = reference.strip_prefix('#') {
            (self.base_uri.clone(), fragment)
        } else {
            let (base, fragment) = reference.rsplit_once('#').unwrap_or((reference, ""));
            (uri::resolve_against(&self.base_uri.borrow(), base)?, fragment)
        };

        let resource = self.registry.get(&uri)?;

        if fragment.starts_with('/') {
            let resolver = self.evolve(uri);
            return resource.pointer(fragment, resolver);
        }

        if !fragment.is_empty() {
            let anchor = self.registry.anchor(&uri, fragment)?;
            let resolver = self.evolve(uri);
            return anchor.resolve(resolver);
        }

        let resolver = self.evolve(uri);
        Ok(Resolved::new(
            resource.contents(),
            resolver,
            resource.draft(),
        ))
    }

    /// Resolve `$recursiveRef: "#"` (draft 2019-09).
    ///
    /// Starts at the innermost resource and follows the dynamic scope outward
    /// while every resource on the way declares `$recursiveAnchor: true`.
    ///
    /// # Errors
    ///
    /// Any error that [`Resolver::lookup`] can return.
    pub fn lookup_recursive_ref(&self) -> Result<Resolved<'r>, Error> {
        let mut resolved = self.lookup("#")?;
        if has_recursive_anchor(resolved.contents) {
            for uri in self.dynamic_scope() {
                let next = self.lookup(uri.as_str())?;
                if !has_recursive_anchor(next.contents) {
                    break;
                }
                resolved = next;
            }
        }
        Ok(resolved)
    }

    /// Create a resolver for a subresource, rebasing when it declares an id.
    ///
    /// # Errors
    ///
    /// Fails when the subresource id does not resolve against the current
    /// base URI.
    pub fn in_subresource(&self, subresource: ResourceRef) -> Result<Self, Error> {
        if let Some(id) = subresource.id() {
            let base_uri = uri::resolve_against(&self.base_uri.borrow(), id)?;
            Ok(self.evolve(base_uri))
        } else {
            Ok(self.clone())
        }
    }

    fn evolve(&self, base_uri: Uri<String>) -> Resolver<'r> {
        if self.scopes.is_empty() || base_uri != self.base_uri {
            let mut scopes = self.scopes.clone();
            scopes.push_front(self.base_uri.clone());
            Resolver {
                registry: self.registry,
                base_uri,
                scopes,
            }
        } else {
            Resolver {
                registry: self.registry,
                base_uri,
                scopes: self.scopes.clone(),
            }
        }
    }
}

fn has_recursive_anchor(contents: &Value) -> bool {
    contents
        .as_object()
        .and_then(|schema| schema.get("$recursiveAnchor"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// A reference resolved to its contents by a [`Resolver`].
#[derive(Debug)]
pub struct Resolved<'r> {
    contents: &'r Value,
    resolver: Resolver<'r>,
    draft: Draft,
}

impl<'r> Resolved<'r> {
    pub(crate) fn new(contents: &'r Value, resolver: Resolver<'r>, draft: Draft) -> Self {
        Self {
            contents,
            resolver,
            draft,
        }
    }
    #[must_use]
    pub fn contents(&self) -> &'r Value {
        self.contents
    }
    #[must_use]
    pub fn resolver(&self) -> &Resolver<'r> {
        &self.resolver
    }
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
    #[must_use]
    pub fn into_inner(self) -> (&'r Value, Resolver<'r>, Draft) {
        (self.contents, self.resolver, self.draft)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Draft, Registry};
    use serde_json::json;

    fn registry() -> Registry {
        let root = Draft::Draft202012.create_resource(json!({
            "$id": "http://example.com/root",
            "$defs": {
                "node": {
                    "$anchor": "node",
                    "type": "object"
                },
                "nested": {
                    "$id": "nested",
                    "properties": {"leaf": {"type": "null"}}
                }
            }
        }));
        Registry::try_from_resources([("http://example.com/root".to_string(), root)])
            .expect("Invalid resources")
    }

    #[test]
    fn lookup_by_anchor() {
        let registry = registry();
        let resolver = registry
            .try_resolver("http://example.com/root")
            .expect("Invalid base URI");
        let resolved = resolver.lookup("#node").expect("Lookup failed");
        assert_eq!(
            resolved.contents(),
            &json!({"$anchor": "node", "type": "object"})
        );
    }

    #[test]
    fn embedded_resource_is_addressable_by_its_own_id() {
        let registry = registry();
        let resolver = registry
            .try_resolver("http://example.com/root")
            .expect("Invalid base URI");
        let resolved = resolver
            .lookup("nested#/properties/leaf")
            .expect("Lookup failed");
        assert_eq!(resolved.contents(), &json!({"type": "null"}));
    }

    #[test]
    fn missing_document_is_an_error() {
        let registry = registry();
        let resolver = registry
            .try_resolver("http://example.com/root")
            .expect("Invalid base URI");
        let error = resolver
            .lookup("http://example.com/absent")
            .expect_err("Should fail");
        assert_eq!(
            error.to_string(),
            "Resource 'http://example.com/absent' is not present in the registry"
        );
    }
}
