use std::{collections::VecDeque, sync::Arc};

use ahash::AHashMap;
use fluent_uri::Uri;

use crate::{uri, Anchor, Error, Resolver, Resource};

type ResourceMap = AHashMap<Uri<String>, Arc<Resource>>;
type AnchorMap = AHashMap<(Uri<String>, String), Anchor>;

/// A registry of JSON Schema resources keyed by their canonical URIs.
///
/// All supplied resources are processed eagerly: subresources carrying their
/// own identifiers become addressable under their resolved URIs, and every
/// anchor is recorded under the base URI of the resource declaring it.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    resources: ResourceMap,
    anchors: AnchorMap,
}

impl Registry {
    /// Create a registry from `(URI, resource)` pairs.
    ///
    /// # Errors
    ///
    /// Fails when a URI or a declared `$id` is invalid, or when a resource
    /// declares an unknown `$schema`.
    pub fn try_from_resources(
        pairs: impl IntoIterator<Item = (String, Resource)>,
    ) -> Result<Self, Error> {
        let mut resources = ResourceMap::new();
        let mut anchors = AnchorMap::new();
        let mut queue = VecDeque::with_capacity(16);
        for (uri, resource) in pairs {
            let uri = uri::from_str(uri.trim_end_matches('#'))?;
            let resource = Arc::new(resource);
            resources.insert(uri.clone(), Arc::clone(&resource));
            queue.push_back((uri, resource));
        }
        while let Some((mut base, resource)) = queue.pop_front() {
            if let Some(id) = resource.id() {
                base = uri::resolve_against(&base.borrow(), id)?;
            }
            for anchor in resource.anchors() {
                anchors.insert((base.clone(), anchor.name.clone()), anchor);
            }
            for subresource in resource.subresources() {
                queue.push_back((base.clone(), Arc::new(subresource?)));
            }
            if resource.id().is_some() {
                resources.insert(base, resource);
            }
        }
        Ok(Registry { resources, anchors })
    }

    /// Create a [`Resolver`] rooted at the given base URI.
    ///
    /// # Errors
    ///
    /// Fails when the base URI is invalid.
    pub fn try_resolver(&self, base_uri: &str) -> Result<Resolver, Error> {
        Ok(self.resolver(uri::from_str(base_uri)?))
    }
    #[must_use]
    pub fn resolver(&self, base_uri: Uri<String>) -> Resolver {
        Resolver::new(self, base_uri)
    }
    /// Rebuild a resolver from a previously captured base URI and scope.
    #[must_use]
    pub fn resolver_from_raw_parts(
        &self,
        base_uri: Uri<String>,
        scopes: VecDeque<Uri<String>>,
    ) -> Resolver {
        Resolver::from_parts(self, base_uri, scopes)
    }

    pub(crate) fn get(&self, uri: &Uri<String>) -> Result<&Resource, Error> {
        match self.resources.get(uri) {
            Some(resource) => Ok(resource),
            None => Err(Error::unretrievable(uri.as_str())),
        }
    }

    pub(crate) fn anchor(&self, uri: &Uri<String>, name: &str) -> Result<&Anchor, Error> {
        if let Some(anchor) = self.anchors.get(&(uri.clone(), name.to_string())) {
            return Ok(anchor);
        }
        if name.contains('/') {
            Err(Error::invalid_anchor(name))
        } else {
            Err(Error::no_such_anchor(name))
        }
    }
}
