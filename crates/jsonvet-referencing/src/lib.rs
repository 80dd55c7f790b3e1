//! JSON reference resolution for the `jsonvet` schema compiler.
//!
//! A registry eagerly indexes schema resources by their canonical URIs and
//! anchors; resolvers then answer `$ref` / `$dynamicRef` lookups against a
//! base URI and a dynamic scope.
mod anchors;
mod draft;
mod error;
mod registry;
mod resolver;
mod resource;
pub mod uri;

pub(crate) use anchors::{Anchor, AnchorKind};
pub use draft::Draft;
pub use error::Error;
pub use registry::Registry;
pub use resolver::{Resolved, Resolver};
pub use resource::{Resource, ResourceRef};

pub type Uri<T> = fluent_uri::Uri<T>;
pub type UriRef<T> = fluent_uri::UriRef<T>;
pub type Iri<T> = fluent_uri::Iri<T>;
pub type IriRef<T> = fluent_uri::IriRef<T>;
