use fluent_uri::{Uri, UriRef};
use once_cell::sync::Lazy;

use crate::Error;

/// The synthetic root used for schemas that do not declare an absolute `$id`.
pub(crate) static DEFAULT_ROOT_URI: Lazy<Uri<String>> =
    Lazy::new(|| Uri::parse("json-schema:///".to_string()).expect("Invalid URI"));

/// Resolve a URI reference against an absolute base per RFC 3986.
pub fn resolve_against(base: &Uri<&str>, reference: &str) -> Result<Uri<String>, Error> {
    Ok(UriRef::parse(reference)
        .map_err(|err| Error::invalid_uri(reference, err))?
        .resolve_against(base)
        .map_err(|err| Error::invalid_uri(reference, err))?
        .normalize())
}

/// Parse a string into an absolute, normalized URI.
///
/// Relative references are grounded at the synthetic `json-schema:///` root so
/// that every registered resource has a well-defined base URI.
pub fn from_str(input: &str) -> Result<Uri<String>, Error> {
    let reference = UriRef::parse(input)
        .map_err(|err| Error::invalid_uri(input, err))?
        .normalize();
    if reference.has_scheme() {
        Uri::try_from(reference.as_str())
            .map(|uri| uri.into())
            .map_err(|err| Error::invalid_uri(input, err))
    } else {
        reference
            .resolve_against(&DEFAULT_ROOT_URI.borrow())
            .map_err(|err| Error::invalid_uri(input, err))
    }
}
