use core::fmt;
use std::str::Utf8Error;

/// Errors raised while registering resources or resolving references.
#[derive(Debug)]
pub enum Error {
    /// The referenced document is not present in the registry.
    Unretrievable { uri: String },
    /// A JSON Pointer leads to a location that does not exist.
    PointerToNowhere { pointer: String },
    /// A JSON Pointer contains invalid percent-encoded data.
    InvalidPercentEncoding { pointer: String, source: Utf8Error },
    /// An array index inside a JSON Pointer is not a number.
    InvalidArrayIndex { pointer: String, index: String },
    /// The anchor is not registered within the target resource.
    NoSuchAnchor { anchor: String },
    /// The anchor could never exist (e.g. contains `/`).
    InvalidAnchor { anchor: String },
    /// A URI or URI reference failed to parse or resolve.
    InvalidUri { uri: String, message: String },
    /// `$schema` points to an unknown JSON Schema dialect.
    UnknownSpecification { specification: String },
}

impl Error {
    pub(crate) fn unretrievable(uri: impl Into<String>) -> Error {
        Error::Unretrievable { uri: uri.into() }
    }
    pub(crate) fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }
    pub(crate) fn invalid_percent_encoding(pointer: impl Into<String>, source: Utf8Error) -> Error {
        Error::InvalidPercentEncoding {
            pointer: pointer.into(),
            source,
        }
    }
    pub(crate) fn invalid_array_index(
        pointer: impl Into<String>,
        index: impl Into<String>,
    ) -> Error {
        Error::InvalidArrayIndex {
            pointer: pointer.into(),
            index: index.into(),
        }
    }
    pub(crate) fn no_such_anchor(anchor: impl Into<String>) -> Error {
        Error::NoSuchAnchor {
            anchor: anchor.into(),
        }
    }
    pub(crate) fn invalid_anchor(anchor: impl Into<String>) -> Error {
        Error::InvalidAnchor {
            anchor: anchor.into(),
        }
    }
    pub(crate) fn invalid_uri(uri: impl Into<String>, message: impl fmt::Display) -> Error {
        Error::InvalidUri {
            uri: uri.into(),
            message: message.to_string(),
        }
    }
    pub(crate) fn unknown_specification(specification: impl Into<String>) -> Error {
        Error::UnknownSpecification {
            specification: specification.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unretrievable { uri } => {
                write!(f, "Resource '{uri}' is not present in the registry")
            }
            Error::PointerToNowhere { pointer } => {
                write!(f, "Pointer '{pointer}' does not exist")
            }
            Error::InvalidPercentEncoding { pointer, .. } => {
                write!(f, "Invalid percent encoding in pointer '{pointer}'")
            }
            Error::InvalidArrayIndex { pointer, index } => {
                write!(f, "Invalid array index '{index}' in pointer '{pointer}'")
            }
            Error::NoSuchAnchor { anchor } => write!(f, "Anchor '{anchor}' does not exist"),
            Error::InvalidAnchor { anchor } => write!(f, "Anchor '{anchor}' is invalid"),
            Error::InvalidUri { uri, message } => write!(f, "Invalid URI '{uri}': {message}"),
            Error::UnknownSpecification { specification } => {
                write!(f, "Unknown specification: {specification}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPercentEncoding { source, .. } => Some(source),
            _ => None,
        }
    }
}
