//! JSON Pointers for instance and schema locations.
//!
//! All pointer output goes through this module; property names are escaped
//! (`~` as `~0`, `/` as `~1`) in exactly one place.
use std::{fmt, sync::Arc};

/// A materialized JSON Pointer.
///
/// Cheap to clone; keyword validators store the schema location they were
/// compiled at and clone it into errors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location(Arc<str>);

impl Location {
    /// The root location (an empty pointer).
    #[must_use]
    pub fn new() -> Self {
        Location(Arc::from(""))
    }
    /// Extend this pointer with one more segment.
    pub(crate) fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let segment = segment.into();
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        write_segment(&mut buffer, segment);
        Location(buffer.into())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// A single step within a pointer: a property name or an array index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    Property(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a String) -> Self {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

fn write_segment(buffer: &mut String, segment: LocationSegment<'_>) {
    buffer.push('/');
    match segment {
        LocationSegment::Property(property) => {
            for ch in property.chars() {
                match ch {
                    '~' => buffer.push_str("~0"),
                    '/' => buffer.push_str("~1"),
                    _ => buffer.push(ch),
                }
            }
        }
        LocationSegment::Index(index) => buffer.push_str(itoa::Buffer::new().format(index)),
    }
}

/// An instance location built up during validation without allocation.
///
/// Nodes form a linked list on the stack; a [`Location`] is materialized only
/// when an error is actually reported.
#[derive(Debug, Clone)]
pub struct LazyLocation<'a, 'b> {
    pub(crate) segment: LocationSegment<'a>,
    pub(crate) parent: Option<&'b LazyLocation<'b, 'a>>,
}

impl Default for LazyLocation<'_, '_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a, 'b> LazyLocation<'a, 'b> {
    /// The root of an instance document.
    #[must_use]
    pub const fn new() -> Self {
        LazyLocation {
            // Never materialized - the root has no segment
            segment: LocationSegment::Index(0),
            parent: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> Self {
        LazyLocation {
            segment: segment.into(),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_, '_>> for Location {
    fn from(location: &LazyLocation<'_, '_>) -> Self {
        let mut segments = Vec::with_capacity(8);
        let mut head = location;
        while let Some(parent) = head.parent {
            segments.push(head.segment);
            head = parent;
        }
        let mut buffer = String::with_capacity(segments.len() * 8);
        for segment in segments.into_iter().rev() {
            write_segment(&mut buffer, segment);
        }
        Location(buffer.into())
    }
}

impl From<LazyLocation<'_, '_>> for Location {
    #[inline]
    fn from(location: LazyLocation<'_, '_>) -> Self {
        Location::from(&location)
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyLocation, Location};
    use serde_json::json;

    #[test]
    fn segments_are_escaped() {
        let location = Location::new().join("a/b").join("c~d").join(3);
        assert_eq!(location.as_str(), "/a~1b/c~0d/3");
        let data = json!({"a/b": {"c~d": [0, 0, 0, 42]}});
        assert_eq!(data.pointer(location.as_str()), Some(&json!(42)));
    }

    #[test]
    fn lazy_location_materializes_in_order() {
        let root = LazyLocation::new();
        let one = root.push("outer");
        let two = one.push(1);
        let three = two.push("inner");
        assert_eq!(Location::from(&three).as_str(), "/outer/1/inner");
        assert_eq!(Location::from(&root).as_str(), "");
    }
}
