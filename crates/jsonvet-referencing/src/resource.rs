use std::borrow::Cow;

use serde_json::Value;

use crate::{Anchor, Draft, Error, Resolved, Resolver};

/// A schema document with a concrete interpretation under a JSON Schema draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    contents: Value,
    draft: Draft,
}

impl Resource {
    pub(crate) fn new(contents: Value, draft: Draft) -> Self {
        Self { contents, draft }
    }
    /// Create a resource, detecting the draft from `$schema` when present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSpecification`] for unknown `$schema` values.
    pub fn from_contents(contents: Value) -> Result<Resource, Error> {
        Self::from_contents_and_draft(contents, Draft::default())
    }

    pub(crate) fn from_contents_and_draft(contents: Value, draft: Draft) -> Result<Resource, Error> {
        Ok(draft.detect(&contents)?.create_resource(contents))
    }

    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
    /// Resource identifier, if it declares one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.as_ref().id()
    }
    #[must_use]
    pub fn as_ref(&self) -> ResourceRef<'_> {
        ResourceRef::new(&self.contents, self.draft)
    }

    pub(crate) fn subresources(&self) -> impl Iterator<Item = Result<Resource, Error>> + '_ {
        self.draft
            .subresources_of(&self.contents)
            .map(|contents| Resource::from_contents_and_draft(contents.clone(), self.draft))
    }

    pub(crate) fn anchors(&self) -> Vec<Anchor> {
        self.draft.anchors(&self.contents)
    }

    /// Resolve a JSON Pointer fragment (starting with `/`) within this
    /// resource, evolving the resolver when the pointer crosses `$id`
    /// boundaries.
    pub(crate) fn pointer<'r>(
        &'r self,
        pointer: &str,
        mut resolver: Resolver<'r>,
    ) -> Result<Resolved<'r>, Error> {
        let mut contents = &self.contents;
        let mut segments = Segments::new();
        let decoded = percent_encoding::percent_decode_str(&pointer[1..])
            .decode_utf8()
            .map_err(|err| Error::invalid_percent_encoding(pointer, err))?;
        for segment in decoded.split('/') {
            if let Some(array) = contents.as_array() {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_array_index(pointer, segment))?;
                contents = array
                    .get(index)
                    .ok_or_else(|| Error::pointer_to_nowhere(pointer))?;
                segments.push(Segment::Index(index));
            } else {
                let key = unescape_segment(segment);
                contents = contents
                    .get(key.as_ref())
                    .ok_or_else(|| Error::pointer_to_nowhere(pointer))?;
                segments.push(Segment::Key(key));
            }
            let next = self.draft.maybe_in_subresource(
                &segments,
                &resolver,
                self.draft.create_resource_ref(contents),
            )?;
            if next != resolver {
                segments = Segments::new();
            }
            resolver = next;
        }
        Ok(Resolved::new(contents, resolver, self.draft))
    }
}

/// A borrowed schema document plus the draft it is interpreted under.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResourceRef<'a> {
    contents: &'a Value,
    draft: Draft,
}

impl<'a> ResourceRef<'a> {
    #[must_use]
    pub fn new(contents: &'a Value, draft: Draft) -> Self {
        ResourceRef { contents, draft }
    }
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.draft
            .id_of(self.contents)
            .map(|id| id.trim_end_matches('#'))
    }
    #[must_use]
    pub fn contents(&self) -> &'a Value {
        self.contents
    }
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
}

/// The path walked so far during pointer resolution.
pub(crate) struct Segments<'a>(Vec<Segment<'a>>);

#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum Segment<'a> {
    Key(Cow<'a, str>),
    Index(usize),
}

impl<'a> Segments<'a> {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
    pub(crate) fn push(&mut self, segment: Segment<'a>) {
        self.0.push(segment);
    }
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Segment<'a>> {
        self.0.iter()
    }
}

/// Undo JSON Pointer escaping: `~1` is `/` and `~0` is `~`.
fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('~') {
        return Cow::Borrowed(segment);
    }
    let mut buffer = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => buffer.push('~'),
                Some('1') => buffer.push('/'),
                Some(other) => {
                    buffer.push('~');
                    buffer.push(other);
                }
                None => buffer.push('~'),
            }
        } else {
            buffer.push(ch);
        }
    }
    Cow::Owned(buffer)
}

#[cfg(test)]
mod tests {
    use super::unescape_segment;
    use crate::{Draft, Registry};
    use serde_json::json;
    use test_case::test_case;

    #[test_case("plain", "plain")]
    #[test_case("a~0b", "a~b")]
    #[test_case("a~1b", "a/b")]
    #[test_case("~01", "~1")]
    #[test_case("~", "~")]
    #[test_case("~2", "~2")]
    #[test_case("", "")]
    fn unescape(input: &str, expected: &str) {
        assert_eq!(unescape_segment(input), expected);
    }

    #[test]
    fn pointer_into_tuple_items() {
        let resource = Draft::Draft7.create_resource(json!({
            "items": [{"type": "number"}, {"type": "boolean"}]
        }));
        let registry = Registry::try_from_resources([("http://example.com".to_string(), resource)])
            .expect("Invalid resources");
        let resolver = registry
            .try_resolver("http://example.com")
            .expect("Invalid base URI");
        let resolved = resolver.lookup("#/items/1").expect("Lookup failed");
        assert_eq!(resolved.contents(), &json!({"type": "boolean"}));
    }

    #[test]
    fn pointer_to_nowhere() {
        let resource = Draft::Draft202012.create_resource(json!({"properties": {"a": true}}));
        let registry = Registry::try_from_resources([("http://example.com".to_string(), resource)])
            .expect("Invalid resources");
        let resolver = registry
            .try_resolver("http://example.com")
            .expect("Invalid base URI");
        let error = resolver.lookup("#/properties/b").expect_err("Should fail");
        assert_eq!(error.to_string(), "Pointer '/properties/b' does not exist");
    }
}
