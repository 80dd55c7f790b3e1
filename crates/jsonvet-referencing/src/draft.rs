use serde_json::Value;

use crate::{
    anchors,
    resource::{Segment, Segments},
    Anchor, Error, Resolver, Resource, ResourceRef,
};

/// JSON Schema specification versions.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum Draft {
    /// JSON Schema Draft 4
    Draft4,
    /// JSON Schema Draft 6
    Draft6,
    /// JSON Schema Draft 7
    Draft7,
    /// JSON Schema Draft 2019-09
    Draft201909,
    /// JSON Schema Draft 2020-12
    #[default]
    Draft202012,
}

/// Where sub-schemas live within a schema object, per draft.
struct Subresources {
    /// Keywords whose value is a schema.
    in_value: &'static [&'static str],
    /// Keywords whose value is a map of schemas.
    in_subvalues: &'static [&'static str],
    /// Keywords whose value is an array of schemas.
    in_subarray: &'static [&'static str],
    /// `items` may be either a schema or an array of schemas.
    tuple_items: bool,
    /// `dependencies` mixes schemas with property-name arrays.
    legacy_dependencies: bool,
}

static DRAFT4: Subresources = Subresources {
    in_value: &["additionalItems", "additionalProperties", "not"],
    in_subvalues: &["definitions", "patternProperties", "properties"],
    in_subarray: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
    legacy_dependencies: true,
};

static DRAFT6: Subresources = Subresources {
    in_value: &[
        "additionalItems",
        "additionalProperties",
        "contains",
        "not",
        "propertyNames",
    ],
    in_subvalues: &["definitions", "patternProperties", "properties"],
    in_subarray: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
    legacy_dependencies: true,
};

static DRAFT7: Subresources = Subresources {
    in_value: &[
        "additionalItems",
        "additionalProperties",
        "contains",
        "else",
        "if",
        "not",
        "propertyNames",
        "then",
    ],
    in_subvalues: &["definitions", "patternProperties", "properties"],
    in_subarray: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
    legacy_dependencies: true,
};

static DRAFT201909: Subresources = Subresources {
    in_value: &[
        "additionalItems",
        "additionalProperties",
        "contains",
        "else",
        "if",
        "not",
        "propertyNames",
        "then",
        "unevaluatedItems",
        "unevaluatedProperties",
    ],
    in_subvalues: &[
        "$defs",
        "definitions",
        "dependentSchemas",
        "patternProperties",
        "properties",
    ],
    in_subarray: &["allOf", "anyOf", "oneOf"],
    tuple_items: true,
    legacy_dependencies: true,
};

static DRAFT202012: Subresources = Subresources {
    in_value: &[
        "additionalProperties",
        "contains",
        "contentSchema",
        "else",
        "if",
        "items",
        "not",
        "propertyNames",
        "then",
        "unevaluatedItems",
        "unevaluatedProperties",
    ],
    in_subvalues: &[
        "$defs",
        "definitions",
        "dependentSchemas",
        "patternProperties",
        "properties",
    ],
    in_subarray: &["allOf", "anyOf", "oneOf", "prefixItems"],
    tuple_items: false,
    legacy_dependencies: false,
};

impl Draft {
    #[must_use]
    pub fn create_resource(self, contents: Value) -> Resource {
        Resource::new(contents, self)
    }
    #[must_use]
    pub fn create_resource_ref(self, contents: &Value) -> ResourceRef<'_> {
        ResourceRef::new(contents, self)
    }
    /// Detect the specification that applies to the given contents.
    ///
    /// # Errors
    ///
    /// On unknown `$schema` values returns [`Error::UnknownSpecification`].
    pub fn detect(self, contents: &Value) -> Result<Draft, Error> {
        if let Some(schema) = contents
            .as_object()
            .and_then(|contents| contents.get("$schema"))
            .and_then(Value::as_str)
        {
            Ok(match schema.trim_end_matches('#') {
                "https://json-schema.org/draft/2020-12/schema" => Draft::Draft202012,
                "https://json-schema.org/draft/2019-09/schema" => Draft::Draft201909,
                "http://json-schema.org/draft-07/schema" => Draft::Draft7,
                "http://json-schema.org/draft-06/schema" => Draft::Draft6,
                "http://json-schema.org/draft-04/schema" => Draft::Draft4,
                value => return Err(Error::unknown_specification(value)),
            })
        } else {
            Ok(self)
        }
    }
    pub(crate) fn id_of(self, contents: &Value) -> Option<&str> {
        let key = if self == Draft::Draft4 { "id" } else { "$id" };
        contents
            .as_object()
            .and_then(|schema| schema.get(key))
            .and_then(Value::as_str)
            // Fragment-only identifiers are anchors in drafts 4-7
            .filter(|id| !id.starts_with('#'))
    }

    fn subresource_keywords(self) -> &'static Subresources {
        match self {
            Draft::Draft4 => &DRAFT4,
            Draft::Draft6 => &DRAFT6,
            Draft::Draft7 => &DRAFT7,
            Draft::Draft201909 => &DRAFT201909,
            Draft::Draft202012 => &DRAFT202012,
        }
    }

    /// Iterate over the immediate sub-schemas of a schema object.
    pub(crate) fn subresources_of<'a>(
        self,
        contents: &'a Value,
    ) -> Box<dyn Iterator<Item = &'a Value> + 'a> {
        let Some(schema) = contents.as_object() else {
            return Box::new(std::iter::empty());
        };
        let keywords = self.subresource_keywords();
        let in_value = keywords
            .in_value
            .iter()
            .filter_map(|keyword| schema.get(*keyword));
        let in_subvalues = keywords
            .in_subvalues
            .iter()
            .filter_map(|keyword| schema.get(*keyword).and_then(Value::as_object))
            .flat_map(serde_json::Map::values);
        let in_subarray = keywords
            .in_subarray
            .iter()
            .filter_map(|keyword| schema.get(*keyword).and_then(Value::as_array))
            .flatten();
        let mut extra = Vec::new();
        if keywords.tuple_items {
            match schema.get("items") {
                Some(Value::Array(items)) => extra.extend(items),
                Some(items) => extra.push(items),
                None => {}
            }
        }
        if keywords.legacy_dependencies {
            if let Some(Value::Object(dependencies)) = schema.get("dependencies") {
                // Array-valued entries are property-name lists, not schemas
                extra.extend(dependencies.values().filter(|value| !value.is_array()));
            }
        }
        Box::new(
            in_value
                .chain(in_subvalues)
                .chain(in_subarray)
                .chain(extra),
        )
    }

    pub(crate) fn anchors<'a>(self, contents: &'a Value) -> Vec<Anchor> {
        anchors::anchors_of(self, contents)
    }

    /// Decide whether resolving a pointer segment entered a subresource with
    /// its own base URI.
    pub(crate) fn maybe_in_subresource<'r>(
        self,
        segments: &Segments,
        resolver: &Resolver<'r>,
        subresource: ResourceRef<'r>,
    ) -> Result<Resolver<'r>, Error> {
        let keywords = self.subresource_keywords();
        let mut iter = segments.iter();
        while let Some(segment) = iter.next() {
            if let Segment::Key(key) = segment {
                let key = key.as_ref();
                if (keywords.tuple_items && key == "items"
                    || keywords.legacy_dependencies && key == "dependencies")
                    && subresource.contents().is_object()
                {
                    return resolver.in_subresource(subresource);
                }
                let in_child = keywords.in_subvalues.contains(&key)
                    || keywords.in_subarray.contains(&key);
                // Container keywords are followed by a child-name segment,
                // which is consumed together with them
                if !keywords.in_value.contains(&key) && (!in_child || iter.next().is_none()) {
                    return Ok(resolver.clone());
                }
            }
        }
        resolver.in_subresource(subresource)
    }

    /// Is `keyword` part of this draft's vocabulary?
    #[must_use]
    pub fn is_known_keyword(self, keyword: &str) -> bool {
        match keyword {
            "$ref"
            | "$schema"
            | "additionalItems"
            | "additionalProperties"
            | "allOf"
            | "anyOf"
            | "dependencies"
            | "enum"
            | "exclusiveMaximum"
            | "exclusiveMinimum"
            | "format"
            | "items"
            | "maxItems"
            | "maxLength"
            | "maxProperties"
            | "maximum"
            | "minItems"
            | "minLength"
            | "minProperties"
            | "minimum"
            | "multipleOf"
            | "not"
            | "oneOf"
            | "pattern"
            | "patternProperties"
            | "properties"
            | "required"
            | "type"
            | "uniqueItems" => true,
            "id" if self == Draft::Draft4 => true,
            "$id" | "const" | "contains" | "propertyNames" if self >= Draft::Draft6 => true,
            "else" | "if" | "then" if self >= Draft::Draft7 => true,
            "$anchor"
            | "$defs"
            | "$recursiveAnchor"
            | "$recursiveRef"
            | "dependentRequired"
            | "dependentSchemas"
            | "maxContains"
            | "minContains"
            | "unevaluatedItems"
            | "unevaluatedProperties"
                if self >= Draft::Draft201909 =>
            {
                true
            }
            "$dynamicAnchor" | "$dynamicRef" | "prefixItems" if self == Draft::Draft202012 => true,
            _ => false,
        }
    }
}
