//! Configuration for building validators.
use crate::{coercion::CoercionRules, compiler, formats::Format, ValidationError, Validator};
use ahash::AHashMap;
use referencing::{Draft, Resource};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// Configuration for JSON Schema validation.
///
/// ```rust
/// use jsonvet::Draft;
/// use serde_json::json;
///
/// let validator = jsonvet::options()
///     .with_draft(Draft::Draft7)
///     .build(&json!({"type": "string"}))
///     .expect("Invalid schema");
/// assert!(validator.is_valid(&json!("abc")));
/// ```
#[derive(Clone)]
pub struct ValidationOptions {
    pub(crate) draft: Option<Draft>,
    /// Additional resources addressable by `$ref` during compilation.
    pub(crate) resources: AHashMap<String, Resource>,
    formats: AHashMap<String, Arc<dyn Format>>,
    validate_formats: Option<bool>,
    ignore_unknown_formats: bool,
    ignore_ref_siblings: bool,
    coercion: Option<CoercionRules>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            draft: None,
            resources: AHashMap::default(),
            formats: AHashMap::default(),
            validate_formats: None,
            ignore_unknown_formats: true,
            ignore_ref_siblings: false,
            coercion: None,
        }
    }
}

impl ValidationOptions {
    pub(crate) fn draft(&self) -> Draft {
        self.draft.unwrap_or_default()
    }
    pub(crate) fn draft_for(&self, contents: &Value) -> Draft {
        // Explicit option first, then `$schema` detection, then the newest
        // supported draft
        if let Some(draft) = self.draft {
            draft
        } else {
            Draft::default().detect(contents).unwrap_or_default()
        }
    }

    /// Build a validator for `schema` using these options.
    ///
    /// # Errors
    ///
    /// Fails on malformed schemas and unresolvable references.
    pub fn build(&self, schema: &Value) -> Result<Validator, ValidationError<'static>> {
        compiler::build_validator(self.clone(), schema)
    }

    /// Pin the JSON Schema draft, overriding `$schema` detection.
    #[inline]
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.draft = Some(draft);
        self
    }

    /// Make an additional resource available to `$ref` resolution.
    ///
    /// ```rust
    /// use jsonvet::Resource;
    /// use serde_json::json;
    ///
    /// let remote = Resource::from_contents(json!({"type": "string"}))
    ///     .expect("Unknown dialect");
    /// let validator = jsonvet::options()
    ///     .with_resource("http://example.com/string.json", remote)
    ///     .build(&json!({"$ref": "http://example.com/string.json"}))
    ///     .expect("Invalid schema");
    /// assert!(validator.is_valid(&json!("abc")));
    /// ```
    pub fn with_resource(&mut self, uri: impl Into<String>, resource: Resource) -> &mut Self {
        self.resources.insert(uri.into(), resource);
        self
    }

    /// Force `format` to be asserted (or not), overriding the draft default.
    ///
    /// Drafts 4, 6 and 7 assert formats by default; 2019-09 and 2020-12 treat
    /// them as annotations.
    pub fn should_validate_formats(&mut self, yes: bool) -> &mut Self {
        self.validate_formats = Some(yes);
        self
    }
    pub(crate) fn validate_formats(&self) -> Option<bool> {
        self.validate_formats
    }

    /// Register a custom format validator.
    ///
    /// ```rust
    /// use serde_json::json;
    ///
    /// let validator = jsonvet::options()
    ///     .with_format("even-length", |value| value.len() % 2 == 0)
    ///     .should_validate_formats(true)
    ///     .build(&json!({"format": "even-length"}))
    ///     .expect("Invalid schema");
    /// assert!(validator.is_valid(&json!("ab")));
    /// assert!(!validator.is_valid(&json!("abc")));
    /// ```
    pub fn with_format<F>(&mut self, name: impl Into<String>, format: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }
    pub(crate) fn get_format(&self, name: &str) -> Option<(&String, &Arc<dyn Format>)> {
        self.formats.get_key_value(name)
    }

    /// Whether unknown formats pass silently (the default) or fail
    /// compilation.
    pub fn should_ignore_unknown_formats(&mut self, yes: bool) -> &mut Self {
        self.ignore_unknown_formats = yes;
        self
    }
    pub(crate) fn unknown_formats_ignored(&self) -> bool {
        self.ignore_unknown_formats
    }

    /// Apply pre-2019-09 `$ref` semantics on every draft: keywords adjacent
    /// to `$ref` are ignored.
    pub fn should_ignore_ref_siblings(&mut self, yes: bool) -> &mut Self {
        self.ignore_ref_siblings = yes;
        self
    }
    pub(crate) fn ignores_ref_siblings(&self) -> bool {
        self.ignore_ref_siblings
    }

    /// Enable the coercion pass with the given per-type rules.
    ///
    /// ```rust
    /// use jsonvet::CoercionRules;
    /// use serde_json::json;
    ///
    /// let validator = jsonvet::options()
    ///     .with_coercion(CoercionRules::all())
    ///     .build(&json!({"type": "integer"}))
    ///     .expect("Invalid schema");
    /// let mut instance = json!("42");
    /// assert!(validator.coerce(&mut instance));
    /// assert_eq!(instance, json!(42));
    /// ```
    pub fn with_coercion(&mut self, rules: CoercionRules) -> &mut Self {
        self.coercion = Some(rules);
        self
    }
    pub(crate) fn coercion_rules(&self) -> Option<CoercionRules> {
        self.coercion
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("draft", &self.draft)
            .field("validate_formats", &self.validate_formats)
            .field("ignore_unknown_formats", &self.ignore_unknown_formats)
            .field("ignore_ref_siblings", &self.ignore_ref_siblings)
            .field("coercion", &self.coercion)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use referencing::Draft;
    use serde_json::json;

    #[test]
    fn explicit_draft_wins_over_detection() {
        let schema = json!({"$schema": "http://json-schema.org/draft-07/schema#"});
        let validator = crate::options()
            .with_draft(Draft::Draft4)
            .build(&schema)
            .expect("Invalid schema");
        assert_eq!(validator.draft(), Draft::Draft4);
    }

    #[test]
    fn detection_falls_back_to_newest() {
        let validator = crate::validator_for(&json!({})).expect("Invalid schema");
        assert_eq!(validator.draft(), Draft::Draft202012);
    }
}
