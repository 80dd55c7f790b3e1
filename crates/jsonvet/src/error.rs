//! Validation error types.
//!
//! Every keyword mismatch is reported as a [`ValidationError`] carrying the
//! instance path, the schema path, and a typed [`ValidationErrorKind`] with
//! the keyword's parameters. The `Display` implementation renders a stable,
//! human-readable message; programmatic decisions should match on the kind.
use crate::{
    paths::Location,
    primitive_type::{PrimitiveType, PrimitiveTypes},
};
use serde_json::Value;
use std::{
    borrow::Cow,
    fmt,
    iter::{empty, once},
};

/// An error produced by a keyword check during validation, or a failure
/// detected while compiling the schema itself.
#[derive(Debug)]
pub struct ValidationError<'a> {
    /// Value that failed validation.
    pub instance: Cow<'a, Value>,
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// JSON Pointer to the value that failed validation.
    pub instance_path: Location,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: Location,
}

/// A boxed iterator over validation errors, used by the collect-all mode.
pub type ErrorIterator<'a> = Box<dyn Iterator<Item = ValidationError<'a>> + Send + Sync + 'a>;

pub(crate) fn no_error<'a>() -> ErrorIterator<'a> {
    Box::new(empty())
}
pub(crate) fn error(err: ValidationError<'_>) -> ErrorIterator<'_> {
    Box::new(once(err))
}

/// Kinds of validation failures, each carrying its keyword parameters.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    AdditionalItems { limit: usize },
    AdditionalProperties { unexpected: Vec<String> },
    AnyOf,
    BacktrackLimitExceeded { error: fancy_regex::Error },
    Constant { expected: Value },
    Contains { min_contains: u64, max_contains: Option<u64> },
    DependentRequired { trigger: String, missing: String },
    Enum { options: Value },
    ExclusiveMaximum { limit: Value },
    ExclusiveMinimum { limit: Value },
    FalseSchema,
    Format { format: String },
    MaxItems { limit: u64 },
    Maximum { limit: Value },
    MaxLength { limit: u64 },
    MaxProperties { limit: u64 },
    MinItems { limit: u64 },
    Minimum { limit: Value },
    MinLength { limit: u64 },
    MinProperties { limit: u64 },
    MultipleOf { multiple_of: f64 },
    Not { schema: Value },
    OneOfMultipleValid,
    OneOfNotValid,
    Pattern { pattern: String },
    PropertyNames { error: Box<ValidationError<'static>> },
    Referencing(referencing::Error),
    Required { property: String },
    Type { kind: TypeKind },
    UnevaluatedItems { unexpected: Vec<usize> },
    UnevaluatedProperties { unexpected: Vec<String> },
    UniqueItems,
}

/// Expected type(s) for [`ValidationErrorKind::Type`].
#[derive(Debug)]
#[allow(missing_docs)]
pub enum TypeKind {
    Single(PrimitiveType),
    Multiple(PrimitiveTypes),
}

impl<'a> ValidationError<'a> {
    fn new(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        kind: ValidationErrorKind,
    ) -> ValidationError<'a> {
        ValidationError {
            instance: Cow::Borrowed(instance),
            kind,
            instance_path,
            schema_path,
        }
    }

    /// Detach the error from the instance it borrows.
    #[must_use]
    pub fn into_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            instance_path: self.instance_path,
            schema_path: self.schema_path,
        }
    }

    /// The name of the keyword that produced this error.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match &self.kind {
            ValidationErrorKind::AdditionalItems { .. } => "additionalItems",
            ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
            ValidationErrorKind::AnyOf => "anyOf",
            ValidationErrorKind::BacktrackLimitExceeded { .. }
            | ValidationErrorKind::Pattern { .. } => "pattern",
            ValidationErrorKind::Constant { .. } => "const",
            ValidationErrorKind::Contains { .. } => "contains",
            ValidationErrorKind::DependentRequired { .. } => "dependentRequired",
            ValidationErrorKind::Enum { .. } => "enum",
            ValidationErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ValidationErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ValidationErrorKind::FalseSchema => "falseSchema",
            ValidationErrorKind::Format { .. } => "format",
            ValidationErrorKind::MaxItems { .. } => "maxItems",
            ValidationErrorKind::Maximum { .. } => "maximum",
            ValidationErrorKind::MaxLength { .. } => "maxLength",
            ValidationErrorKind::MaxProperties { .. } => "maxProperties",
            ValidationErrorKind::MinItems { .. } => "minItems",
            ValidationErrorKind::Minimum { .. } => "minimum",
            ValidationErrorKind::MinLength { .. } => "minLength",
            ValidationErrorKind::MinProperties { .. } => "minProperties",
            ValidationErrorKind::MultipleOf { .. } => "multipleOf",
            ValidationErrorKind::Not { .. } => "not",
            ValidationErrorKind::OneOfMultipleValid | ValidationErrorKind::OneOfNotValid => "oneOf",
            ValidationErrorKind::PropertyNames { .. } => "propertyNames",
            ValidationErrorKind::Referencing(_) => "$ref",
            ValidationErrorKind::Required { .. } => "required",
            ValidationErrorKind::Type { .. } => "type",
            ValidationErrorKind::UnevaluatedItems { .. } => "unevaluatedItems",
            ValidationErrorKind::UnevaluatedProperties { .. } => "unevaluatedProperties",
            ValidationErrorKind::UniqueItems => "uniqueItems",
        }
    }

    pub(crate) fn additional_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: usize,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::AdditionalItems { limit },
        )
    }
    pub(crate) fn additional_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        unexpected: Vec<String>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::AdditionalProperties { unexpected },
        )
    }
    pub(crate) fn any_of(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::AnyOf,
        )
    }
    pub(crate) fn backtrack_limit(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        error: fancy_regex::Error,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::BacktrackLimitExceeded { error },
        )
    }
    pub(crate) fn constant(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        expected: &Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Constant {
                expected: expected.clone(),
            },
        )
    }
    pub(crate) fn contains(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        min_contains: u64,
        max_contains: Option<u64>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Contains {
                min_contains,
                max_contains,
            },
        )
    }
    pub(crate) fn dependent_required(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        trigger: String,
        missing: String,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::DependentRequired { trigger, missing },
        )
    }
    pub(crate) fn enumeration(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        options: &Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Enum {
                options: options.clone(),
            },
        )
    }
    pub(crate) fn exclusive_maximum(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::ExclusiveMaximum { limit },
        )
    }
    pub(crate) fn exclusive_minimum(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::ExclusiveMinimum { limit },
        )
    }
    pub(crate) fn false_schema(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::FalseSchema,
        )
    }
    pub(crate) fn format(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        format: impl Into<String>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Format {
                format: format.into(),
            },
        )
    }
    pub(crate) fn max_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxItems { limit },
        )
    }
    pub(crate) fn maximum(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Maximum { limit },
        )
    }
    pub(crate) fn max_length(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxLength { limit },
        )
    }
    pub(crate) fn max_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MaxProperties { limit },
        )
    }
    pub(crate) fn min_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinItems { limit },
        )
    }
    pub(crate) fn minimum(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Minimum { limit },
        )
    }
    pub(crate) fn min_length(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinLength { limit },
        )
    }
    pub(crate) fn min_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MinProperties { limit },
        )
    }
    pub(crate) fn multiple_of(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        multiple_of: f64,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::MultipleOf { multiple_of },
        )
    }
    pub(crate) fn not(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        schema: Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Not { schema },
        )
    }
    pub(crate) fn one_of_multiple_valid(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::OneOfMultipleValid,
        )
    }
    pub(crate) fn one_of_not_valid(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::OneOfNotValid,
        )
    }
    pub(crate) fn pattern(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        pattern: impl Into<String>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Pattern {
                pattern: pattern.into(),
            },
        )
    }
    pub(crate) fn property_names(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        error: ValidationError<'_>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::PropertyNames {
                error: Box::new(error.into_owned()),
            },
        )
    }
    pub(crate) fn required(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        property: String,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Required { property },
        )
    }
    pub(crate) fn single_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        type_name: PrimitiveType,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Type {
                kind: TypeKind::Single(type_name),
            },
        )
    }
    pub(crate) fn multiple_type_error(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        types: PrimitiveTypes,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            },
        )
    }
    pub(crate) fn unevaluated_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        unexpected: Vec<usize>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::UnevaluatedItems { unexpected },
        )
    }
    pub(crate) fn unevaluated_properties(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
        unexpected: Vec<String>,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::UnevaluatedProperties { unexpected },
        )
    }
    pub(crate) fn unique_items(
        schema_path: Location,
        instance_path: Location,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        Self::new(
            schema_path,
            instance_path,
            instance,
            ValidationErrorKind::UniqueItems,
        )
    }
}

impl From<referencing::Error> for ValidationError<'_> {
    fn from(err: referencing::Error) -> Self {
        ValidationError {
            instance: Cow::Owned(Value::Null),
            kind: ValidationErrorKind::Referencing(err),
            instance_path: Location::new(),
            schema_path: Location::new(),
        }
    }
}

impl fmt::Display for ValidationError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::AdditionalItems { limit } => {
                write!(f, "must NOT have more than {limit} items")
            }
            ValidationErrorKind::AdditionalProperties { .. } => {
                f.write_str("must NOT have additional properties")
            }
            ValidationErrorKind::AnyOf => f.write_str("must match a schema in anyOf"),
            ValidationErrorKind::BacktrackLimitExceeded { error } => error.fmt(f),
            ValidationErrorKind::Constant { .. } => f.write_str("must be equal to constant"),
            ValidationErrorKind::Contains {
                min_contains,
                max_contains,
            } => match max_contains {
                Some(max) => write!(
                    f,
                    "must contain at least {min_contains} and no more than {max} valid item(s)"
                ),
                None => write!(f, "must contain at least {min_contains} valid item(s)"),
            },
            ValidationErrorKind::DependentRequired { trigger, missing } => write!(
                f,
                "must have property '{missing}' when property '{trigger}' is present"
            ),
            ValidationErrorKind::Enum { .. } => {
                f.write_str("must be equal to one of the allowed values")
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(f, "must be < {limit}"),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(f, "must be > {limit}"),
            ValidationErrorKind::FalseSchema => f.write_str("boolean schema is false"),
            ValidationErrorKind::Format { format } => {
                write!(f, "must match format \"{format}\"")
            }
            ValidationErrorKind::MaxItems { limit } => {
                write!(f, "must NOT have more than {limit} items")
            }
            ValidationErrorKind::Maximum { limit } => write!(f, "must be <= {limit}"),
            ValidationErrorKind::MaxLength { limit } => {
                write!(f, "must NOT have more than {limit} characters")
            }
            ValidationErrorKind::MaxProperties { limit } => {
                write!(f, "must NOT have more than {limit} properties")
            }
            ValidationErrorKind::MinItems { limit } => {
                write!(f, "must NOT have fewer than {limit} items")
            }
            ValidationErrorKind::Minimum { limit } => write!(f, "must be >= {limit}"),
            ValidationErrorKind::MinLength { limit } => {
                write!(f, "must NOT have fewer than {limit} characters")
            }
            ValidationErrorKind::MinProperties { limit } => {
                write!(f, "must NOT have fewer than {limit} properties")
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "must be multiple of {multiple_of}")
            }
            ValidationErrorKind::Not { .. } => f.write_str("must NOT be valid"),
            ValidationErrorKind::OneOfMultipleValid | ValidationErrorKind::OneOfNotValid => {
                f.write_str("must match exactly one schema in oneOf")
            }
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "must match pattern \"{pattern}\"")
            }
            ValidationErrorKind::PropertyNames { error } => {
                write!(f, "property name is invalid: {error}")
            }
            ValidationErrorKind::Referencing(error) => error.fmt(f),
            ValidationErrorKind::Required { property } => {
                write!(f, "must have required property '{property}'")
            }
            ValidationErrorKind::Type { kind } => match kind {
                TypeKind::Single(single) => write!(f, "must be {single}"),
                TypeKind::Multiple(types) => {
                    f.write_str("must be one of: ")?;
                    let mut iter = types.iter();
                    if let Some(first) = iter.next() {
                        write!(f, "{first}")?;
                    }
                    for ty in iter {
                        write!(f, ", {ty}")?;
                    }
                    Ok(())
                }
            },
            ValidationErrorKind::UnevaluatedItems { .. } => {
                f.write_str("must NOT have unevaluated items")
            }
            ValidationErrorKind::UnevaluatedProperties { .. } => {
                f.write_str("must NOT have unevaluated properties")
            }
            ValidationErrorKind::UniqueItems => f.write_str("must NOT have duplicate items"),
        }
    }
}

impl std::error::Error for ValidationError<'_> {}

impl serde::Serialize for ValidationError<'_> {
    /// Serializes into the conventional error-object shape:
    /// `{instancePath, schemaPath, keyword, params, message}`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        use serde_json::json;

        let params = match &self.kind {
            ValidationErrorKind::AdditionalItems { limit } => json!({ "limit": limit }),
            ValidationErrorKind::AdditionalProperties { unexpected }
            | ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                json!({ "unexpected": unexpected })
            }
            ValidationErrorKind::Constant { expected } => json!({ "allowedValue": expected }),
            ValidationErrorKind::Contains {
                min_contains,
                max_contains,
            } => json!({ "minContains": min_contains, "maxContains": max_contains }),
            ValidationErrorKind::DependentRequired { trigger, missing } => {
                json!({ "property": trigger, "missingProperty": missing })
            }
            ValidationErrorKind::Enum { options } => json!({ "allowedValues": options }),
            ValidationErrorKind::ExclusiveMaximum { limit }
            | ValidationErrorKind::ExclusiveMinimum { limit }
            | ValidationErrorKind::Maximum { limit }
            | ValidationErrorKind::Minimum { limit } => json!({ "limit": limit }),
            ValidationErrorKind::MaxItems { limit }
            | ValidationErrorKind::MaxLength { limit }
            | ValidationErrorKind::MaxProperties { limit }
            | ValidationErrorKind::MinItems { limit }
            | ValidationErrorKind::MinLength { limit }
            | ValidationErrorKind::MinProperties { limit } => json!({ "limit": limit }),
            ValidationErrorKind::MultipleOf { multiple_of } => {
                json!({ "multipleOf": multiple_of })
            }
            ValidationErrorKind::Format { format } => json!({ "format": format }),
            ValidationErrorKind::Pattern { pattern } => json!({ "pattern": pattern }),
            ValidationErrorKind::Required { property } => json!({ "missingProperty": property }),
            ValidationErrorKind::Type { kind } => match kind {
                TypeKind::Single(single) => json!({ "type": single.as_str() }),
                TypeKind::Multiple(types) => {
                    json!({ "type": types.iter().map(PrimitiveType::as_str).collect::<Vec<_>>() })
                }
            },
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                json!({ "unexpected": unexpected })
            }
            _ => json!({}),
        };
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("instancePath", &self.instance_path)?;
        map.serialize_entry("schemaPath", &self.schema_path)?;
        map.serialize_entry("keyword", self.keyword())?;
        map.serialize_entry("params", &params)?;
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn display_messages_are_stable() {
        let schema = json!({"maxItems": 2});
        let instance = json!([1, 2, 3]);
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let error = validator.validate(&instance).expect_err("Should fail");
        assert_eq!(error.to_string(), "must NOT have more than 2 items");
        assert_eq!(error.keyword(), "maxItems");
    }

    #[test]
    fn serializes_to_the_conventional_shape() {
        let schema = json!({"properties": {"name": {"type": "string"}}, "required": ["name"]});
        let validator = crate::validator_for(&schema).expect("Invalid schema");
        let instance = json!({});
        let error = validator.validate(&instance).expect_err("Should fail");
        let object = serde_json::to_value(&error).expect("Serializable");
        assert_eq!(
            object,
            json!({
                "instancePath": "/name",
                "schemaPath": "/required",
                "keyword": "required",
                "params": {"missingProperty": "name"},
                "message": "must have required property 'name'"
            })
        );
    }
}
