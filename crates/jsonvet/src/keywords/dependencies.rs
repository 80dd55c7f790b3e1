use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::{LazyLocation, Location},
    primitive_type::PrimitiveType,
    validator::Validate,
};
use serde_json::{Map, Value};

/// What the presence of a trigger property demands.
enum Dependency {
    /// Other properties must be present too.
    Required(Vec<String>),
    /// The whole object must match a schema.
    Schema(SchemaNode),
}

pub(crate) struct DependenciesValidator {
    dependencies: Vec<(String, Dependency)>,
    location: Location,
}

impl DependenciesValidator {
    fn compile<'a>(
        ctx: &compiler::Context,
        keyword: &'static str,
        map: &'a Map<String, Value>,
        schemas_allowed: bool,
        requirements_allowed: bool,
    ) -> CompilationResult<'a> {
        let kctx = ctx.new_at_location(keyword);
        let mut dependencies = Vec::with_capacity(map.len());
        for (trigger, dependency) in map {
            let dctx = kctx.new_at_location(trigger.as_str());
            let dependency = match dependency {
                Value::Array(names) if requirements_allowed => {
                    let mut required = Vec::with_capacity(names.len());
                    for name in names {
                        match name {
                            Value::String(name) => required.push(name.clone()),
                            _ => {
                                return Err(ValidationError::single_type_error(
                                    Location::new(),
                                    dctx.location().clone(),
                                    name,
                                    PrimitiveType::String,
                                ))
                            }
                        }
                    }
                    Dependency::Required(required)
                }
                Value::Object(_) | Value::Bool(_) if schemas_allowed => {
                    Dependency::Schema(compiler::compile(&dctx, dctx.as_resource_ref(dependency))?)
                }
                _ => {
                    return Err(ValidationError::single_type_error(
                        Location::new(),
                        dctx.location().clone(),
                        dependency,
                        if requirements_allowed {
                            PrimitiveType::Array
                        } else {
                            PrimitiveType::Object
                        },
                    ))
                }
            };
            dependencies.push((trigger.clone(), dependency));
        }
        Ok(Box::new(DependenciesValidator {
            dependencies,
            location: ctx.location().join(keyword),
        }))
    }
}

impl Validate for DependenciesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Object(item) = instance {
            for (trigger, dependency) in &self.dependencies {
                if !item.contains_key(trigger) {
                    continue;
                }
                match dependency {
                    Dependency::Required(names) => {
                        if !names.iter().all(|name| item.contains_key(name)) {
                            return false;
                        }
                    }
                    Dependency::Schema(node) => {
                        if !node.is_valid(instance) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if let Value::Object(item) = instance {
            for (trigger, dependency) in &self.dependencies {
                if !item.contains_key(trigger) {
                    continue;
                }
                match dependency {
                    Dependency::Required(names) => {
                        if let Some(missing) =
                            names.iter().find(|name| !item.contains_key(name.as_str()))
                        {
                            return Err(ValidationError::dependent_required(
                                self.location.clone(),
                                location.into(),
                                instance,
                                trigger.clone(),
                                missing.clone(),
                            ));
                        }
                    }
                    Dependency::Schema(node) => node.validate(instance, location)?,
                }
            }
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        if let Value::Object(item) = instance {
            let mut errors = Vec::new();
            for (trigger, dependency) in &self.dependencies {
                if !item.contains_key(trigger) {
                    continue;
                }
                match dependency {
                    Dependency::Required(names) => {
                        errors.extend(
                            names
                                .iter()
                                .filter(|name| !item.contains_key(name.as_str()))
                                .map(|missing| {
                                    ValidationError::dependent_required(
                                        self.location.clone(),
                                        location.into(),
                                        instance,
                                        trigger.clone(),
                                        missing.clone(),
                                    )
                                }),
                        );
                    }
                    Dependency::Schema(node) => {
                        errors.extend(node.iter_errors(instance, location));
                    }
                }
            }
            Box::new(errors.into_iter())
        } else {
            no_error()
        }
    }
}

fn expect_object<'a>(
    ctx: &compiler::Context,
    schema: &'a Value,
) -> Result<&'a Map<String, Value>, ValidationError<'a>> {
    match schema {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Object,
        )),
    }
}

/// The legacy `dependencies` union of both forms.
#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match expect_object(ctx, schema) {
        Ok(map) => Some(DependenciesValidator::compile(
            ctx,
            "dependencies",
            map,
            true,
            true,
        )),
        Err(err) => Some(Err(err)),
    }
}

#[inline]
pub(crate) fn compile_dependent_required<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match expect_object(ctx, schema) {
        Ok(map) => Some(DependenciesValidator::compile(
            ctx,
            "dependentRequired",
            map,
            false,
            true,
        )),
        Err(err) => Some(Err(err)),
    }
}

#[inline]
pub(crate) fn compile_dependent_schemas<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match expect_object(ctx, schema) {
        Ok(map) => Some(DependenciesValidator::compile(
            ctx,
            "dependentSchemas",
            map,
            true,
            false,
        )),
        Err(err) => Some(Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1, "foo": 2}))]
    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"foo": 1}); "trigger absent")]
    #[test_case(&json!({"dependentSchemas": {"bar": {"required": ["foo"]}}}), &json!({"bar": 1, "foo": 2}))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1}))]
    #[test_case(&json!({"dependentSchemas": {"bar": {"required": ["foo"]}}}), &json!({"bar": 1}))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn legacy_union_in_draft7() {
        let schema = json!({"dependencies": {
            "a": ["b"],
            "c": {"minProperties": 2}
        }});
        let validator = crate::options()
            .with_draft(crate::Draft::Draft7)
            .build(&schema)
            .expect("Invalid schema");
        assert!(validator.is_valid(&json!({"a": 1, "b": 2})));
        assert!(!validator.is_valid(&json!({"a": 1})));
        assert!(validator.is_valid(&json!({"c": 1, "x": 2})));
        assert!(!validator.is_valid(&json!({"c": 1})));
    }

    #[test]
    fn message() {
        let validator = crate::validator_for(&json!({"dependentRequired": {"bar": ["foo"]}}))
            .expect("Invalid schema");
        let error = validator
            .validate(&json!({"bar": 1}))
            .expect_err("Should fail");
        assert_eq!(
            error.to_string(),
            "must have property 'foo' when property 'bar' is present"
        );
    }
}
