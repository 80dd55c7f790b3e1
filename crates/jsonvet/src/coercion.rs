//! The optional coercion pass.
//!
//! Runs before validation and converts values between types where the target
//! schema asks for a different type than the input carries. The pass is
//! best-effort: when no rule matches, the value is left untouched and
//! validation fails later with a regular type error.
use ahash::AHashSet;
use referencing::{Draft, Registry, Resolver};
use serde_json::{Number, Value};
use std::sync::Arc;

/// Which target types coercion may produce.
///
/// Mirrors the per-type configuration of the `coerce` option: each flag
/// enables conversions *into* that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoercionRules {
    pub string: bool,
    pub number: bool,
    pub integer: bool,
    pub boolean: bool,
    pub null: bool,
    pub array: bool,
}

impl CoercionRules {
    /// Enable every conversion rule.
    #[must_use]
    pub fn all() -> CoercionRules {
        CoercionRules {
            string: true,
            number: true,
            integer: true,
            boolean: true,
            null: true,
            array: true,
        }
    }
}

/// The compiled coercion pass: the raw schema plus the registry needed to
/// follow `$ref` while walking it.
#[derive(Debug)]
pub(crate) struct Coercer {
    registry: Arc<Registry>,
    schema: Value,
    base_uri: String,
    draft: Draft,
    rules: CoercionRules,
}

impl Coercer {
    pub(crate) fn new(
        registry: Arc<Registry>,
        schema: Value,
        base_uri: String,
        draft: Draft,
        rules: CoercionRules,
    ) -> Coercer {
        Coercer {
            registry,
            schema,
            base_uri,
            draft,
            rules,
        }
    }

    /// Apply the pass in place; returns whether the value changed.
    pub(crate) fn coerce(&self, instance: &mut Value) -> bool {
        let Ok(resolver) = self.registry.try_resolver(&self.base_uri) else {
            return false;
        };
        let mut changed = false;
        let mut seen = AHashSet::new();
        self.apply(&self.schema, instance, &resolver, &mut seen, &mut changed);
        changed
    }

    fn apply(
        &self,
        schema: &Value,
        instance: &mut Value,
        resolver: &Resolver<'_>,
        seen: &mut AHashSet<String>,
        changed: &mut bool,
    ) {
        let Some(schema) = schema.as_object() else {
            return;
        };
        if let Some(Value::String(reference)) = schema.get("$ref") {
            // The guard keeps reference cycles from recursing forever
            if seen.insert(reference.clone()) {
                if let Ok(resolved) = resolver.lookup(reference) {
                    self.apply(
                        resolved.contents(),
                        instance,
                        resolved.resolver(),
                        seen,
                        changed,
                    );
                }
                seen.remove(reference);
            }
        }
        if let Some(Value::Array(subschemas)) = schema.get("allOf") {
            for subschema in subschemas {
                self.apply(subschema, instance, resolver, seen, changed);
            }
        }
        for combinator in ["anyOf", "oneOf"] {
            if let Some(Value::Array(subschemas)) = schema.get(combinator) {
                // First alternative that produces a change wins
                for subschema in subschemas {
                    let mut branch_changed = false;
                    self.apply(subschema, instance, resolver, seen, &mut branch_changed);
                    if branch_changed {
                        *changed = true;
                        break;
                    }
                }
            }
        }
        if let Some(type_) = schema.get("type") {
            self.coerce_type(type_, instance, changed);
        }
        if let (Some(Value::Object(properties)), Value::Object(map)) =
            (schema.get("properties"), &mut *instance)
        {
            for (key, subschema) in properties {
                if let Some(value) = map.get_mut(key) {
                    self.apply(subschema, value, resolver, seen, changed);
                }
            }
        }
        if let Value::Array(items) = instance {
            let prefix = match self.draft {
                Draft::Draft202012 => schema.get("prefixItems").and_then(Value::as_array),
                _ => schema.get("items").and_then(Value::as_array),
            };
            let rest = schema.get("items").filter(|value| value.is_object());
            let prefix_len = prefix.map_or(0, Vec::len);
            for (idx, item) in items.iter_mut().enumerate() {
                let subschema = if idx < prefix_len {
                    prefix.map(|schemas| &schemas[idx])
                } else {
                    rest
                };
                if let Some(subschema) = subschema {
                    self.apply(subschema, item, resolver, seen, changed);
                }
            }
        }
    }

    fn coerce_type(&self, type_: &Value, instance: &mut Value, changed: &mut bool) {
        let targets: Vec<&str> = match type_ {
            Value::String(single) => vec![single.as_str()],
            Value::Array(union) => union.iter().filter_map(Value::as_str).collect(),
            _ => return,
        };
        if targets.iter().any(|target| matches_type(instance, target)) {
            return;
        }
        for target in targets {
            if let Some(coerced) = self.convert(instance, target) {
                *instance = coerced;
                *changed = true;
                return;
            }
        }
    }

    fn convert(&self, value: &Value, target: &str) -> Option<Value> {
        match target {
            "number" if self.rules.number => match value {
                Value::String(string) => parse_number(string),
                _ => None,
            },
            "integer" if self.rules.integer => match value {
                Value::String(string) => match parse_number(string)? {
                    Value::Number(number) if is_whole(&number) => {
                        Some(Value::Number(renumber_as_integer(&number)?))
                    }
                    _ => None,
                },
                _ => None,
            },
            "boolean" if self.rules.boolean => match value {
                Value::String(string) => match string.as_str() {
                    "true" | "1" => Some(Value::Bool(true)),
                    "false" | "0" => Some(Value::Bool(false)),
                    _ => None,
                },
                Value::Number(number) => {
                    if number.as_f64() == Some(1.0) {
                        Some(Value::Bool(true))
                    } else if number.as_f64() == Some(0.0) {
                        Some(Value::Bool(false))
                    } else {
                        None
                    }
                }
                _ => None,
            },
            "null" if self.rules.null => match value {
                Value::String(string) if string.is_empty() || string == "null" => Some(Value::Null),
                _ => None,
            },
            "string" if self.rules.string => match value {
                Value::Number(number) => Some(Value::String(number.to_string())),
                Value::Bool(boolean) => Some(Value::String(boolean.to_string())),
                _ => None,
            },
            "array" if self.rules.array => Some(Value::Array(vec![value.clone()])),
            _ => None,
        }
    }
}

fn matches_type(value: &Value, target: &str) -> bool {
    match target {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value
            .as_number()
            .is_some_and(is_whole),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => false,
    }
}

fn is_whole(number: &Number) -> bool {
    number.is_u64()
        || number.is_i64()
        || number.as_f64().is_some_and(|value| value.fract() == 0.0)
}

fn parse_number(string: &str) -> Option<Value> {
    if let Ok(integer) = string.parse::<i64>() {
        return Some(Value::Number(integer.into()));
    }
    let float = string.parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}

fn renumber_as_integer(number: &Number) -> Option<Number> {
    if number.is_u64() || number.is_i64() {
        return Some(number.clone());
    }
    let float = number.as_f64()?;
    if float >= i64::MIN as f64 && float <= i64::MAX as f64 {
        Some(Number::from(float as i64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::CoercionRules;
    use serde_json::{json, Value};
    use test_case::test_case;

    fn coerced(schema: &Value, mut instance: Value) -> Value {
        let validator = crate::options()
            .with_coercion(CoercionRules::all())
            .build(schema)
            .expect("Invalid schema");
        validator.coerce(&mut instance);
        instance
    }

    #[test_case(&json!({"type": "number"}), json!("3.25"), json!(3.25))]
    #[test_case(&json!({"type": "integer"}), json!("42"), json!(42))]
    #[test_case(&json!({"type": "integer"}), json!("1.5"), json!("1.5"); "fractional string stays put")]
    #[test_case(&json!({"type": "boolean"}), json!("1"), json!(true))]
    #[test_case(&json!({"type": "boolean"}), json!(0), json!(false))]
    #[test_case(&json!({"type": "null"}), json!(""), json!(null))]
    #[test_case(&json!({"type": "string"}), json!(7), json!("7"))]
    #[test_case(&json!({"type": "array"}), json!("a"), json!(["a"]))]
    #[test_case(&json!({"type": ["number", "boolean"]}), json!("true"), json!(true); "union tries each target")]
    fn conversions(schema: &Value, instance: Value, expected: Value) {
        assert_eq!(coerced(schema, instance), expected);
    }

    #[test]
    fn members_are_coerced_in_place() {
        let schema = json!({
            "properties": {"age": {"type": "integer"}},
            "items": {"type": "number"}
        });
        let instance = json!({"age": "30"});
        assert_eq!(coerced(&schema, instance), json!({"age": 30}));
        let instance = json!(["1", "2.5"]);
        assert_eq!(coerced(&schema, instance), json!([1, 2.5]));
    }

    #[test]
    fn coercion_is_a_fixed_point() {
        let schema = json!({"type": "integer"});
        let validator = crate::options()
            .with_coercion(CoercionRules::all())
            .build(&schema)
            .expect("Invalid schema");
        let mut instance = json!("42");
        assert!(validator.coerce(&mut instance));
        assert_eq!(instance, json!(42));
        assert!(!validator.coerce(&mut instance));
        assert_eq!(instance, json!(42));
    }

    #[test]
    fn first_changing_branch_wins_in_any_of() {
        let schema = json!({"anyOf": [{"type": "object"}, {"type": "integer"}]});
        assert_eq!(coerced(&schema, json!("42")), json!(42));
    }
}
