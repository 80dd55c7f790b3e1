use crate::{
    compiler,
    error::ValidationError,
    keywords::{helpers::equal, CompilationResult},
    paths::{LazyLocation, Location},
    validator::Validate,
};
use ahash::{AHashSet, AHasher};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

/// A wrapper giving JSON values hashing consistent with [`equal`]: numbers
/// hash by their `f64` bits and objects combine entry hashes orderlessly.
struct HashedValue<'a>(&'a Value);

impl PartialEq for HashedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(self.0, other.0)
    }
}
impl Eq for HashedValue<'_> {}

impl Hash for HashedValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Value::Null => state.write_u32(0x4E55_4C4C),
            Value::Bool(item) => item.hash(state),
            Value::Number(item) => {
                if let Some(number) = item.as_f64() {
                    number.to_bits().hash(state);
                } else if let Some(number) = item.as_u64() {
                    number.hash(state);
                } else if let Some(number) = item.as_i64() {
                    number.hash(state);
                }
            }
            Value::String(item) => item.hash(state),
            Value::Array(items) => {
                for item in items {
                    HashedValue(item).hash(state);
                }
            }
            Value::Object(items) => {
                let mut hash = 0;
                for (key, value) in items {
                    // XOR makes the entry order irrelevant
                    let mut entry_hasher = AHasher::default();
                    key.hash(&mut entry_hasher);
                    HashedValue(value).hash(&mut entry_hasher);
                    hash ^= entry_hasher.finish();
                }
                state.write_u64(hash);
            }
        }
    }
}

/// Past this size hashing amortizes; below it the pairwise scan wins.
const PAIRWISE_THRESHOLD: usize = 15;

pub(crate) fn is_unique(items: &[Value]) -> bool {
    match items {
        [] | [_] => true,
        [first, second] => !equal(first, second),
        [first, second, third] => {
            !equal(first, second) && !equal(first, third) && !equal(second, third)
        }
        _ if items.len() <= PAIRWISE_THRESHOLD => {
            for (idx, left) in items.iter().enumerate() {
                for right in &items[idx + 1..] {
                    if equal(left, right) {
                        return false;
                    }
                }
            }
            true
        }
        _ => {
            let mut seen = AHashSet::with_capacity(items.len());
            items.iter().map(HashedValue).all(|item| seen.insert(item))
        }
    }
}

pub(crate) struct UniqueItemsValidator {
    location: Location,
}

impl Validate for UniqueItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if let Value::Array(items) = instance {
            is_unique(items)
        } else {
            true
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::unique_items(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    match schema {
        Value::Bool(true) => Some(Ok(Box::new(UniqueItemsValidator {
            location: ctx.location().join("uniqueItems"),
        }))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_unique, PAIRWISE_THRESHOLD};
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&[] => true)]
    #[test_case(&[json!(1), json!(2)] => true)]
    #[test_case(&[json!(1), json!(1.0)] => false; "numeric equivalence")]
    #[test_case(&[json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1})] => false; "key order does not matter")]
    #[test_case(&[json!([1]), json!([1.0])] => false)]
    fn uniqueness(items: &[Value]) -> bool {
        is_unique(items)
    }

    #[test]
    fn hashed_path_agrees_with_pairwise() {
        let mut items: Vec<Value> = (0..PAIRWISE_THRESHOLD as i64 + 5).map(|i| json!(i)).collect();
        assert!(is_unique(&items));
        items.push(json!(0.0));
        assert!(!is_unique(&items));
    }

    #[test]
    fn location() {
        tests_util::assert_schema_location(
            &json!({"uniqueItems": true}),
            &json!([1, 1]),
            "/uniqueItems",
        );
    }
}
