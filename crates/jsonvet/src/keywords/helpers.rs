use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

use crate::{compiler, paths::Location, primitive_type::PrimitiveType, ValidationError};

/// A numeric bound kept in its original representation so comparisons never
/// lose precision, even past 2^53.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NumberLimit {
    U64(u64),
    I64(i64),
    F64(f64),
}

impl From<&Number> for NumberLimit {
    fn from(number: &Number) -> NumberLimit {
        if let Some(value) = number.as_u64() {
            NumberLimit::U64(value)
        } else if let Some(value) = number.as_i64() {
            NumberLimit::I64(value)
        } else {
            NumberLimit::F64(number.as_f64().expect("Always valid"))
        }
    }
}

macro_rules! compare {
    ($method:ident, $item:expr, $limit:expr) => {{
        let item = $item;
        match $limit {
            NumberLimit::U64(limit) => {
                if let Some(item) = item.as_u64() {
                    NumCmp::$method(item, limit)
                } else if let Some(item) = item.as_i64() {
                    NumCmp::$method(item, limit)
                } else {
                    NumCmp::$method(item.as_f64().expect("Always valid"), limit)
                }
            }
            NumberLimit::I64(limit) => {
                if let Some(item) = item.as_u64() {
                    NumCmp::$method(item, limit)
                } else if let Some(item) = item.as_i64() {
                    NumCmp::$method(item, limit)
                } else {
                    NumCmp::$method(item.as_f64().expect("Always valid"), limit)
                }
            }
            NumberLimit::F64(limit) => {
                if let Some(item) = item.as_u64() {
                    NumCmp::$method(item, limit)
                } else if let Some(item) = item.as_i64() {
                    NumCmp::$method(item, limit)
                } else {
                    NumCmp::$method(item.as_f64().expect("Always valid"), limit)
                }
            }
        }
    }};
}

#[inline]
pub(crate) fn is_above(item: &Number, limit: NumberLimit) -> bool {
    compare!(num_gt, item, limit)
}

#[inline]
pub(crate) fn is_below(item: &Number, limit: NumberLimit) -> bool {
    compare!(num_lt, item, limit)
}

/// JSON equality with cross-representation numeric comparison (`1 == 1.0`).
#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => {
            if let Some(value) = left.as_u64() {
                compare!(num_eq, right, NumberLimit::U64(value))
            } else if let Some(value) = left.as_i64() {
                compare!(num_eq, right, NumberLimit::I64(value))
            } else {
                compare!(
                    num_eq,
                    right,
                    NumberLimit::F64(left.as_f64().expect("Always valid"))
                )
            }
        }
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(lhs, rhs)| equal(lhs, rhs))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    // serde_json maps iterate in sorted key order, so a pairwise walk works
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|((ka, va), (kb, vb))| ka == kb && equal(va, vb))
}

/// Read a keyword value that must be a non-negative integer.
pub(crate) fn map_get_u64<'a>(
    map: &'a Map<String, Value>,
    ctx: &compiler::Context,
    keyword: &str,
) -> Option<Result<u64, ValidationError<'a>>> {
    let value = map.get(keyword)?;
    match value.as_u64() {
        Some(number) => Some(Ok(number)),
        None if value.is_i64() => Some(Err(ValidationError::minimum(
            Location::new(),
            ctx.location().clone(),
            value,
            0.into(),
        ))),
        None => {
            if let Some(number) = value.as_f64() {
                if number.trunc() == number && number >= 0.0 {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    return Some(Ok(number as u64));
                }
            }
            Some(Err(ValidationError::single_type_error(
                Location::new(),
                ctx.location().clone(),
                value,
                PrimitiveType::Integer,
            )))
        }
    }
}

/// Compile-time rejection for keywords that require a non-negative integer.
pub(crate) fn expect_limit<'a>(
    ctx: &compiler::Context,
    schema: &'a Value,
) -> Result<u64, ValidationError<'a>> {
    if let Some(limit) = schema.as_u64() {
        return Ok(limit);
    }
    if let Some(limit) = schema.as_f64() {
        if limit.trunc() == limit && limit >= 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return Ok(limit as u64);
        }
    }
    if schema.is_i64() {
        Err(ValidationError::minimum(
            Location::new(),
            ctx.location().clone(),
            schema,
            0.into(),
        ))
    } else {
        Err(ValidationError::single_type_error(
            Location::new(),
            ctx.location().clone(),
            schema,
            PrimitiveType::Integer,
        ))
    }
}
