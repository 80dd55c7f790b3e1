//! The seven JSON Schema primitive types and a compact set representation.
use serde_json::Value;
use std::{convert::TryFrom, fmt, ops::BitOrAssign};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Array => "array",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Null => "null",
            PrimitiveType::Number => "number",
            PrimitiveType::Object => "object",
            PrimitiveType::String => "string",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

impl From<&Value> for PrimitiveType {
    fn from(instance: &Value) -> Self {
        match instance {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(_) => PrimitiveType::Number,
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }
}

const fn bit_of(primitive_type: PrimitiveType) -> u8 {
    match primitive_type {
        PrimitiveType::Array => 1,
        PrimitiveType::Boolean => 1 << 1,
        PrimitiveType::Integer => 1 << 2,
        PrimitiveType::Null => 1 << 3,
        PrimitiveType::Number => 1 << 4,
        PrimitiveType::Object => 1 << 5,
        PrimitiveType::String => 1 << 6,
    }
}

/// A set of primitive types stored as a bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveTypes {
    mask: u8,
}

impl PrimitiveTypes {
    pub(crate) const fn new() -> Self {
        Self { mask: 0 }
    }
    #[inline]
    pub(crate) const fn with(mut self, primitive_type: PrimitiveType) -> Self {
        self.mask |= bit_of(primitive_type);
        self
    }
    pub(crate) const fn contains(self, primitive_type: PrimitiveType) -> bool {
        self.mask & bit_of(primitive_type) != 0
    }
    /// Iterate over the contained types in a fixed order.
    pub(crate) fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        const ALL: [PrimitiveType; 7] = [
            PrimitiveType::Array,
            PrimitiveType::Boolean,
            PrimitiveType::Integer,
            PrimitiveType::Null,
            PrimitiveType::Number,
            PrimitiveType::Object,
            PrimitiveType::String,
        ];
        ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypes {
    #[inline]
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        *self = self.with(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::{PrimitiveType, PrimitiveTypes};

    #[test]
    fn set_semantics() {
        let mut types = PrimitiveTypes::new();
        types |= PrimitiveType::Null;
        types |= PrimitiveType::String;
        assert!(types.contains(PrimitiveType::Null));
        assert!(types.contains(PrimitiveType::String));
        assert!(!types.contains(PrimitiveType::Array));
        assert_eq!(
            types.iter().collect::<Vec<_>>(),
            vec![PrimitiveType::Null, PrimitiveType::String]
        );
    }
}
