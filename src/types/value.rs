//! Property values as reported by the store
//!
//! A read returns the raw string together with the node's shape, so callers
//! can tell a leaf from a container without a second lookup.

use crate::core::node::PropertyShape;
use std::fmt;

/// The value and shape of one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    /// Leaf value; empty for arrays and structs
    pub value: String,
    /// Shape of the node holding the value
    pub shape: PropertyShape,
}

impl PropertyValue {
    /// A leaf value
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            shape: PropertyShape::Simple,
        }
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            PropertyShape::Simple => write!(f, "{}", self.value),
            PropertyShape::Struct => write!(f, "[Structure]"),
            PropertyShape::Array(ty) => write!(f, "[{}]", ty.rdf_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::ArrayType;

    #[test]
    fn test_display() {
        assert_eq!(PropertyValue::simple("N").to_string(), "N");
        let bag = PropertyValue {
            value: String::new(),
            shape: PropertyShape::Array(ArrayType::Unordered),
        };
        assert_eq!(bag.to_string(), "[Bag]");
    }
}
