//! Qualifier types for XMP
//!
//! Qualifiers hang extra information off a property node. The only one the
//! tag codecs rely on is `xml:lang`, which marks the alternatives of a
//! localized text array.

use crate::core::namespace::{namespace_prefix, ns};
use std::fmt;

/// Language tag used for the default alternative of a localized text
pub const X_DEFAULT: &str = "x-default";

/// A qualifier attached to an XMP node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    /// The namespace URI of the qualifier
    pub namespace: String,
    /// The local name of the qualifier
    pub name: String,
    /// The value of the qualifier
    pub value: String,
}

impl Qualifier {
    /// Create a new qualifier
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// An `xml:lang` qualifier
    pub fn lang(value: impl Into<String>) -> Self {
        Self::new(ns::XML, "lang", value)
    }

    /// Whether this is an `xml:lang` qualifier
    pub fn is_lang(&self) -> bool {
        self.namespace == ns::XML && self.name == "lang"
    }

    /// Prefixed name as it appears in paths and markup, e.g. `xml:lang`
    ///
    /// Falls back to the bare local name when the namespace has no prefix.
    pub fn qualified_name(&self) -> String {
        match namespace_prefix(&self.namespace) {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.qualified_name(), self.value)
    }
}
