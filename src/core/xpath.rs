//! Property path handling for XMP
//!
//! Paths address nodes below a schema: `mwg-rs:Regions/mwg-rs:RegionList[2]/mwg-rs:Name`.
//! Steps are separated by `/`; a step may carry a 1-based `[n]` array index.

use crate::core::error::{XmpError, XmpResult};

/// Parse a property path expression
///
/// Supports formats like:
/// - `Orientation` - top-level property, prefix taken from the schema
/// - `dc:subject[1]` - array item with index
/// - `mwg-rs:Regions/mwg-rs:AppliedToDimensions/stDim:w` - struct fields
/// - `mwg-rs:Regions/mwg-rs:RegionList[1]/mwg-rs:Name` - field of an array item
pub fn parse_path(path: &str) -> XmpResult<PathComponents> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for ch in path.chars() {
        match ch {
            '[' => {
                if in_brackets {
                    return Err(XmpError::BadXPath(format!("Nested '[' in {}", path)));
                }
                if !current.is_empty() {
                    components.push(PathComponent::Name(std::mem::take(&mut current)));
                }
                if !matches!(components.last(), Some(PathComponent::Name(_))) {
                    return Err(XmpError::BadXPath(format!(
                        "Array index without a property name in {}",
                        path
                    )));
                }
                in_brackets = true;
            }
            ']' => {
                if !in_brackets {
                    return Err(XmpError::BadXPath(format!("Unexpected ']' in {}", path)));
                }
                let index = current.parse::<usize>().map_err(|_| {
                    XmpError::BadXPath(format!("Invalid array index: {}", current))
                })?;
                if index == 0 {
                    return Err(XmpError::BadXPath(format!(
                        "Array indices start at 1: {}",
                        path
                    )));
                }
                components.push(PathComponent::Index(index));
                current.clear();
                in_brackets = false;
            }
            '/' if !in_brackets => {
                if !current.is_empty() {
                    components.push(PathComponent::Name(std::mem::take(&mut current)));
                }
            }
            _ => {
                if in_brackets && !ch.is_ascii_digit() {
                    return Err(XmpError::BadXPath(format!(
                        "Invalid character in index: {}",
                        ch
                    )));
                }
                if !in_brackets && ch == '?' {
                    return Err(XmpError::NotSupported(format!(
                        "Qualifier steps are not addressable: {}",
                        path
                    )));
                }
                current.push(ch);
            }
        }
    }

    if in_brackets {
        return Err(XmpError::BadXPath("Unclosed bracket".to_string()));
    }
    if !current.is_empty() {
        components.push(PathComponent::Name(current));
    }
    if components.is_empty() {
        return Err(XmpError::BadXPath("Empty path".to_string()));
    }

    Ok(PathComponents { components })
}

/// Build a path from components
pub fn build_path(components: &PathComponents) -> String {
    let mut result = String::new();
    for comp in &components.components {
        match comp {
            PathComponent::Name(name) => {
                if !result.is_empty() {
                    result.push('/');
                }
                result.push_str(name);
            }
            PathComponent::Index(idx) => {
                result.push('[');
                result.push_str(&idx.to_string());
                result.push(']');
            }
        }
    }
    result
}

/// A component of a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// A property or field name
    Name(String),
    /// A 1-based array index
    Index(usize),
}

/// Parsed path components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponents {
    pub components: Vec<PathComponent>,
}

impl PathComponents {
    /// Get the first component as a name
    pub fn first_name(&self) -> Option<&str> {
        self.components.first().and_then(|c| match c {
            PathComponent::Name(n) => Some(n.as_str()),
            _ => None,
        })
    }

    /// Give every unprefixed name step the schema's prefix
    pub fn qualify(&mut self, schema_prefix: &str) {
        for comp in &mut self.components {
            if let PathComponent::Name(name) = comp {
                if !name.contains(':') {
                    *name = format!("{}:{}", schema_prefix, name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let path = parse_path("Orientation").unwrap();
        assert_eq!(
            path.components,
            vec![PathComponent::Name("Orientation".to_string())]
        );
    }

    #[test]
    fn test_parse_region_path() {
        let path = parse_path("mwg-rs:Regions/mwg-rs:RegionList[12]/mwg-rs:Area/stArea:x").unwrap();
        assert_eq!(
            path.components,
            vec![
                PathComponent::Name("mwg-rs:Regions".to_string()),
                PathComponent::Name("mwg-rs:RegionList".to_string()),
                PathComponent::Index(12),
                PathComponent::Name("mwg-rs:Area".to_string()),
                PathComponent::Name("stArea:x".to_string()),
            ]
        );
        assert_eq!(
            build_path(&path),
            "mwg-rs:Regions/mwg-rs:RegionList[12]/mwg-rs:Area/stArea:x"
        );
    }

    #[test]
    fn test_rejects_bad_indices() {
        assert!(parse_path("dc:subject[0]").is_err());
        assert!(parse_path("dc:subject[a]").is_err());
        assert!(parse_path("dc:subject[1").is_err());
        assert!(parse_path("[1]").is_err());
        assert!(parse_path("").is_err());
        assert!(parse_path("dc:title[1]/?xml:lang").is_err());
    }

    #[test]
    fn test_qualify() {
        let mut path = parse_path("creator[1]").unwrap();
        path.qualify("dc");
        assert_eq!(build_path(&path), "dc:creator[1]");
        assert_eq!(path.first_name(), Some("dc:creator"));
    }
}
