//! XMP Metadata
//!
//! This module provides the main XmpMeta struct for working with XMP metadata.

use crate::core::error::{XmpError, XmpResult};
use crate::core::iterator::{collect_subtree, IterOptions, XmpIterator, XmpProperty};
use crate::core::namespace::{namespace_prefix, namespace_uri};
use crate::core::node::{ArrayType, Node, PropertyShape, StructureNode};
use crate::core::parser::XmpParser;
use crate::core::serializer::XmpSerializer;
use crate::core::xpath::{build_path, parse_path, PathComponent, PathComponents};
use crate::types::qualifier::{Qualifier, X_DEFAULT};
use crate::types::value::PropertyValue;
use std::str::FromStr;

mod node;

/// Main structure for working with XMP metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpMeta {
    /// Top-level properties of every schema, keyed by qualified name
    root: StructureNode,
    /// About URI (typically empty string for main metadata)
    about_uri: Option<String>,
}

impl XmpMeta {
    /// Create a new empty XMP metadata object
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse XMP metadata from a string
    ///
    /// The string should contain a complete XMP Packet (with or without
    /// the `<?xpacket>` wrapper).
    pub fn parse(s: &str) -> XmpResult<Self> {
        let mut parser = XmpParser::new();
        let root = parser.parse_packet(s)?;

        Ok(Self {
            root,
            about_uri: parser
                .about_uri()
                .filter(|uri| !uri.is_empty())
                .map(str::to_string),
        })
    }

    /// Get the rdf:about URI of the packet, `None` when empty
    pub fn about_uri(&self) -> Option<&str> {
        self.about_uri.as_deref()
    }

    /// Set the rdf:about URI written on serialization
    pub fn set_about_uri(&mut self, uri: impl Into<String>) {
        self.about_uri = Some(uri.into());
    }

    /// Whether the tree holds no properties at all
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Check if a property exists
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace URI or prefix
    /// * `path` - The property path
    pub fn has_property(&self, namespace: &str, path: &str) -> bool {
        self.lookup(namespace, path).is_some()
    }

    /// Get a property value
    ///
    /// Arrays and structs are reported with an empty value and their shape.
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace URI or prefix
    /// * `path` - The property path (e.g., "CreatorTool" or "creator\[1\]")
    pub fn get_property(&self, namespace: &str, path: &str) -> Option<PropertyValue> {
        let node = self.lookup(namespace, path)?;
        Some(PropertyValue {
            value: node.value().to_string(),
            shape: node.shape(),
        })
    }

    /// Get the value of an array item (1-based index)
    ///
    /// Items that are themselves structs or arrays have an empty value.
    pub fn get_array_item(&self, namespace: &str, path: &str, index: usize) -> Option<String> {
        let array = self.lookup(namespace, path)?.as_array()?;
        array.item(index).map(|item| item.value().to_string())
    }

    /// Number of items in an array, `None` if the property is not an array
    pub fn count_array_items(&self, namespace: &str, path: &str) -> Option<usize> {
        self.lookup(namespace, path)?.as_array().map(|a| a.len())
    }

    /// Set a property
    ///
    /// A simple shape stores `value`. A struct or array shape replaces the
    /// node with an empty container; `value` must then be empty.
    ///
    /// Missing intermediate structs are created, and an index one past the
    /// end of an array appends a new item.
    ///
    /// # Example
    ///
    /// ```rust
    /// use photo_xmp::{ns, PropertyShape, XmpMeta};
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_property(ns::MWG_RS, "Regions", "", PropertyShape::Struct).unwrap();
    /// meta.set_property(ns::MWG_RS, "Regions/mwg-rs:RegionList[1]/mwg-rs:Name", "Ann", PropertyShape::Simple)
    ///     .unwrap();
    /// assert_eq!(meta.count_array_items(ns::MWG_RS, "Regions/mwg-rs:RegionList"), Some(1));
    /// ```
    pub fn set_property(
        &mut self,
        namespace: &str,
        path: &str,
        value: &str,
        shape: PropertyShape,
    ) -> XmpResult<()> {
        let new_node = match shape {
            PropertyShape::Simple => Node::simple(value),
            _ if !value.is_empty() => {
                return Err(XmpError::BadParam(format!(
                    "Composite property '{}' can't have a value",
                    path
                )))
            }
            PropertyShape::Struct => Node::structure(),
            PropertyShape::Array(array_type) => Node::array(array_type),
        };

        let path = self.expand_for_write(namespace, path)?;
        *node::find_or_create(&mut self.root, &path)? = new_node;
        Ok(())
    }

    /// Set an integer property
    pub fn set_property_int(&mut self, namespace: &str, path: &str, value: i64) -> XmpResult<()> {
        self.set_property(namespace, path, &value.to_string(), PropertyShape::Simple)
    }

    /// Set a real property
    ///
    /// The value is written in its shortest round-trip form (`10.5`, `3`).
    pub fn set_property_float(&mut self, namespace: &str, path: &str, value: f64) -> XmpResult<()> {
        if !value.is_finite() {
            return Err(XmpError::BadValue(format!(
                "Real property '{}' must be finite, got {}",
                path, value
            )));
        }
        self.set_property(namespace, path, &value.to_string(), PropertyShape::Simple)
    }

    /// Append an item to an array, creating the array if needed
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace URI or prefix
    /// * `path` - The array path
    /// * `array_type` - Array form used when the array does not exist yet
    /// * `value` - The item value
    pub fn append_array_item(
        &mut self,
        namespace: &str,
        path: &str,
        array_type: ArrayType,
        value: &str,
    ) -> XmpResult<()> {
        let path = self.expand_for_write(namespace, path)?;
        if node::find(&self.root, &path).is_none() {
            *node::find_or_create(&mut self.root, &path)? = Node::array(array_type);
        }

        let array = node::find_or_create(&mut self.root, &path)?
            .as_array_mut()
            .ok_or_else(|| {
                XmpError::BadValue(format!("Property '{}' is not an array", build_path(&path)))
            })?;
        array.append(Node::simple(value));
        Ok(())
    }

    /// Delete a property and everything below it
    ///
    /// Deleting an array item shifts the following items down by one.
    /// Deleting something that does not exist is not an error.
    pub fn delete_property(&mut self, namespace: &str, path: &str) -> XmpResult<()> {
        let Some(path) = self.expand(namespace, path) else {
            return Ok(());
        };
        node::remove(&mut self.root, &path);
        Ok(())
    }

    /// Set a localized text property
    ///
    /// The property is an `rdf:Alt` array whose items carry `xml:lang`
    /// qualifiers. An item with `specific_lang` is updated in place, or
    /// added; `x-default` items are kept first.
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace URI or prefix
    /// * `property` - The property path
    /// * `generic_lang` - Generic language code (e.g., "en"), can be empty string
    /// * `specific_lang` - Specific language code (e.g., "en-US" or "x-default")
    /// * `value` - The text value
    ///
    /// # Example
    ///
    /// ```rust
    /// use photo_xmp::XmpMeta;
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_localized_text(
    ///     "http://purl.org/dc/elements/1.1/",
    ///     "title",
    ///     "",
    ///     "x-default",
    ///     "Default Title"
    /// ).unwrap();
    /// ```
    pub fn set_localized_text(
        &mut self,
        namespace: &str,
        property: &str,
        _generic_lang: &str,
        specific_lang: &str,
        value: &str,
    ) -> XmpResult<()> {
        if specific_lang.is_empty() {
            return Err(XmpError::BadParam(
                "Specific language must not be empty".to_string(),
            ));
        }

        let path = self.expand_for_write(namespace, property)?;
        if node::find(&self.root, &path).is_none() {
            *node::find_or_create(&mut self.root, &path)? = Node::array(ArrayType::Alternative);
        }

        let array = node::find_or_create(&mut self.root, &path)?
            .as_array_mut()
            .filter(|array| array.array_type == ArrayType::Alternative)
            .ok_or_else(|| {
                XmpError::BadValue(format!(
                    "Property '{}' exists but is not a localized text array (rdf:Alt)",
                    build_path(&path)
                ))
            })?;

        let existing = array.items.iter_mut().find_map(|item| match item {
            Node::Simple(simple) if simple.lang() == Some(specific_lang) => Some(simple),
            _ => None,
        });
        if let Some(simple) = existing {
            simple.value = value.to_string();
            return Ok(());
        }

        let mut item = crate::core::node::SimpleNode::new(value);
        item.qualifiers.push(Qualifier::lang(specific_lang));
        if specific_lang == X_DEFAULT {
            array.items.insert(0, Node::Simple(item));
        } else {
            array.append(Node::Simple(item));
        }
        Ok(())
    }

    /// Get a localized text property
    ///
    /// This method searches for a localized text value matching the specified
    /// language codes. It follows XMP language matching rules:
    /// 1. Exact match for specific_lang
    /// 2. Match for generic_lang if specific_lang not found
    /// 3. Fallback to "x-default" if neither found
    /// 4. The first item otherwise
    ///
    /// # Returns
    ///
    /// Returns `Some((value, actual_lang))` if found, where `actual_lang` is
    /// the language of the item actually used.
    ///
    /// # Example
    ///
    /// ```rust
    /// use photo_xmp::XmpMeta;
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_localized_text(
    ///     "http://purl.org/dc/elements/1.1/",
    ///     "title",
    ///     "",
    ///     "x-default",
    ///     "Default Title"
    /// ).unwrap();
    ///
    /// let (value, lang) = meta.get_localized_text(
    ///     "http://purl.org/dc/elements/1.1/",
    ///     "title",
    ///     "",
    ///     "x-default"
    /// ).unwrap();
    /// assert_eq!(value, "Default Title");
    /// assert_eq!(lang, "x-default");
    /// ```
    pub fn get_localized_text(
        &self,
        namespace: &str,
        property: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> Option<(String, String)> {
        let array = self.lookup(namespace, property)?.as_array()?;
        if array.array_type != ArrayType::Alternative {
            return None;
        }

        let items: Vec<_> = array.items.iter().filter_map(Node::as_simple).collect();
        let found = |matches: &dyn Fn(&str) -> bool| {
            items
                .iter()
                .find(|item| item.lang().is_some_and(matches))
                .map(|item| (item.value.clone(), item.lang().unwrap_or_default().to_string()))
        };

        found(&|lang| lang == specific_lang)
            .or_else(|| {
                if generic_lang.is_empty() {
                    None
                } else {
                    found(&|lang| lang.starts_with(generic_lang))
                }
            })
            .or_else(|| found(&|lang| lang == X_DEFAULT))
            .or_else(|| {
                let first = items.first()?;
                Some((first.value.clone(), first.lang().unwrap_or_default().to_string()))
            })
    }

    /// Iterate a subtree depth-first in document order
    ///
    /// With an empty `root_path` every top-level property of the schema is
    /// visited. Each entry is reported before its fields or items.
    pub fn iter(&self, namespace: &str, root_path: &str, options: IterOptions) -> XmpIterator {
        XmpIterator::new(self.iterate(namespace, root_path, options))
    }

    /// Collect the entries of [`XmpMeta::iter`]
    pub fn iterate(&self, namespace: &str, root_path: &str, options: IterOptions) -> Vec<XmpProperty> {
        let mut out = Vec::new();
        let Some(schema) = resolve_namespace_uri(namespace) else {
            return out;
        };

        if root_path.is_empty() {
            for (name, node) in &self.root.fields {
                if schema_of(name).as_deref() == Some(schema.as_str()) {
                    collect_subtree(&schema, name, node, options, &mut out);
                }
            }
        } else if let Some(path) = self.expand(namespace, root_path) {
            if let Some(node) = node::find(&self.root, &path) {
                collect_subtree(&schema, &build_path(&path), node, options, &mut out);
            }
        }

        log::trace!("iterated {} entries below {}:{}", out.len(), schema, root_path);
        out
    }

    /// Serialize to an RDF/XML string without packet wrapper
    pub fn serialize(&self) -> XmpResult<String> {
        XmpSerializer::new(&self.root, self.about_uri()).serialize_rdf()
    }

    /// Serialize to a complete XMP packet
    pub fn serialize_packet(&self) -> XmpResult<String> {
        self.serialize_packet_with_padding(XmpSerializer::DEFAULT_PADDING)
    }

    /// Serialize to a complete XMP packet with `padding` bytes of whitespace
    /// before the trailer
    pub fn serialize_packet_with_padding(&self, padding: usize) -> XmpResult<String> {
        XmpSerializer::new(&self.root, self.about_uri()).serialize_packet(padding)
    }

    pub(crate) fn root(&self) -> &StructureNode {
        &self.root
    }

    fn lookup(&self, namespace: &str, path: &str) -> Option<&Node> {
        let path = self.expand(namespace, path)?;
        node::find(&self.root, &path)
    }

    /// Expand a read path; `None` when it cannot address anything
    fn expand(&self, namespace: &str, path: &str) -> Option<PathComponents> {
        self.expand_for_write(namespace, path).ok()
    }

    /// Expand `path` below `namespace` to fully qualified steps
    fn expand_for_write(&self, namespace: &str, path: &str) -> XmpResult<PathComponents> {
        let schema = resolve_namespace_uri(namespace).ok_or_else(|| {
            XmpError::BadSchema(format!(
                "Unknown namespace '{}'. Register the namespace first using register_namespace().",
                namespace
            ))
        })?;
        let prefix = namespace_prefix(&schema)
            .ok_or_else(|| XmpError::BadSchema(format!("No prefix for namespace '{}'", schema)))?;

        let mut components = parse_path(path)?;
        components.qualify(&prefix);

        for comp in &components.components {
            let PathComponent::Name(name) = comp else {
                continue;
            };
            if schema_of(name).is_none() {
                return Err(XmpError::BadXPath(format!(
                    "Unknown prefix in step '{}' of {}",
                    name, path
                )));
            }
        }

        let first = components.first_name().unwrap_or_default();
        if schema_of(first).as_deref() != Some(schema.as_str()) {
            return Err(XmpError::BadXPath(format!(
                "'{}' does not belong to schema {}",
                first, schema
            )));
        }
        Ok(components)
    }
}

/// Resolve a namespace parameter given as URI or prefix
fn resolve_namespace_uri(namespace: &str) -> Option<String> {
    if namespace_prefix(namespace).is_some() {
        Some(namespace.to_string())
    } else {
        namespace_uri(namespace)
    }
}

/// Namespace URI of a qualified name
fn schema_of(qualified_name: &str) -> Option<String> {
    let (prefix, _) = qualified_name.split_once(':')?;
    namespace_uri(prefix)
}

impl FromStr for XmpMeta {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
