//! XMP node types
//!
//! The property tree is built from three node kinds:
//! - SimpleNode: a leaf string value
//! - ArrayNode: an ordered, unordered or alternative list of nodes
//! - StructureNode: named fields, kept in document order
//!
//! Field names are always prefix-qualified (`mwg-rs:Name`), so a node can be
//! addressed with the same path text that the tag registry uses.

use crate::types::qualifier::Qualifier;

/// Type of array node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayType {
    /// Ordered array (rdf:Seq)
    Ordered,
    /// Unordered array (rdf:Bag)
    Unordered,
    /// Alternative array (rdf:Alt)
    Alternative,
}

impl ArrayType {
    /// Get the RDF container name for this array type
    pub fn rdf_type(&self) -> &'static str {
        match self {
            ArrayType::Ordered => "Seq",
            ArrayType::Unordered => "Bag",
            ArrayType::Alternative => "Alt",
        }
    }

    /// Map an RDF container local name back to an array type
    pub fn from_rdf_type(local_name: &str) -> Option<Self> {
        match local_name {
            "Seq" => Some(ArrayType::Ordered),
            "Bag" => Some(ArrayType::Unordered),
            "Alt" => Some(ArrayType::Alternative),
            _ => None,
        }
    }
}

/// The shape of a property as reported by the store
///
/// This plays the role of the array/struct option bits of the Adobe API:
/// readers branch on it instead of trusting what they expect to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    /// A leaf value
    Simple,
    /// A struct with named fields
    Struct,
    /// An array of the given kind
    Array(ArrayType),
}

impl PropertyShape {
    /// Check if the shape is an array of any kind
    pub fn is_array(&self) -> bool {
        matches!(self, PropertyShape::Array(_))
    }

    /// Check if the shape is a struct
    pub fn is_struct(&self) -> bool {
        matches!(self, PropertyShape::Struct)
    }
}

/// A simple value node
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleNode {
    /// The value of the node
    pub value: String,
    /// Qualifiers attached to this node
    pub qualifiers: Vec<Qualifier>,
}

impl SimpleNode {
    /// Create a new simple node
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            qualifiers: Vec::new(),
        }
    }

    /// The `xml:lang` qualifier value, if any
    pub fn lang(&self) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.is_lang())
            .map(|q| q.value.as_str())
    }
}

/// An array node containing multiple child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    /// The items in the array
    pub items: Vec<Node>,
    /// The type of array
    pub array_type: ArrayType,
    /// Qualifiers attached to this node
    pub qualifiers: Vec<Qualifier>,
}

impl ArrayNode {
    /// Create a new array node
    pub fn new(array_type: ArrayType) -> Self {
        Self {
            items: Vec::new(),
            array_type,
            qualifiers: Vec::new(),
        }
    }

    /// Get the number of items in the array
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by its 1-based XMP index
    pub fn item(&self, index: usize) -> Option<&Node> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Get a mutable item by its 1-based XMP index
    pub fn item_mut(&mut self, index: usize) -> Option<&mut Node> {
        index.checked_sub(1).and_then(|i| self.items.get_mut(i))
    }

    /// Append an item to the array
    pub fn append(&mut self, node: Node) {
        self.items.push(node);
    }

    /// Remove the item at a 1-based index; later items move down by one
    pub fn remove_item(&mut self, index: usize) -> Option<Node> {
        let i = index.checked_sub(1)?;
        (i < self.items.len()).then(|| self.items.remove(i))
    }
}

/// A structure node containing named fields in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureNode {
    /// The fields of the structure, keyed by qualified name
    pub fields: Vec<(String, Node)>,
    /// Qualifiers attached to this node
    pub qualifiers: Vec<Qualifier>,
}

impl StructureNode {
    /// Create a new structure node
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, n)| n)
    }

    /// Get a mutable reference to a field by name
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, n)| n)
    }

    /// Set a field; an existing field keeps its position
    pub fn set_field(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        match self.get_field_mut(&name) {
            Some(existing) => *existing = node,
            None => self.fields.push((name, node)),
        }
    }

    /// Remove a field
    pub fn remove_field(&mut self, name: &str) -> Option<Node> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Check if a field exists
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Get all field names in document order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Check if the structure has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A node in the XMP data model
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A simple value node
    Simple(SimpleNode),
    /// An array node
    Array(ArrayNode),
    /// A structure node
    Structure(StructureNode),
}

impl Node {
    /// Create a new simple node
    pub fn simple(value: impl Into<String>) -> Self {
        Node::Simple(SimpleNode::new(value))
    }

    /// Create a new array node
    pub fn array(array_type: ArrayType) -> Self {
        Node::Array(ArrayNode::new(array_type))
    }

    /// Create a new structure node
    pub fn structure() -> Self {
        Node::Structure(StructureNode::new())
    }

    /// Shape of this node
    pub fn shape(&self) -> PropertyShape {
        match self {
            Node::Simple(_) => PropertyShape::Simple,
            Node::Array(array) => PropertyShape::Array(array.array_type),
            Node::Structure(_) => PropertyShape::Struct,
        }
    }

    /// Leaf value; containers have an empty value
    pub fn value(&self) -> &str {
        match self {
            Node::Simple(simple) => &simple.value,
            _ => "",
        }
    }

    /// Qualifiers attached to this node
    pub fn qualifiers(&self) -> &[Qualifier] {
        match self {
            Node::Simple(node) => &node.qualifiers,
            Node::Array(node) => &node.qualifiers,
            Node::Structure(node) => &node.qualifiers,
        }
    }

    /// Check if this is a simple node
    pub fn is_simple(&self) -> bool {
        matches!(self, Node::Simple(_))
    }

    /// Get the simple node, if this is a simple node
    pub fn as_simple(&self) -> Option<&SimpleNode> {
        match self {
            Node::Simple(node) => Some(node),
            _ => None,
        }
    }

    /// Get the array node, if this is an array node
    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Get the structure node, if this is a structure node
    pub fn as_structure(&self) -> Option<&StructureNode> {
        match self {
            Node::Structure(node) => Some(node),
            _ => None,
        }
    }

    /// Get a mutable reference to the array node, if this is an array node
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            Node::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Get a mutable reference to the structure node, if this is a structure node
    pub fn as_structure_mut(&mut self) -> Option<&mut StructureNode> {
        match self {
            Node::Structure(node) => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_node_is_one_based() {
        let mut array = ArrayNode::new(ArrayType::Unordered);
        array.append(Node::simple("a"));
        array.append(Node::simple("b"));
        array.append(Node::simple("c"));

        assert!(array.item(0).is_none());
        assert_eq!(array.item(1).map(Node::value), Some("a"));

        // removal compacts the array
        let removed = array.remove_item(2).unwrap();
        assert_eq!(removed.value(), "b");
        assert_eq!(array.item(2).map(Node::value), Some("c"));
        assert!(array.remove_item(3).is_none());
    }

    #[test]
    fn test_structure_keeps_document_order() {
        let mut structure = StructureNode::new();
        structure.set_field("stArea:x", Node::simple("1"));
        structure.set_field("stArea:y", Node::simple("2"));
        structure.set_field("stArea:x", Node::simple("3"));

        let names: Vec<_> = structure.field_names().collect();
        assert_eq!(names, vec!["stArea:x", "stArea:y"]);
        assert_eq!(structure.get_field("stArea:x").map(Node::value), Some("3"));

        structure.remove_field("stArea:x");
        assert!(!structure.has_field("stArea:x"));
    }

    #[test]
    fn test_node_shapes() {
        assert_eq!(Node::simple("v").shape(), PropertyShape::Simple);
        assert_eq!(Node::structure().shape(), PropertyShape::Struct);
        assert_eq!(
            Node::array(ArrayType::Alternative).shape(),
            PropertyShape::Array(ArrayType::Alternative)
        );
        assert!(Node::array(ArrayType::Ordered).shape().is_array());
        assert_eq!(Node::structure().value(), "");
    }

    #[test]
    fn test_array_type_rdf() {
        for ty in [ArrayType::Ordered, ArrayType::Unordered, ArrayType::Alternative] {
            assert_eq!(ArrayType::from_rdf_type(ty.rdf_type()), Some(ty));
        }
        assert_eq!(ArrayType::from_rdf_type("List"), None);
    }
}
