//! Depth-first iteration over a property subtree
//!
//! Iteration flattens a subtree into `(schema, path, value)` entries in
//! document order: a node is reported before its fields or items, array
//! items are addressed as `path[n]`, and qualifiers (unless omitted) as
//! `path/?xml:lang`.

use crate::core::node::{Node, PropertyShape};

/// Options for iterating properties
#[derive(Default, Clone, Copy, Debug)]
pub struct IterOptions {
    /// Skip qualifier nodes such as `xml:lang`
    pub omit_qualifiers: bool,
}

impl IterOptions {
    /// Skip qualifier nodes.
    pub fn omit_qualifiers(mut self) -> Self {
        self.omit_qualifiers = true;
        self
    }
}

/// One entry produced by iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpProperty {
    /// Schema URI of the top-level property the entry belongs to
    pub schema: String,
    /// Full path of the entry
    pub path: String,
    /// Leaf value; empty for containers
    pub value: String,
    /// Shape of the node
    pub shape: PropertyShape,
}

/// Iterator over the entries of a subtree
#[derive(Debug, Clone)]
pub struct XmpIterator {
    entries: std::vec::IntoIter<XmpProperty>,
}

impl XmpIterator {
    pub(crate) fn new(entries: Vec<XmpProperty>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl Iterator for XmpIterator {
    type Item = XmpProperty;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for XmpIterator {}

/// Append `node` and everything below it to `out`
pub(crate) fn collect_subtree(
    schema: &str,
    path: &str,
    node: &Node,
    options: IterOptions,
    out: &mut Vec<XmpProperty>,
) {
    out.push(XmpProperty {
        schema: schema.to_string(),
        path: path.to_string(),
        value: node.value().to_string(),
        shape: node.shape(),
    });

    if !options.omit_qualifiers {
        for qualifier in node.qualifiers() {
            out.push(XmpProperty {
                schema: schema.to_string(),
                path: format!("{}/?{}", path, qualifier.qualified_name()),
                value: qualifier.value.clone(),
                shape: PropertyShape::Simple,
            });
        }
    }

    match node {
        Node::Simple(_) => {}
        Node::Structure(structure) => {
            for (name, field) in &structure.fields {
                collect_subtree(schema, &format!("{}/{}", path, name), field, options, out);
            }
        }
        Node::Array(array) => {
            for (i, item) in array.items.iter().enumerate() {
                collect_subtree(schema, &format!("{}[{}]", path, i + 1), item, options, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::{ArrayNode, ArrayType, SimpleNode};
    use crate::types::qualifier::Qualifier;

    fn title() -> Node {
        let mut item = SimpleNode::new("Harbour");
        item.qualifiers.push(Qualifier::lang("x-default"));
        let mut array = ArrayNode::new(ArrayType::Alternative);
        array.append(Node::Simple(item));
        Node::Array(array)
    }

    #[test]
    fn test_items_and_qualifiers() {
        let mut out = Vec::new();
        collect_subtree("dc-uri", "dc:title", &title(), IterOptions::default(), &mut out);

        let paths: Vec<_> = out.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["dc:title", "dc:title[1]", "dc:title[1]/?xml:lang"]);
        assert_eq!(out[1].value, "Harbour");
        assert_eq!(out[2].value, "x-default");
    }

    #[test]
    fn test_omit_qualifiers() {
        let mut out = Vec::new();
        let options = IterOptions::default().omit_qualifiers();
        collect_subtree("dc-uri", "dc:title", &title(), options, &mut out);

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| !p.path.contains('?')));
        assert_eq!(XmpIterator::new(out).len(), 2);
    }
}
