//! Path walking over the property tree
//!
//! The root is a `StructureNode` whose fields are the top-level properties of
//! every schema, keyed by qualified name. Paths are walked one component at a
//! time; the write walk creates what is missing on the way down.

use crate::core::error::{XmpError, XmpResult};
use crate::core::node::{ArrayType, Node, StructureNode};
use crate::core::xpath::{build_path, PathComponent, PathComponents};

/// Find the node addressed by `path`
pub(super) fn find<'a>(root: &'a StructureNode, path: &PathComponents) -> Option<&'a Node> {
    let (first, rest) = path.components.split_first()?;
    let PathComponent::Name(name) = first else {
        return None;
    };

    let mut current = root.get_field(name)?;
    for comp in rest {
        current = match comp {
            PathComponent::Name(field) => current.as_structure()?.get_field(field)?,
            PathComponent::Index(index) => current.as_array()?.item(*index)?,
        };
    }
    Some(current)
}

/// Find the node addressed by `path`, creating missing intermediate nodes
///
/// Missing struct fields become structs or unordered arrays depending on
/// the next step; an index one past the end appends a new item. The leaf
/// itself is created as an empty simple node for the caller to replace.
pub(super) fn find_or_create<'a>(
    root: &'a mut StructureNode,
    path: &PathComponents,
) -> XmpResult<&'a mut Node> {
    let comps = &path.components;
    let Some(PathComponent::Name(name)) = comps.first() else {
        return Err(XmpError::BadXPath(format!(
            "Path must start with a property name: {}",
            build_path(path)
        )));
    };

    let mut current = field_or_insert(root, name, comps.get(1));
    for (i, comp) in comps.iter().enumerate().skip(1) {
        let next = comps.get(i + 1);
        current = match comp {
            PathComponent::Name(field) => {
                let structure = current.as_structure_mut().ok_or_else(|| {
                    XmpError::BadXPath(format!(
                        "'{}' is not a struct in {}",
                        field,
                        build_path(path)
                    ))
                })?;
                field_or_insert(structure, field, next)
            }
            PathComponent::Index(index) => {
                let array = current.as_array_mut().ok_or_else(|| {
                    XmpError::BadXPath(format!("Indexing a non-array in {}", build_path(path)))
                })?;
                if *index == array.len() + 1 {
                    array.append(placeholder(next));
                }
                array.item_mut(*index).ok_or_else(|| {
                    XmpError::BadXPath(format!(
                        "Index {} is past the end of the array in {}",
                        index,
                        build_path(path)
                    ))
                })?
            }
        };
    }
    Ok(current)
}

/// Remove the node addressed by `path`; returns whether something was removed
pub(super) fn remove(root: &mut StructureNode, path: &PathComponents) -> bool {
    let Some((last, parent_comps)) = path.components.split_last() else {
        return false;
    };

    if parent_comps.is_empty() {
        return match last {
            PathComponent::Name(name) => root.remove_field(name).is_some(),
            PathComponent::Index(_) => false,
        };
    }

    let parent_path = PathComponents {
        components: parent_comps.to_vec(),
    };
    let Some(parent) = find_mut(root, &parent_path) else {
        return false;
    };
    match last {
        PathComponent::Name(field) => parent
            .as_structure_mut()
            .and_then(|s| s.remove_field(field))
            .is_some(),
        PathComponent::Index(index) => parent
            .as_array_mut()
            .and_then(|a| a.remove_item(*index))
            .is_some(),
    }
}

fn find_mut<'a>(root: &'a mut StructureNode, path: &PathComponents) -> Option<&'a mut Node> {
    let (first, rest) = path.components.split_first()?;
    let PathComponent::Name(name) = first else {
        return None;
    };

    let mut current = root.get_field_mut(name)?;
    for comp in rest {
        current = match comp {
            PathComponent::Name(field) => current.as_structure_mut()?.get_field_mut(field)?,
            PathComponent::Index(index) => current.as_array_mut()?.item_mut(*index)?,
        };
    }
    Some(current)
}

fn field_or_insert<'a>(
    structure: &'a mut StructureNode,
    name: &str,
    next: Option<&PathComponent>,
) -> &'a mut Node {
    let pos = match structure.fields.iter().position(|(k, _)| k == name) {
        Some(pos) => pos,
        None => {
            structure.fields.push((name.to_string(), placeholder(next)));
            structure.fields.len() - 1
        }
    };
    &mut structure.fields[pos].1
}

fn placeholder(next: Option<&PathComponent>) -> Node {
    match next {
        Some(PathComponent::Index(_)) => Node::array(ArrayType::Unordered),
        Some(PathComponent::Name(_)) => Node::structure(),
        None => Node::simple(""),
    }
}
