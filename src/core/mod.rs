//! XMP Core module
//!
//! This module contains the core functionality for XMP metadata processing,
//! including parsing, manipulation, and serialization.

pub mod error;
pub mod iterator;
pub mod metadata;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod xpath;

pub use error::{XmpError, XmpResult};
pub use iterator::{IterOptions, XmpIterator, XmpProperty};
pub use metadata::XmpMeta;
pub use namespace::{is_namespace_registered, namespace_prefix, namespace_uri, register_namespace, NamespaceMap};
pub use node::{ArrayNode, ArrayType, Node, PropertyShape, SimpleNode, StructureNode};
pub use parser::XmpParser;
pub use serializer::XmpSerializer;
pub use xpath::{build_path, parse_path, PathComponent, PathComponents};
