//! XMP XML/RDF serializer
//!
//! This module provides functionality for serializing XMP metadata to XML/RDF format.
//!
//! The output is a single `rdf:Description` inside `x:xmpmeta/rdf:RDF`.
//! Unqualified simple top-level properties become attributes of the
//! description; everything else is written as elements, structs with
//! `rdf:parseType="Resource"`.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{namespace_uri, ns};
use crate::core::node::{ArrayNode, Node, StructureNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::io::Cursor;

const PACKET_HEADER: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>"#;
const PACKET_TRAILER: &str = r#"<?xpacket end="w"?>"#;
const TOOLKIT: &str = concat!("photo-xmp ", env!("CARGO_PKG_VERSION"));

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializer for XMP Packets
pub struct XmpSerializer<'a> {
    root: &'a StructureNode,
    about_uri: &'a str,
}

impl<'a> XmpSerializer<'a> {
    /// Whitespace reserved after the RDF so the packet can grow in place
    pub const DEFAULT_PADDING: usize = 2048;

    /// Create a serializer for a property tree
    pub fn new(root: &'a StructureNode, about_uri: Option<&'a str>) -> Self {
        Self {
            root,
            about_uri: about_uri.unwrap_or_default(),
        }
    }

    /// Serialize the tree to RDF/XML
    pub fn serialize_rdf(&self) -> XmpResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut meta_start = BytesStart::new("x:xmpmeta");
        meta_start.push_attribute(("xmlns:x", ns::X));
        meta_start.push_attribute(("x:xmptk", TOOLKIT));
        writer.write_event(Event::Start(meta_start))?;

        let mut rdf_start = BytesStart::new("rdf:RDF");
        rdf_start.push_attribute(("xmlns:rdf", ns::RDF));
        writer.write_event(Event::Start(rdf_start))?;

        let mut desc_start = BytesStart::new("rdf:Description");
        desc_start.push_attribute(("rdf:about", self.about_uri));
        for (prefix, uri) in self.used_namespaces()? {
            desc_start.push_attribute((format!("xmlns:{}", prefix).as_str(), uri.as_str()));
        }

        let mut elements = Vec::new();
        for (key, node) in &self.root.fields {
            match node {
                Node::Simple(simple) if simple.qualifiers.is_empty() => {
                    desc_start.push_attribute((key.as_str(), simple.value.as_str()));
                }
                _ => elements.push((key, node)),
            }
        }

        // If there are no complex nodes, use Empty (self-closing) tag
        if elements.is_empty() {
            writer.write_event(Event::Empty(desc_start))?;
        } else {
            writer.write_event(Event::Start(desc_start))?;
            for (key, node) in elements {
                serialize_property(&mut writer, key, node)?;
            }
            writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rdf:RDF")))?;
        writer.write_event(Event::End(BytesEnd::new("x:xmpmeta")))?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| XmpError::SerializationError(format!("UTF-8 encoding error: {}", e)))
    }

    /// Serialize to XMP Packet format with `padding` bytes of whitespace
    /// before the trailer
    pub fn serialize_packet(&self, padding: usize) -> XmpResult<String> {
        let rdf_content = self.serialize_rdf()?;

        let mut packet = String::with_capacity(
            PACKET_HEADER.len() + rdf_content.len() + padding + PACKET_TRAILER.len() + 2,
        );
        packet.push_str(PACKET_HEADER);
        packet.push('\n');
        packet.push_str(&rdf_content);
        packet.push('\n');
        push_padding(&mut packet, padding);
        packet.push_str(PACKET_TRAILER);
        Ok(packet)
    }

    /// Every prefix used by a field name below the root, with its URI
    fn used_namespaces(&self) -> XmpResult<Vec<(String, String)>> {
        let mut prefixes = BTreeSet::new();
        collect_prefixes(self.root, &mut prefixes);

        prefixes
            .into_iter()
            .filter(|prefix| *prefix != ns::XML_PREFIX && *prefix != ns::RDF_PREFIX)
            .map(|prefix| {
                let uri = namespace_uri(prefix).ok_or_else(|| {
                    XmpError::SerializationError(format!("Unregistered prefix '{}'", prefix))
                })?;
                Ok((prefix.to_string(), uri))
            })
            .collect()
    }
}

fn collect_prefixes<'n>(structure: &'n StructureNode, out: &mut BTreeSet<&'n str>) {
    for (key, node) in &structure.fields {
        if let Some((prefix, _)) = key.split_once(':') {
            out.insert(prefix);
        }
        collect_node_prefixes(node, out);
    }
}

fn collect_node_prefixes<'n>(node: &'n Node, out: &mut BTreeSet<&'n str>) {
    match node {
        Node::Simple(_) => {}
        Node::Structure(structure) => collect_prefixes(structure, out),
        Node::Array(array) => {
            for item in &array.items {
                collect_node_prefixes(item, out);
            }
        }
    }
}

/// Serialize a node as a property element named `name`
fn serialize_property(writer: &mut XmlWriter, name: &str, node: &Node) -> XmpResult<()> {
    let mut start = BytesStart::new(name);
    add_lang_qualifier_attributes(node, &mut start);
    serialize_value(writer, start, name, node)
}

/// Write the element opened by `start` and the value of `node` inside it
fn serialize_value(
    writer: &mut XmlWriter,
    mut start: BytesStart<'_>,
    name: &str,
    node: &Node,
) -> XmpResult<()> {
    match node {
        Node::Simple(simple) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&simple.value)))?;
        }
        Node::Structure(structure) => {
            start.push_attribute(("rdf:parseType", "Resource"));
            if structure.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            for (key, field) in &structure.fields {
                serialize_property(writer, key, field)?;
            }
        }
        Node::Array(array) => {
            writer.write_event(Event::Start(start))?;
            serialize_array(writer, array)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Serialize an array container and its items
fn serialize_array(writer: &mut XmlWriter, array: &ArrayNode) -> XmpResult<()> {
    let container_name = format!("rdf:{}", array.array_type.rdf_type());
    writer.write_event(Event::Start(BytesStart::new(container_name.as_str())))?;

    for item in &array.items {
        let mut li_start = BytesStart::new("rdf:li");
        add_lang_qualifier_attributes(item, &mut li_start);
        serialize_value(writer, li_start, "rdf:li", item)?;
    }

    writer.write_event(Event::End(BytesEnd::new(container_name.as_str())))?;
    Ok(())
}

/// Add language qualifier attributes to an element
fn add_lang_qualifier_attributes(node: &Node, elem_start: &mut BytesStart<'_>) {
    for qualifier in node.qualifiers() {
        if qualifier.is_lang() {
            elem_start.push_attribute(("xml:lang", qualifier.value.as_str()));
        }
    }
}

/// Append `padding` bytes of whitespace in lines of at most 100 bytes
fn push_padding(packet: &mut String, padding: usize) {
    let mut remaining = padding;
    while remaining > 0 {
        let line = remaining.min(100);
        packet.extend(std::iter::repeat(' ').take(line - 1));
        packet.push('\n');
        remaining -= line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::{ArrayType, SimpleNode};
    use crate::core::parser::XmpParser;
    use crate::types::qualifier::Qualifier;

    fn region_tree() -> StructureNode {
        let mut area = StructureNode::new();
        area.set_field("stArea:x", Node::simple("0.5"));
        area.set_field("stArea:y", Node::simple("0.25"));
        let mut item = StructureNode::new();
        item.set_field("mwg-rs:Name", Node::simple("Ann & Bob"));
        item.set_field("mwg-rs:Area", Node::Structure(area));
        let mut list = ArrayNode::new(ArrayType::Unordered);
        list.append(Node::Structure(item));
        let mut regions = StructureNode::new();
        regions.set_field("mwg-rs:RegionList", Node::Array(list));

        let mut title = SimpleNode::new("Harbour");
        title.qualifiers.push(Qualifier::lang("x-default"));
        let mut alt = ArrayNode::new(ArrayType::Alternative);
        alt.append(Node::Simple(title));

        let mut root = StructureNode::new();
        root.set_field("tiff:Orientation", Node::simple("6"));
        root.set_field("mwg-rs:Regions", Node::Structure(regions));
        root.set_field("dc:title", Node::Array(alt));
        root
    }

    #[test]
    fn test_serialize_empty() {
        let root = StructureNode::new();
        let rdf = XmpSerializer::new(&root, None).serialize_rdf().unwrap();
        assert!(rdf.contains("<rdf:Description rdf:about=\"\"/>"));
    }

    #[test]
    fn test_serialize_declares_used_namespaces() {
        let root = region_tree();
        let rdf = XmpSerializer::new(&root, None).serialize_rdf().unwrap();

        for prefix in ["tiff", "mwg-rs", "stArea", "dc"] {
            assert!(rdf.contains(&format!("xmlns:{}=", prefix)), "{} missing", prefix);
        }
        assert!(rdf.contains("tiff:Orientation=\"6\""));
        assert!(rdf.contains("<rdf:li xml:lang=\"x-default\">Harbour</rdf:li>"));
        assert!(rdf.contains("Ann &amp; Bob"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let root = region_tree();
        let packet = XmpSerializer::new(&root, None).serialize_packet(0).unwrap();
        let parsed = XmpParser::new().parse_packet(&packet).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_serialize_packet_padding() {
        let root = region_tree();
        let serializer = XmpSerializer::new(&root, None);
        let bare = serializer.serialize_packet(0).unwrap();
        let padded = serializer.serialize_packet(250).unwrap();

        assert!(padded.starts_with("<?xpacket begin="));
        assert!(padded.ends_with("<?xpacket end=\"w\"?>"));
        assert_eq!(padded.len(), bare.len() + 250);
    }
}
