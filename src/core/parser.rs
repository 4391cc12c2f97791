//! XMP XML/RDF parser
//!
//! This module provides functionality for parsing XMP Packets from XML/RDF format.
//!
//! Parsing runs in two passes. The XML is first read into a small element
//! tree with every name resolved to its namespace URI; the RDF rules are
//! then applied to that tree. Supported forms:
//!
//! - simple properties as `rdf:Description` attributes or as elements
//! - `rdf:Seq`, `rdf:Bag` and `rdf:Alt` arrays of `rdf:li` items
//! - structs as `rdf:parseType="Resource"`, nested `rdf:Description` or
//!   attribute shorthand
//! - `rdf:resource` values and `xml:lang` qualifiers

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{ns, register_document_namespace};
use crate::core::node::{ArrayNode, ArrayType, Node, SimpleNode, StructureNode};
use crate::types::qualifier::Qualifier;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parser for XMP Packets
#[derive(Debug, Default)]
pub struct XmpParser {
    about_uri: Option<String>,
}

/// A name resolved against the in-scope namespace declarations
#[derive(Debug, Clone)]
struct XmlName {
    uri: String,
    prefix: String,
    local: String,
}

impl XmlName {
    fn is(&self, uri: &str, local: &str) -> bool {
        self.uri == uri && self.local == local
    }
}

#[derive(Debug)]
struct XmlAttribute {
    name: XmlName,
    value: String,
}

#[derive(Debug)]
struct XmlElement {
    name: XmlName,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn attribute(&self, uri: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(uri, local))
            .map(|a| a.value.as_str())
    }

    /// Attributes that are properties rather than RDF or XML syntax
    fn property_attributes(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.attributes
            .iter()
            .filter(|a| a.name.uri != ns::RDF && a.name.uri != ns::XML && !a.name.uri.is_empty())
    }
}

impl XmpParser {
    /// Create a new XMP parser
    pub fn new() -> Self {
        Self::default()
    }

    /// The `rdf:about` value of the last parsed packet
    pub fn about_uri(&self) -> Option<&str> {
        self.about_uri.as_deref()
    }

    /// Parse an XMP Packet from a string
    ///
    /// This function extracts the XMP Packet from the `<?xpacket>` wrapper
    /// and parses the RDF/XML content.
    pub fn parse_packet(&mut self, xml: &str) -> XmpResult<StructureNode> {
        let packet_content = self.extract_packet_content(xml)?;
        self.parse_rdf(packet_content)
    }

    /// Extract the XMP Packet content from the `<?xpacket>` wrapper
    fn extract_packet_content<'a>(&self, xml: &'a str) -> XmpResult<&'a str> {
        let Some(start_pos) = xml.find("<?xpacket") else {
            return self.validate_and_return_xml(xml);
        };

        let Some(end_pos) = xml[start_pos..].find("?>") else {
            return self.validate_and_return_xml(xml);
        };

        let pi_end = start_pos + end_pos + 2;
        let Some(close_pos) = xml[pi_end..].find("<?xpacket end") else {
            return self.validate_and_return_xml(xml);
        };

        Ok(xml[pi_end..pi_end + close_pos].trim())
    }

    /// Validate XML content and return it if valid
    fn validate_and_return_xml<'a>(&self, xml: &'a str) -> XmpResult<&'a str> {
        let trimmed = xml.trim_start_matches('\u{feff}').trim();
        if !trimmed.starts_with('<') {
            return Err(XmpError::ParseError("Invalid XML content".to_string()));
        }
        Ok(trimmed)
    }

    /// Parse RDF/XML content into a StructureNode
    fn parse_rdf(&mut self, xml: &str) -> XmpResult<StructureNode> {
        let document = read_element_tree(xml)?;
        let rdf = find_rdf(&document)
            .ok_or_else(|| XmpError::ParseError("No rdf:RDF element found".to_string()))?;

        let mut root = StructureNode::new();
        for description in &rdf.children {
            if !description.name.is(ns::RDF, "Description") {
                log::warn!(
                    "skipping unexpected <{}:{}> below rdf:RDF",
                    description.name.prefix,
                    description.name.local
                );
                continue;
            }
            if let Some(about) = description.attribute(ns::RDF, "about") {
                self.about_uri = Some(about.to_string());
            }
            for attr in description.property_attributes() {
                root.set_field(qualified_name(&attr.name), Node::simple(attr.value.clone()));
            }
            for child in &description.children {
                root.set_field(qualified_name(&child.name), parse_property(child));
            }
        }
        Ok(root)
    }
}

/// Find `rdf:RDF` at the document root or below the `x:xmpmeta` wrapper
fn find_rdf(element: &XmlElement) -> Option<&XmlElement> {
    if element.name.is(ns::RDF, "RDF") {
        return Some(element);
    }
    element.children.iter().find_map(find_rdf)
}

/// Turn one property element into a node
fn parse_property(element: &XmlElement) -> Node {
    let qualifiers: Vec<Qualifier> = element
        .attribute(ns::XML, "lang")
        .map(|lang| vec![Qualifier::lang(lang)])
        .unwrap_or_default();

    let mut node = if let Some(resource) = element.attribute(ns::RDF, "resource") {
        Node::simple(resource)
    } else if element.attribute(ns::RDF, "parseType") == Some("Resource") {
        Node::Structure(parse_fields(element))
    } else if let Some(first) = element.children.first() {
        if let Some(array_type) = array_type_of(first) {
            let mut array = ArrayNode::new(array_type);
            for item in first.children.iter().filter(|c| c.name.is(ns::RDF, "li")) {
                array.append(parse_property(item));
            }
            Node::Array(array)
        } else if first.name.is(ns::RDF, "Description") {
            Node::Structure(parse_fields(first))
        } else {
            Node::Structure(parse_fields(element))
        }
    } else if element.property_attributes().next().is_some() {
        Node::Structure(parse_fields(element))
    } else {
        Node::Simple(SimpleNode::new(element.text.clone()))
    };

    match &mut node {
        Node::Simple(simple) => simple.qualifiers = qualifiers,
        Node::Array(array) => array.qualifiers = qualifiers,
        Node::Structure(structure) => structure.qualifiers = qualifiers,
    }
    node
}

/// Struct fields from property attributes and child elements
fn parse_fields(element: &XmlElement) -> StructureNode {
    let mut fields = StructureNode::new();
    for attr in element.property_attributes() {
        fields.set_field(qualified_name(&attr.name), Node::simple(attr.value.clone()));
    }
    for child in &element.children {
        fields.set_field(qualified_name(&child.name), parse_property(child));
    }
    fields
}

fn array_type_of(element: &XmlElement) -> Option<ArrayType> {
    if element.name.uri != ns::RDF {
        return None;
    }
    ArrayType::from_rdf_type(&element.name.local)
}

/// Tree key for a name: the registered prefix of its URI plus the local name
fn qualified_name(name: &XmlName) -> String {
    let prefix = register_document_namespace(&name.uri, &name.prefix);
    format!("{}:{}", prefix, name.local)
}

/// Read `xml` into an element tree with resolved namespaces
fn read_element_tree(xml: &str) -> XmpResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    // Text is kept as-is: entity references arrive as separate events and
    // trimming would eat the spaces around them.
    reader.config_mut().trim_text(false);

    let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
    let mut open: Vec<XmlElement> = Vec::new();
    let mut document: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let element = open_element(&e, &mut scopes)?;
                open.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = open_element(&e, &mut scopes)?;
                scopes.pop();
                close_element(element, &mut open, &mut document);
            }
            Ok(Event::End(_)) => {
                scopes.pop();
                let element = open
                    .pop()
                    .ok_or_else(|| XmpError::ParseError("Unbalanced end tag".to_string()))?;
                close_element(element, &mut open, &mut document);
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = open.last_mut() {
                    let raw_text = String::from_utf8_lossy(e.as_ref());
                    match unescape(&raw_text) {
                        Ok(text) => current.text.push_str(&text),
                        Err(_) => current.text.push_str(&raw_text),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(current) = open.last_mut() {
                    let name = String::from_utf8_lossy(&e);
                    current.text.push(resolve_reference(&name)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmpError::ParseError(format!("XML parsing error: {}", e)));
            }
            _ => {}
        }
        buf.clear();
    }

    if !open.is_empty() {
        return Err(XmpError::ParseError("Unclosed element".to_string()));
    }
    document.ok_or_else(|| XmpError::ParseError("Empty XML document".to_string()))
}

fn open_element(e: &BytesStart<'_>, scopes: &mut Vec<Vec<(String, String)>>) -> XmpResult<XmlElement> {
    let raw_attributes = collect_attributes(e)?;

    let declared = raw_attributes
        .iter()
        .filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((String::new(), value.clone()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix.to_string(), value.clone()))
            }
        })
        .collect();
    scopes.push(declared);

    let name = resolve_name(&String::from_utf8_lossy(e.name().as_ref()), scopes, true)?;
    let mut attributes = Vec::new();
    for (key, value) in raw_attributes {
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        // Unprefixed attributes have no namespace, except the legacy
        // unprefixed rdf attributes some writers still emit.
        let name = match resolve_name(&key, scopes, false)? {
            name if name.uri.is_empty() && matches!(key.as_str(), "about" | "parseType" | "resource") => {
                XmlName {
                    uri: ns::RDF.to_string(),
                    prefix: ns::RDF_PREFIX.to_string(),
                    local: key,
                }
            }
            name => name,
        };
        attributes.push(XmlAttribute { name, value });
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close_element(element: XmlElement, open: &mut [XmlElement], document: &mut Option<XmlElement>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if document.is_none() {
                *document = Some(element);
            }
        }
    }
}

/// Collect attributes from XML element
fn collect_attributes(e: &BytesStart<'_>) -> XmpResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmpError::ParseError(format!("Bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        // Decode XML entities in attribute values (e.g., &quot; -> ")
        let raw_value = String::from_utf8_lossy(attr.value.as_ref());
        let value = match unescape(&raw_value) {
            Ok(unescaped) => unescaped.to_string(),
            Err(_) => raw_value.to_string(),
        };
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn resolve_name(raw: &str, scopes: &[Vec<(String, String)>], use_default: bool) -> XmpResult<XmlName> {
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", raw),
    };

    let uri = if prefix == ns::XML_PREFIX {
        Some(ns::XML.to_string())
    } else if prefix.is_empty() && !use_default {
        Some(String::new())
    } else {
        scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
    };

    match uri {
        Some(uri) => Ok(XmlName {
            uri,
            prefix: prefix.to_string(),
            local: local.to_string(),
        }),
        None if prefix.is_empty() => Ok(XmlName {
            uri: String::new(),
            prefix: String::new(),
            local: local.to_string(),
        }),
        None => Err(XmpError::ParseError(format!(
            "Undeclared namespace prefix '{}'",
            prefix
        ))),
    }
}

/// Resolve `&name;` where `name` is a predefined entity or a character reference
fn resolve_reference(name: &str) -> XmpResult<char> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|code| {
            let code = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }),
    };
    resolved.ok_or_else(|| XmpError::ParseError(format!("Unknown entity '&{};'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> StructureNode {
        XmpParser::new().parse_packet(xml).unwrap()
    }

    #[test]
    fn test_extract_packet_content() {
        let parser = XmpParser::new();
        let xml = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<rdf:RDF>...</rdf:RDF>
<?xpacket end="w"?>"#;

        let content = parser.extract_packet_content(xml).unwrap();
        assert!(content.starts_with("<rdf:RDF>"));
        assert!(parser.extract_packet_content("not xml").is_err());
    }

    #[test]
    fn test_parse_simple_rdf() {
        let mut parser = XmpParser::new();
        let root = parser
            .parse_packet(
                r#"
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="MyApp"/>
</rdf:RDF>"#,
            )
            .unwrap();

        assert_eq!(root.get_field("xmp:CreatorTool").map(Node::value), Some("MyApp"));
        assert_eq!(parser.about_uri(), Some(""));
    }

    #[test]
    fn test_parse_document_prefix_is_canonicalized() {
        let root = parse(
            r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="" xmlns:t="http://ns.adobe.com/tiff/1.0/">
    <t:Orientation>6</t:Orientation>
  </rdf:Description>
</rdf:RDF>
</x:xmpmeta>"#,
        );
        assert_eq!(root.get_field("tiff:Orientation").map(Node::value), Some("6"));
    }

    #[test]
    fn test_parse_arrays_and_lang() {
        let root = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="">
    <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Fish &amp; Chips</rdf:li></rdf:Alt></dc:title>
    <dc:subject><rdf:Bag><rdf:li>sea</rdf:li><rdf:li>boat</rdf:li></rdf:Bag></dc:subject>
  </rdf:Description>
</rdf:RDF>"#,
        );

        let title = root.get_field("dc:title").and_then(Node::as_array).unwrap();
        assert_eq!(title.array_type, ArrayType::Alternative);
        let item = title.item(1).and_then(Node::as_simple).unwrap();
        assert_eq!(item.value, "Fish & Chips");
        assert_eq!(item.lang(), Some("x-default"));

        let subject = root.get_field("dc:subject").and_then(Node::as_array).unwrap();
        assert_eq!(subject.array_type, ArrayType::Unordered);
        assert_eq!(subject.len(), 2);
    }

    #[test]
    fn test_parse_region_structs() {
        let root = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:mwg-rs="http://www.metadataworkinggroup.com/schemas/regions/"
         xmlns:stDim="http://ns.adobe.com/xap/1.0/sType/Dimensions#"
         xmlns:stArea="http://ns.adobe.com/xmp/sType/Area#">
  <rdf:Description rdf:about="">
    <mwg-rs:Regions rdf:parseType="Resource">
      <mwg-rs:AppliedToDimensions stDim:w="200" stDim:h="100"/>
      <mwg-rs:RegionList>
        <rdf:Bag>
          <rdf:li>
            <rdf:Description mwg-rs:Name="Ann" mwg-rs:Type="Face">
              <mwg-rs:Area stArea:x="0.5" stArea:y="0.5" stArea:w="0.1" stArea:h="0.2"/>
            </rdf:Description>
          </rdf:li>
        </rdf:Bag>
      </mwg-rs:RegionList>
    </mwg-rs:Regions>
  </rdf:Description>
</rdf:RDF>"#,
        );

        let regions = root.get_field("mwg-rs:Regions").and_then(Node::as_structure).unwrap();
        let dims = regions
            .get_field("mwg-rs:AppliedToDimensions")
            .and_then(Node::as_structure)
            .unwrap();
        assert_eq!(dims.get_field("stDim:w").map(Node::value), Some("200"));

        let list = regions.get_field("mwg-rs:RegionList").and_then(Node::as_array).unwrap();
        let item = list.item(1).and_then(Node::as_structure).unwrap();
        assert_eq!(item.get_field("mwg-rs:Name").map(Node::value), Some("Ann"));
        let area = item.get_field("mwg-rs:Area").and_then(Node::as_structure).unwrap();
        assert_eq!(area.get_field("stArea:h").map(Node::value), Some("0.2"));
    }

    #[test]
    fn test_parse_errors() {
        let mut parser = XmpParser::new();
        assert!(parser.parse_packet("<a><b></a>").is_err());
        assert!(parser.parse_packet("<root/>").is_err());
        assert!(parser.parse_packet("<p:x/>").is_err());
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("#x41").unwrap(), 'A');
        assert_eq!(resolve_reference("#66").unwrap(), 'B');
        assert!(resolve_reference("nbsp").is_err());
    }
}
