//! XMP packet location inside arbitrary file content
//!
//! A packet is the byte range from `<?xpacket begin=...?>` through the
//! closing `<?xpacket end="w"?>` (or `"r"` for read-only packets). Files may
//! contain binary data around the packet, so the search works on bytes.

use crate::core::error::{XmpError, XmpResult};
use crate::core::metadata::XmpMeta;

const PACKET_START: &[u8] = b"<?xpacket begin";
const PACKET_END: &[u8] = b"<?xpacket end";

/// Where a packet sits in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    /// Byte offset of `<?xpacket begin`
    pub offset: usize,
    /// Bytes up to and including the closing `?>` of the end marker
    pub length: usize,
    /// `end="w"`; read-only packets must not be rewritten in place
    pub writable: bool,
}

impl PacketInfo {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }

    /// Whether this packet covers the whole of `data`, ignoring
    /// surrounding whitespace and a UTF-8 byte order mark
    pub fn spans(&self, data: &[u8]) -> bool {
        let before = &data[..self.offset];
        let before = before.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(before);
        let after = &data[self.offset + self.length..];
        before.iter().all(u8::is_ascii_whitespace) && after.iter().all(u8::is_ascii_whitespace)
    }
}

/// Iterator over the well-formed packet markers in a byte buffer
pub struct PacketScanner<'a> {
    data: &'a [u8],
    search_pos: usize,
}

impl<'a> PacketScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, search_pos: 0 }
    }
}

impl Iterator for PacketScanner<'_> {
    type Item = PacketInfo;

    fn next(&mut self) -> Option<PacketInfo> {
        let data = self.data;
        while self.search_pos < data.len() {
            let start = self.search_pos + find(&data[self.search_pos..], PACKET_START)?;
            let Some(end_offset) = find(&data[start..], PACKET_END) else {
                self.search_pos = data.len();
                return None;
            };
            let end_marker = start + end_offset;

            // the end marker closes at the first "?>" and names its access mode
            let Some(close) = find(&data[end_marker..], b"?>") else {
                self.search_pos = data.len();
                return None;
            };
            let attributes = &data[end_marker + PACKET_END.len()..end_marker + close];
            let writable = match attributes.trim_ascii() {
                b"end=\"w\"" | b"end='w'" => true,
                b"end=\"r\"" | b"end='r'" => false,
                _ => {
                    self.search_pos = start + 1;
                    continue;
                }
            };

            let packet_end = end_marker + close + 2;
            self.search_pos = packet_end;
            return Some(PacketInfo {
                offset: start,
                length: packet_end - start,
                writable,
            });
        }
        None
    }
}

/// First packet in `data` that parses, with its location
pub fn find_packet(data: &[u8]) -> Option<(PacketInfo, XmpMeta)> {
    PacketScanner::new(data).find_map(|info| {
        let text = std::str::from_utf8(&data[info.range()]).ok()?;
        match XmpMeta::parse(text) {
            Ok(meta) => Some((info, meta)),
            Err(e) => {
                log::debug!("skipping unparsable packet at offset {}: {}", info.offset, e);
                None
            }
        }
    })
}

/// Serialize `meta` into exactly `length` bytes, padding with whitespace
///
/// Fails with [`XmpError::NotSupported`] when the serialization does not fit.
pub fn render_fixed_size(meta: &XmpMeta, length: usize) -> XmpResult<String> {
    let minimal = meta.serialize_packet_with_padding(0)?;
    if minimal.len() > length {
        return Err(XmpError::NotSupported(format!(
            "Packet needs {} bytes but only {} are available in place",
            minimal.len(),
            length
        )));
    }
    meta.serialize_packet_with_padding(length - minimal.len())
}

/// Minimal serialized size of `meta` as a packet
pub fn packet_size(meta: &XmpMeta) -> XmpResult<usize> {
    Ok(meta.serialize_packet_with_padding(0)?.len())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::ns;

    fn packet(body: &str, mode: char) -> String {
        format!(
            "<?xpacket begin=\"\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>{}<?xpacket end=\"{}\"?>",
            body, mode
        )
    }

    const BODY: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/" xmp:Rating="3"/></rdf:RDF></x:xmpmeta>"#;

    #[test]
    fn test_scan_embedded() {
        let mut data = b"\x00\x01binary".to_vec();
        let text = packet(BODY, 'w');
        data.extend_from_slice(text.as_bytes());
        data.extend_from_slice(b"\xff\xfe tail");

        let infos: Vec<_> = PacketScanner::new(&data).collect();
        assert_eq!(
            infos,
            vec![PacketInfo {
                offset: 8,
                length: text.len(),
                writable: true
            }]
        );
        assert!(!infos[0].spans(&data));

        let (info, meta) = find_packet(&data).unwrap();
        assert_eq!(info.offset, 8);
        assert_eq!(meta.get_property(ns::XMP, "Rating").unwrap().value, "3");
    }

    #[test]
    fn test_scan_read_only_and_whole_file() {
        let text = format!("\u{feff}\n{}\n", packet(BODY, 'r'));
        let info = PacketScanner::new(text.as_bytes()).next().unwrap();
        assert!(!info.writable);
        assert!(info.spans(text.as_bytes()));
    }

    #[test]
    fn test_scan_skips_broken_markers() {
        let data = b"<?xpacket begin=\"\"?> no end here";
        assert_eq!(PacketScanner::new(data).next(), None);
        assert!(find_packet(b"nothing at all").is_none());

        // a malformed first packet does not hide a later good one
        let data = format!("{}{}", packet("<junk", 'w'), packet(BODY, 'w'));
        let (info, _) = find_packet(data.as_bytes()).unwrap();
        assert!(info.offset > 0);
    }

    #[test]
    fn test_render_fixed_size() {
        let meta = XmpMeta::parse(BODY).unwrap();
        let needed = packet_size(&meta).unwrap();

        let rendered = render_fixed_size(&meta, needed + 250).unwrap();
        assert_eq!(rendered.len(), needed + 250);
        let reparsed = XmpMeta::parse(&rendered).unwrap();
        assert_eq!(reparsed.get_property(ns::XMP, "Rating").unwrap().value, "3");

        assert!(matches!(
            render_fixed_size(&meta, needed - 1),
            Err(XmpError::NotSupported(_))
        ));
    }
}
