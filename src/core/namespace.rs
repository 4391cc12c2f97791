//! Namespace management for XMP
//!
//! Every schema used by the tag registry has a URI and a preferred prefix.
//! Property paths are written with prefixes (`mwg-rs:Regions/...`), so the
//! store needs both directions of the mapping. Namespaces found while
//! parsing a packet are registered here as well.

use crate::core::error::{XmpError, XmpResult};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

// Global namespace registry for thread safety
static GLOBAL_NAMESPACE_MAP: OnceLock<RwLock<NamespaceMap>> = OnceLock::new();

/// Built-in XMP namespaces
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// IPTC Extension namespace
    pub const IPTC_EXT: &str = "http://iptc.org/std/Iptc4xmpExt/2008-02-29/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// Metadata Working Group regions namespace
    pub const MWG_RS: &str = "http://www.metadataworkinggroup.com/schemas/regions/";
    /// Dimensions struct type namespace
    pub const ST_DIM: &str = "http://ns.adobe.com/xap/1.0/sType/Dimensions#";
    /// Area struct type namespace
    pub const ST_AREA: &str = "http://ns.adobe.com/xmp/sType/Area#";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang, etc.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Adobe meta wrapper namespace (`x:xmpmeta`)
    pub const X: &str = "adobe:ns:meta/";

    /// XMP prefix
    pub const XMP_PREFIX: &str = "xmp";
    /// Dublin Core prefix
    pub const DC_PREFIX: &str = "dc";
    /// EXIF prefix
    pub const EXIF_PREFIX: &str = "exif";
    /// TIFF prefix
    pub const TIFF_PREFIX: &str = "tiff";
    /// Photoshop prefix
    pub const PHOTOSHOP_PREFIX: &str = "photoshop";
    /// IPTC Core prefix
    pub const IPTC_CORE_PREFIX: &str = "Iptc4xmpCore";
    /// IPTC Extension prefix
    pub const IPTC_EXT_PREFIX: &str = "Iptc4xmpExt";
    /// XMP Rights prefix
    pub const XMP_RIGHTS_PREFIX: &str = "xmpRights";
    /// XMP Media Management prefix
    pub const XMP_MM_PREFIX: &str = "xmpMM";
    /// MWG regions prefix
    pub const MWG_RS_PREFIX: &str = "mwg-rs";
    /// Dimensions prefix
    pub const ST_DIM_PREFIX: &str = "stDim";
    /// Area prefix
    pub const ST_AREA_PREFIX: &str = "stArea";
    /// RDF prefix
    pub const RDF_PREFIX: &str = "rdf";
    /// XML prefix
    pub const XML_PREFIX: &str = "xml";
    /// Adobe meta wrapper prefix
    pub const X_PREFIX: &str = "x";
}

const BUILTIN_NAMESPACES: &[(&str, &str)] = &[
    (ns::XMP, ns::XMP_PREFIX),
    (ns::DC, ns::DC_PREFIX),
    (ns::EXIF, ns::EXIF_PREFIX),
    (ns::TIFF, ns::TIFF_PREFIX),
    (ns::PHOTOSHOP, ns::PHOTOSHOP_PREFIX),
    (ns::IPTC_CORE, ns::IPTC_CORE_PREFIX),
    (ns::IPTC_EXT, ns::IPTC_EXT_PREFIX),
    (ns::XMP_RIGHTS, ns::XMP_RIGHTS_PREFIX),
    (ns::XMP_MM, ns::XMP_MM_PREFIX),
    (ns::MWG_RS, ns::MWG_RS_PREFIX),
    (ns::ST_DIM, ns::ST_DIM_PREFIX),
    (ns::ST_AREA, ns::ST_AREA_PREFIX),
    (ns::RDF, ns::RDF_PREFIX),
    (ns::XML, ns::XML_PREFIX),
    (ns::X, ns::X_PREFIX),
];

/// Two-way map between namespace URIs and prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl NamespaceMap {
    /// Create a new namespace map with built-in namespaces registered
    pub fn new() -> Self {
        let mut map = Self::default();
        for (uri, prefix) in BUILTIN_NAMESPACES {
            map.insert(uri, prefix);
        }
        map
    }

    /// Register a namespace URI with a prefix
    ///
    /// Returns an error if the prefix is already bound to a different URI.
    /// Registering a URI that already has a prefix keeps the existing one.
    pub fn register(&mut self, uri: &str, prefix: &str) -> XmpResult<()> {
        if let Some(existing_uri) = self.prefix_to_uri.get(prefix) {
            if existing_uri != uri {
                return Err(XmpError::BadParam(format!(
                    "Prefix '{}' is already registered to '{}'",
                    prefix, existing_uri
                )));
            }
            return Ok(());
        }
        if self.uri_to_prefix.contains_key(uri) {
            return Ok(());
        }

        self.insert(uri, prefix);
        Ok(())
    }

    /// Register a URI found in a document, inventing a fresh prefix when the
    /// suggested one is taken. Returns the prefix that ends up bound.
    pub fn register_suggested(&mut self, uri: &str, suggested: &str) -> String {
        if let Some(prefix) = self.uri_to_prefix.get(uri) {
            return prefix.clone();
        }

        let mut prefix = suggested.to_string();
        let mut n = 1;
        while self.prefix_to_uri.contains_key(&prefix) {
            prefix = format!("{suggested}{n}");
            n += 1;
        }
        self.insert(uri, &prefix);
        prefix
    }

    fn insert(&mut self, uri: &str, prefix: &str) {
        self.uri_to_prefix
            .insert(uri.to_string(), prefix.to_string());
        self.prefix_to_uri
            .insert(prefix.to_string(), uri.to_string());
    }

    /// Get the prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(|s| s.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(|s| s.as_str())
    }

    /// Check if a namespace URI is registered
    pub fn has_uri(&self, uri: &str) -> bool {
        self.uri_to_prefix.contains_key(uri)
    }

    /// Check if a namespace prefix is registered
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix_to_uri.contains_key(prefix)
    }
}

fn get_global_namespace_map() -> &'static RwLock<NamespaceMap> {
    GLOBAL_NAMESPACE_MAP.get_or_init(|| RwLock::new(NamespaceMap::new()))
}

/// Register a namespace URI with a prefix in the process-wide registry
pub fn register_namespace(uri: &str, prefix: &str) -> XmpResult<()> {
    if uri.is_empty() {
        return Err(XmpError::BadParam("URI cannot be empty".to_string()));
    }
    if prefix.is_empty() || prefix.contains(':') {
        return Err(XmpError::BadParam(format!("Invalid prefix '{}'", prefix)));
    }

    // The map is never left half-updated, so a poisoned lock is still usable
    let mut guard = get_global_namespace_map()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    guard.register(uri, prefix)
}

/// Register a namespace seen in a document and return its bound prefix
pub(crate) fn register_document_namespace(uri: &str, suggested: &str) -> String {
    let mut guard = get_global_namespace_map()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    guard.register_suggested(uri, suggested)
}

/// Check if a namespace URI is registered globally
pub fn is_namespace_registered(uri: &str) -> bool {
    let guard = get_global_namespace_map()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    guard.has_uri(uri)
}

/// Get the prefix for a namespace URI from the global registry
pub fn namespace_prefix(uri: &str) -> Option<String> {
    let guard = get_global_namespace_map()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    guard.get_prefix(uri).map(|s| s.to_string())
}

/// Get the URI for a namespace prefix from the global registry
pub fn namespace_uri(prefix: &str) -> Option<String> {
    let guard = get_global_namespace_map()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    guard.get_uri(prefix).map(|s| s.to_string())
}
