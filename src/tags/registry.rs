//! Tag registry
//!
//! Maps each [`Tag`] to the XMP properties that carry it, and each
//! [`RegionField`] to its (optionally indexed) property below
//! `mwg-rs:Regions`. The tables are built once and never change.

use crate::core::namespace::ns;
use crate::tags::tag::{RegionField, Tag};
use std::collections::HashMap;
use std::sync::OnceLock;

static SHARED_REGISTRY: OnceLock<TagRegistry> = OnceLock::new();

/// Path of the struct holding every region field
pub const REGIONS_ROOT: &str = "mwg-rs:Regions";

/// How a property's value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    PlainString,
    StringList,
    Struct,
    Array,
    LocalizedText,
    Real,
    Integer,
}

/// One XMP property carrying a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Schema namespace URI
    pub schema: &'static str,
    /// Qualified property path
    pub path: &'static str,
    pub kind: ValueKind,
    /// Only consulted on read; writes and removals skip it
    pub read_only: bool,
}

impl PropertyDescriptor {
    const fn new(schema: &'static str, path: &'static str, kind: ValueKind) -> Self {
        Self {
            schema,
            path,
            kind,
            read_only: false,
        }
    }

    const fn read_fallback(schema: &'static str, path: &'static str) -> Self {
        Self {
            schema,
            path,
            kind: ValueKind::PlainString,
            read_only: true,
        }
    }
}

/// A property of the region structure
///
/// Indexed descriptors address `path_prefix + n + path_suffix` for the
/// 1-based region number `n`. A descriptor with an empty prefix is not
/// indexed and its suffix is the whole path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPropertyDescriptor {
    pub schema: &'static str,
    pub path_prefix: &'static str,
    pub path_suffix: &'static str,
    pub kind: ValueKind,
}

impl RegionPropertyDescriptor {
    /// Whether the path carries a region index
    pub fn is_indexed(&self) -> bool {
        !self.path_prefix.is_empty()
    }

    /// Path for the region at 0-based `index`; ignored for unindexed fields
    pub fn path_for(&self, index: usize) -> String {
        if self.is_indexed() {
            format!("{}{}{}", self.path_prefix, index + 1, self.path_suffix)
        } else {
            self.path_suffix.to_string()
        }
    }

    /// The 1-based region number if `path` is exactly this template
    pub fn match_index(&self, path: &str) -> Option<usize> {
        if !self.is_indexed() {
            return None;
        }
        let digits = path
            .strip_prefix(self.path_prefix)?
            .strip_suffix(self.path_suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|n| *n > 0)
    }
}

/// Immutable tag and region descriptor tables
#[derive(Debug, Clone)]
pub struct TagRegistry {
    tags: HashMap<Tag, Vec<PropertyDescriptor>>,
    regions: [RegionPropertyDescriptor; 12],
}

impl TagRegistry {
    /// Build the registry
    pub fn new() -> Self {
        let mut tags: HashMap<Tag, Vec<PropertyDescriptor>> = HashMap::new();
        // insertion order is read order
        let mut insert = |tag: Tag, descriptor: PropertyDescriptor| {
            tags.entry(tag).or_default().push(descriptor)
        };

        use PropertyDescriptor as P;
        use ValueKind::*;

        insert(Tag::Creator, P::new(ns::DC, "dc:creator", PlainString));
        insert(Tag::Subject, P::new(ns::DC, "dc:subject", StringList));
        insert(Tag::City, P::new(ns::PHOTOSHOP, "photoshop:City", PlainString));
        insert(
            Tag::City,
            P::new(ns::IPTC_CORE, "Iptc4xmpCore:LocationShownCity", PlainString),
        );
        insert(Tag::Country, P::new(ns::PHOTOSHOP, "photoshop:Country", PlainString));
        insert(
            Tag::Country,
            P::new(ns::IPTC_CORE, "Iptc4xmpCore:LocationShownCountry", PlainString),
        );
        insert(
            Tag::Location,
            P::new(ns::IPTC_CORE, "Iptc4xmpCore:LocationShownSublocation", PlainString),
        );
        insert(Tag::Rating, P::new(ns::XMP, "xmp:Rating", PlainString));
        insert(Tag::Timestamp, P::new(ns::XMP, "xmp:MetadataDate", PlainString));
        insert(Tag::Description, P::new(ns::DC, "dc:description", LocalizedText));
        insert(Tag::Orientation, P::new(ns::EXIF, "exif:Orientation", PlainString));
        insert(Tag::Orientation, P::new(ns::TIFF, "tiff:Orientation", PlainString));
        insert(Tag::Title, P::new(ns::DC, "dc:title", LocalizedText));

        insert(Tag::GPSLatitude, P::new(ns::EXIF, "exif:GPSLatitude", PlainString));
        insert(Tag::GPSLongitude, P::new(ns::EXIF, "exif:GPSLongitude", PlainString));
        insert(Tag::GPSAltitude, P::new(ns::EXIF, "exif:GPSAltitude", PlainString));
        insert(Tag::GPSAltitudeRef, P::new(ns::EXIF, "exif:GPSAltitudeRef", PlainString));
        insert(Tag::GPSImgDirection, P::new(ns::EXIF, "exif:GPSImgDirection", PlainString));
        insert(
            Tag::GPSImgDirectionRef,
            P::new(ns::EXIF, "exif:GPSImgDirectionRef", PlainString),
        );
        insert(Tag::GPSVersionID, P::new(ns::EXIF, "exif:GPSVersionID", PlainString));

        // the reference letters live at the end of the coordinates
        insert(Tag::GPSLatitudeRef, P::read_fallback(ns::EXIF, "exif:GPSLatitude"));
        insert(Tag::GPSLongitudeRef, P::read_fallback(ns::EXIF, "exif:GPSLongitude"));

        insert(Tag::Regions, P::new(ns::MWG_RS, REGIONS_ROOT, Struct));

        Self {
            tags,
            regions: RegionField::ALL.map(region_descriptor),
        }
    }

    /// The process-wide registry
    pub fn shared() -> &'static TagRegistry {
        SHARED_REGISTRY.get_or_init(TagRegistry::new)
    }

    /// Descriptors for `tag` in read order; empty if unsupported
    pub fn descriptors(&self, tag: Tag) -> &[PropertyDescriptor] {
        self.tags.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Descriptors that writes and removals update
    pub fn write_descriptors(&self, tag: Tag) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors(tag).iter().filter(|d| !d.read_only)
    }

    /// The descriptor of a region field
    pub fn region_descriptor(&self, field: RegionField) -> &RegionPropertyDescriptor {
        &self.regions[field as usize]
    }

    /// Whether `tag` has an XMP mapping
    pub fn supports(&self, tag: Tag) -> bool {
        !self.descriptors(tag).is_empty()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const REGION_ITEM: &str = "mwg-rs:Regions/mwg-rs:RegionList[";

fn region_descriptor(field: RegionField) -> RegionPropertyDescriptor {
    use ValueKind::*;

    let (path_prefix, path_suffix, kind) = match field {
        RegionField::AppliedToDimensions => {
            ("", "mwg-rs:Regions/mwg-rs:AppliedToDimensions", Struct)
        }
        RegionField::AppliedToDimensionsH => {
            ("", "mwg-rs:Regions/mwg-rs:AppliedToDimensions/stDim:h", Integer)
        }
        RegionField::AppliedToDimensionsW => {
            ("", "mwg-rs:Regions/mwg-rs:AppliedToDimensions/stDim:w", Integer)
        }
        RegionField::RegionList => ("", "mwg-rs:Regions/mwg-rs:RegionList", Array),
        RegionField::RegionListItem => (REGION_ITEM, "]", Struct),
        RegionField::Name => (REGION_ITEM, "]/mwg-rs:Name", PlainString),
        RegionField::Type => (REGION_ITEM, "]/mwg-rs:Type", PlainString),
        RegionField::AreaX => (REGION_ITEM, "]/mwg-rs:Area/stArea:x", Real),
        RegionField::AreaY => (REGION_ITEM, "]/mwg-rs:Area/stArea:y", Real),
        RegionField::AreaH => (REGION_ITEM, "]/mwg-rs:Area/stArea:h", Real),
        RegionField::AreaW => (REGION_ITEM, "]/mwg-rs:Area/stArea:w", Real),
        RegionField::Extensions => (REGION_ITEM, "]/mwg-rs:Extensions", Struct),
    };

    RegionPropertyDescriptor {
        schema: ns::MWG_RS,
        path_prefix,
        path_suffix,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_order() {
        let registry = TagRegistry::new();
        let paths: Vec<_> = registry
            .descriptors(Tag::Orientation)
            .iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec!["exif:Orientation", "tiff:Orientation"]);
    }

    #[test]
    fn test_unsupported_tags() {
        let registry = TagRegistry::new();
        for tag in [Tag::Make, Tag::Model, Tag::ImageWidth, Tag::TimestampOriginal] {
            assert!(!registry.supports(tag));
            assert!(registry.descriptors(tag).is_empty());
        }
        assert!(registry.supports(Tag::Regions));
    }

    #[test]
    fn test_reference_tags_are_read_only() {
        let registry = TagRegistry::new();
        let latitude_ref = registry.descriptors(Tag::GPSLatitudeRef);
        assert_eq!(latitude_ref.len(), 1);
        assert_eq!(latitude_ref[0].path, "exif:GPSLatitude");
        assert_eq!(registry.write_descriptors(Tag::GPSLatitudeRef).count(), 0);
        assert_eq!(registry.write_descriptors(Tag::GPSLatitude).count(), 1);
    }

    #[test]
    fn test_region_paths() {
        let registry = TagRegistry::new();
        let name = registry.region_descriptor(RegionField::Name);
        assert_eq!(name.path_for(0), "mwg-rs:Regions/mwg-rs:RegionList[1]/mwg-rs:Name");
        assert_eq!(name.match_index("mwg-rs:Regions/mwg-rs:RegionList[12]/mwg-rs:Name"), Some(12));
        assert_eq!(name.match_index("mwg-rs:Regions/mwg-rs:RegionList[0]/mwg-rs:Name"), None);
        assert_eq!(name.match_index("mwg-rs:Regions/mwg-rs:RegionList[1]/mwg-rs:Type"), None);
        assert_eq!(name.match_index("mwg-rs:Regions/mwg-rs:RegionList[1]/mwg-rs:Name/x"), None);

        let width = registry.region_descriptor(RegionField::AppliedToDimensionsW);
        assert!(!width.is_indexed());
        assert_eq!(width.path_for(7), "mwg-rs:Regions/mwg-rs:AppliedToDimensions/stDim:w");
        assert_eq!(width.match_index(&width.path_for(0)), None);
    }

    #[test]
    fn test_shared_is_single_instance() {
        assert!(std::ptr::eq(TagRegistry::shared(), TagRegistry::shared()));
    }
}
