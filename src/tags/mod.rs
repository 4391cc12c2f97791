//! Photo tags on top of the XMP property store
//!
//! This module maps application-level tags (captions, keywords, GPS
//! position, face regions) onto XMP properties and back.

pub mod codec;
pub mod gps;
pub mod photo;
pub mod region;
pub mod registry;
pub mod store;
pub mod tag;
pub mod value;

pub use codec::{DecodedShape, TagCodec};
pub use gps::CoordinateAxis;
pub use photo::PhotoXmp;
pub use region::{decode_regions, encode_regions, ImageSize, Rect, Region, RegionBag, MAX_REGIONS};
pub use registry::{PropertyDescriptor, RegionPropertyDescriptor, TagRegistry, ValueKind, REGIONS_ROOT};
pub use store::PropertyStore;
pub use tag::{RegionField, Tag};
pub use value::TagValue;
