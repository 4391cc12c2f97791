//! # photo-xmp
//!
//! Maps photo metadata tags onto XMP property trees.
//!
//! The crate has three layers:
//!
//! - [`core`]: an in-memory XMP property store ([`XmpMeta`]) with an RDF/XML
//!   packet parser and serializer and a global namespace registry.
//! - [`tags`]: the tag engine. A static [`TagRegistry`] maps each [`Tag`] to
//!   one or more XMP properties; [`TagCodec`] converts between native
//!   [`TagValue`]s and stored strings, including GPS coordinates and MWG face
//!   regions; [`PhotoXmp`] wraps a tree with tag-level reads and writes.
//! - [`files`] (feature `files`, on by default): reading and writing XMP
//!   packets in sidecars and in place inside other files.
//!
//! ## Example
//!
//! ```rust
//! use photo_xmp::{ImageSize, PhotoXmp, Rect, Region, RegionBag, Tag, TagRegistry, TagValue};
//!
//! # fn main() -> Result<(), photo_xmp::XmpError> {
//! let mut photo = PhotoXmp::new(TagRegistry::shared());
//! photo.set_entry(Tag::Title, "Harbour at dusk")?;
//! photo.set_entry(Tag::GPSImgDirection, "-30")?;
//!
//! let mut faces = RegionBag::new(ImageSize::new(4000, 3000));
//! faces.push(Region::new("Ann", "Face", Rect::new(0.25, 0.4, 0.1, 0.15)));
//! photo.set_entry(Tag::Regions, faces)?;
//!
//! assert_eq!(photo.entry(Tag::GPSImgDirection), Some(TagValue::Real(330.0)));
//! let packet = photo.meta().unwrap().serialize_packet()?;
//! assert!(packet.contains("mwg-rs:RegionList"));
//! # Ok(())
//! # }
//! ```

pub mod core;
#[cfg(feature = "files")]
pub mod files;
pub mod tags;
pub mod types;

pub use crate::core::error::{XmpError, XmpResult};
pub use crate::core::iterator::{IterOptions, XmpIterator, XmpProperty};
pub use crate::core::metadata::XmpMeta;
pub use crate::core::namespace::{ns, register_namespace};
pub use crate::core::node::{ArrayType, PropertyShape};
pub use crate::types::value::PropertyValue;

pub use tags::{
    ImageSize, PhotoXmp, PropertyStore, Rect, Region, RegionBag, RegionField, Tag, TagCodec,
    TagRegistry, TagValue,
};

#[cfg(feature = "files")]
pub use files::{XmpFile, XmpOptions};
