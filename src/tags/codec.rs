//! Reading and writing tags through the registry
//!
//! A read tries the descriptors of a tag in order and returns the first
//! one holding a value. A write replaces the value of every writable
//! descriptor. GPS tags and regions get their own encodings; everything
//! else is stored as described by the descriptor's [`ValueKind`].

use crate::core::error::XmpResult;
use crate::core::node::{ArrayType, PropertyShape};
use crate::tags::gps::{self, CoordinateAxis};
use crate::tags::region::{decode_regions, encode_regions};
use crate::tags::registry::{PropertyDescriptor, TagRegistry, ValueKind};
use crate::tags::store::PropertyStore;
use crate::tags::tag::{RegionField, Tag};
use crate::tags::value::TagValue;
use crate::types::qualifier::X_DEFAULT;
use log::{trace, warn};

/// What a single descriptor holds, judged by the stored shape
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedShape {
    /// Nothing usable is stored
    Absent,
    /// Trimmed, non-empty array items
    List(Vec<String>),
    /// A struct; only meaningful for regions
    Struct,
    /// A single value, trimmed and non-empty
    Scalar(String),
}

/// Tag reads and writes over any [`PropertyStore`]
#[derive(Debug, Clone, Copy)]
pub struct TagCodec<'r> {
    registry: &'r TagRegistry,
}

impl<'r> TagCodec<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TagRegistry {
        self.registry
    }

    /// Read what one descriptor holds
    pub fn decode_one<S: PropertyStore + ?Sized>(&self, descriptor: &PropertyDescriptor, store: &S) -> DecodedShape {
        let Some(property) = store.get_property(descriptor.schema, descriptor.path) else {
            return DecodedShape::Absent;
        };

        // the stored shape decides, not the descriptor's kind: an rdf:Alt
        // title reads back as every alternative
        match property.shape {
            PropertyShape::Array(_) => {
                let items: Vec<String> = (1..)
                    .map_while(|index| store.get_array_item(descriptor.schema, descriptor.path, index))
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
                if items.is_empty() {
                    DecodedShape::Absent
                } else {
                    DecodedShape::List(items)
                }
            }
            PropertyShape::Struct => DecodedShape::Struct,
            PropertyShape::Simple => {
                let value = property.value.trim();
                if value.is_empty() {
                    DecodedShape::Absent
                } else {
                    DecodedShape::Scalar(value.to_string())
                }
            }
        }
    }

    /// Read a tag; `None` when unsupported or nothing usable is stored
    pub fn decode<S: PropertyStore + ?Sized>(&self, tag: Tag, store: &S) -> Option<TagValue> {
        for descriptor in self.registry.descriptors(tag) {
            trace!("reading {:?} from {}", tag, descriptor.path);
            let value = match self.decode_one(descriptor, store) {
                DecodedShape::Absent => None,
                DecodedShape::List(items) => Some(TagValue::List(items)),
                DecodedShape::Struct if tag == Tag::Regions => {
                    Some(TagValue::Regions(decode_regions(self.registry, store)))
                }
                DecodedShape::Struct => None,
                DecodedShape::Scalar(_) if tag == Tag::Regions => None,
                DecodedShape::Scalar(raw) => decode_scalar(tag, descriptor, &raw),
            };
            if value.is_some() {
                return value;
            }
        }
        None
    }

    /// Write a tag, replacing what every writable descriptor holds
    ///
    /// Unsupported tags are ignored. Malformed GPS input is an error.
    pub fn encode<S: PropertyStore + ?Sized>(&self, tag: Tag, value: &TagValue, store: &mut S) -> XmpResult<()> {
        if !self.registry.supports(tag) {
            trace!("ignoring write of unsupported tag {:?}", tag);
            return Ok(());
        }

        match tag {
            Tag::GPSAltitude => {
                let altitude = gps::encode_altitude(&value.to_text()?)?;
                self.write_descriptors(Tag::GPSAltitudeRef, &TagValue::from(altitude.reference), store)?;
                self.write_descriptors(tag, &TagValue::Text(altitude.value), store)
            }
            Tag::GPSLatitude | Tag::GPSLongitude => {
                let encoded = gps::encode_coordinate(&value.to_text()?, axis_of(tag))?;
                self.write_descriptors(tag, &TagValue::Text(encoded), store)
            }
            Tag::GPSImgDirection => {
                let encoded = gps::encode_direction(&value.to_text()?)?;
                self.write_descriptors(tag, &TagValue::Text(encoded), store)
            }
            Tag::Regions => match value {
                TagValue::Regions(bag) => encode_regions(self.registry, bag, store),
                other => Err(crate::core::error::XmpError::BadValue(format!(
                    "Regions need a region bag, got {:?}",
                    other
                ))),
            },
            _ => self.write_descriptors(tag, value, store),
        }
    }

    /// Delete every writable descriptor of a tag
    pub fn remove<S: PropertyStore + ?Sized>(&self, tag: Tag, store: &mut S) -> XmpResult<()> {
        for descriptor in self.registry.write_descriptors(tag) {
            store.delete_property(descriptor.schema, descriptor.path)?;
        }
        Ok(())
    }

    /// Whether any descriptor of the tag is present
    pub fn has_entry<S: PropertyStore + ?Sized>(&self, tag: Tag, store: &S) -> bool {
        self.registry
            .descriptors(tag)
            .iter()
            .any(|d| store.has_property(d.schema, d.path))
    }

    /// Whether a region field is present for the region at 0-based `index`
    pub fn has_region_entry<S: PropertyStore + ?Sized>(&self, field: RegionField, index: usize, store: &S) -> bool {
        let descriptor = self.registry.region_descriptor(field);
        store.has_property(descriptor.schema, &descriptor.path_for(index))
    }

    fn write_descriptors<S: PropertyStore + ?Sized>(&self, tag: Tag, value: &TagValue, store: &mut S) -> XmpResult<()> {
        for descriptor in self.registry.write_descriptors(tag) {
            trace!("writing {:?} to {}", tag, descriptor.path);
            write_descriptor(descriptor, value, store)?;
        }
        Ok(())
    }
}

/// Replace what one descriptor holds with `value`
fn write_descriptor<S: PropertyStore + ?Sized>(
    descriptor: &PropertyDescriptor,
    value: &TagValue,
    store: &mut S,
) -> XmpResult<()> {
    let (schema, path) = (descriptor.schema, descriptor.path);
    store.delete_property(schema, path)?;

    match descriptor.kind {
        ValueKind::PlainString => store.set_property(schema, path, &value.to_text()?, PropertyShape::Simple),
        ValueKind::Struct => store.set_property(schema, path, "", PropertyShape::Struct),
        ValueKind::Array => store.set_property(schema, path, "", PropertyShape::Array(ArrayType::Unordered)),
        ValueKind::StringList => {
            for item in value.to_list()? {
                store.append_array_item(schema, path, ArrayType::Unordered, &item)?;
            }
            Ok(())
        }
        ValueKind::LocalizedText => store.set_localized_text(schema, path, "", X_DEFAULT, &value.to_text()?),
        ValueKind::Real => store.set_property_float(schema, path, value.to_real()?),
        ValueKind::Integer => store.set_property_int(schema, path, value.to_integer()?),
    }
}

fn decode_scalar(tag: Tag, descriptor: &PropertyDescriptor, raw: &str) -> Option<TagValue> {
    let decoded = match tag {
        Tag::GPSLatitude | Tag::GPSLongitude => gps::parse_sexagesimal(raw).map(TagValue::Real),
        Tag::GPSLatitudeRef | Tag::GPSLongitudeRef => {
            return gps::reference_letter(raw).map(|c| TagValue::Text(c.to_string()));
        }
        Tag::GPSImgDirection => gps::parse_rational(raw)
            .map(gps::normalize_direction)
            .map(TagValue::Real),
        Tag::GPSAltitude => gps::parse_rational(raw).map(TagValue::Real),
        _ => return Some(TagValue::Text(raw.to_string())),
    };

    match decoded {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring {}: {}", descriptor.path, e);
            None
        }
    }
}

fn axis_of(tag: Tag) -> CoordinateAxis {
    if tag == Tag::GPSLongitude {
        CoordinateAxis::Longitude
    } else {
        CoordinateAxis::Latitude
    }
}
