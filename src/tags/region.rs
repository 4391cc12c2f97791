//! MWG region bags
//!
//! A region bag is stored as the `mwg-rs:Regions` struct: the image
//! dimensions the areas refer to, and a `RegionList` bag whose items carry
//! a name, a type and a normalized area. Decoding walks the subtree once
//! and matches each path exactly against the region descriptor templates.

use crate::core::error::XmpResult;
use crate::core::node::{ArrayType, PropertyShape};
use crate::tags::registry::{TagRegistry, REGIONS_ROOT};
use crate::tags::store::PropertyStore;
use crate::tags::tag::RegionField;
use log::{debug, trace, warn};

/// Region numbers above this are treated as corrupt and skipped
pub const MAX_REGIONS: usize = 4096;

/// A rectangle given by its center and size, in image-relative units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Horizontal center
    pub x: f64,
    /// Vertical center
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Pixel size of the image the regions were drawn on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One named area of the image
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub name: String,
    /// MWG region type, e.g. `Face` or `Pet`
    pub region_type: String,
    pub area: Rect,
}

impl Region {
    pub fn new(name: impl Into<String>, region_type: impl Into<String>, area: Rect) -> Self {
        Self {
            name: name.into(),
            region_type: region_type.into(),
            area,
        }
    }
}

/// The regions of one image, in stored order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionBag {
    pub full_image_size: ImageSize,
    pub regions: Vec<Region>,
}

impl RegionBag {
    pub fn new(full_image_size: ImageSize) -> Self {
        Self {
            full_image_size,
            regions: Vec::new(),
        }
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }
}

impl std::ops::Index<usize> for RegionBag {
    type Output = Region;

    fn index(&self, index: usize) -> &Region {
        &self.regions[index]
    }
}

/// Area components seen so far for one region
#[derive(Debug, Clone, Copy, Default)]
struct AreaAccumulator {
    x: Option<f64>,
    y: Option<f64>,
    w: Option<f64>,
    h: Option<f64>,
}

impl AreaAccumulator {
    fn finish(self) -> Rect {
        Rect::new(
            self.x.unwrap_or_default(),
            self.y.unwrap_or_default(),
            self.w.unwrap_or_default(),
            self.h.unwrap_or_default(),
        )
    }
}

/// A region bag under construction
#[derive(Default)]
struct BagBuilder {
    size: ImageSize,
    regions: Vec<Region>,
    areas: Vec<AreaAccumulator>,
}

impl BagBuilder {
    /// Region and area slot for 1-based `number`, growing the bag to it
    fn slot(&mut self, number: usize) -> (&mut Region, &mut AreaAccumulator) {
        if self.regions.len() < number {
            self.regions.resize_with(number, Region::default);
            self.areas.resize_with(number, AreaAccumulator::default);
        }
        (&mut self.regions[number - 1], &mut self.areas[number - 1])
    }

    fn finish(self) -> RegionBag {
        let regions = self
            .regions
            .into_iter()
            .zip(self.areas)
            .map(|(mut region, area)| {
                region.area = area.finish();
                region
            })
            .collect();
        RegionBag {
            full_image_size: self.size,
            regions,
        }
    }
}

const INDEXED_FIELDS: [RegionField; 7] = [
    RegionField::Name,
    RegionField::Type,
    RegionField::AreaX,
    RegionField::AreaY,
    RegionField::AreaH,
    RegionField::AreaW,
    RegionField::Extensions,
];

/// Rebuild the region bag stored under `mwg-rs:Regions`
///
/// The bag grows to the highest region number seen, with missing interior
/// regions left at their defaults. Numbers above [`MAX_REGIONS`] are the
/// exception: they are logged and skipped, so the bag never grows past
/// that many regions.
pub fn decode_regions<S: PropertyStore + ?Sized>(registry: &TagRegistry, store: &S) -> RegionBag {
    let list = registry.region_descriptor(RegionField::RegionList);
    let height_path = registry
        .region_descriptor(RegionField::AppliedToDimensionsH)
        .path_for(0);
    let width_path = registry
        .region_descriptor(RegionField::AppliedToDimensionsW)
        .path_for(0);

    let mut builder = BagBuilder::default();
    for entry in store.iterate(list.schema, REGIONS_ROOT, true) {
        let path = entry.path.as_str();
        if path == height_path {
            builder.size.height = parse_dimension(path, &entry.value).unwrap_or(builder.size.height);
            continue;
        }
        if path == width_path {
            builder.size.width = parse_dimension(path, &entry.value).unwrap_or(builder.size.width);
            continue;
        }

        let Some((field, number)) = INDEXED_FIELDS.iter().find_map(|field| {
            registry
                .region_descriptor(*field)
                .match_index(path)
                .map(|n| (*field, n))
        }) else {
            trace!("skipping region entry {}", path);
            continue;
        };
        if field == RegionField::Extensions {
            continue;
        }
        if number > MAX_REGIONS {
            warn!("ignoring region {} beyond the limit of {}: {}", number, MAX_REGIONS, path);
            continue;
        }

        let (region, area) = builder.slot(number);
        match field {
            RegionField::Name => region.name = entry.value.clone(),
            RegionField::Type => region.region_type = entry.value.clone(),
            RegionField::AreaX => area.x = parse_area(path, &entry.value).or(area.x),
            RegionField::AreaY => area.y = parse_area(path, &entry.value).or(area.y),
            RegionField::AreaH => area.h = parse_area(path, &entry.value).or(area.h),
            RegionField::AreaW => area.w = parse_area(path, &entry.value).or(area.w),
            _ => {}
        }
    }

    let bag = builder.finish();
    debug!(
        "decoded {} regions on a {}x{} image",
        bag.len(),
        bag.full_image_size.width,
        bag.full_image_size.height
    );
    bag
}

/// Store `bag` under `mwg-rs:Regions`, replacing what was there
///
/// An empty bag removes the whole Regions struct.
pub fn encode_regions<S: PropertyStore + ?Sized>(
    registry: &TagRegistry,
    bag: &RegionBag,
    store: &mut S,
) -> XmpResult<()> {
    let field = |f: RegionField| registry.region_descriptor(f);
    let schema = field(RegionField::RegionList).schema;
    let regions_path = REGIONS_ROOT;

    if bag.is_empty() {
        debug!("no regions to write, removing {}", regions_path);
        return store.delete_property(schema, regions_path);
    }

    if !store.has_property(schema, regions_path) {
        store.set_property(schema, regions_path, "", PropertyShape::Struct)?;
        store.set_property(
            schema,
            &field(RegionField::RegionList).path_for(0),
            "",
            PropertyShape::Array(ArrayType::Unordered),
        )?;
    }

    let size = bag.full_image_size;
    store.set_property_int(
        schema,
        &field(RegionField::AppliedToDimensionsH).path_for(0),
        i64::from(size.height),
    )?;
    store.set_property_int(
        schema,
        &field(RegionField::AppliedToDimensionsW).path_for(0),
        i64::from(size.width),
    )?;

    for (i, region) in bag.iter().enumerate() {
        let simple = PropertyShape::Simple;
        store.set_property(schema, &field(RegionField::Name).path_for(i), &region.name, simple)?;
        store.set_property(schema, &field(RegionField::Type).path_for(i), &region.region_type, simple)?;
        store.set_property_float(schema, &field(RegionField::AreaX).path_for(i), region.area.x)?;
        store.set_property_float(schema, &field(RegionField::AreaY).path_for(i), region.area.y)?;
        store.set_property_float(schema, &field(RegionField::AreaH).path_for(i), region.area.height)?;
        store.set_property_float(schema, &field(RegionField::AreaW).path_for(i), region.area.width)?;
    }

    // Deleting an item shifts the rest down, so the stale tail is removed
    // by deleting at the same index until nothing is left there.
    let item = field(RegionField::RegionListItem);
    let stale = item.path_for(bag.len());
    let mut removed = 0;
    while store.has_property(schema, &stale) {
        store.delete_property(schema, &stale)?;
        removed += 1;
        if removed > MAX_REGIONS {
            break;
        }
    }
    debug!("wrote {} regions, removed {} stale", bag.len(), removed);
    Ok(())
}

fn parse_dimension(path: &str, raw: &str) -> Option<u32> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring malformed image dimension {}='{}'", path, raw);
            None
        }
    }
}

fn parse_area(path: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring malformed region area {}='{}'", path, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::XmpMeta;
    use crate::core::namespace::ns;

    fn two_regions() -> RegionBag {
        let mut bag = RegionBag::new(ImageSize::new(200, 100));
        bag.push(Region::new("Ann", "Face", Rect::new(0.25, 0.5, 0.1, 0.2)));
        bag.push(Region::new("Rex", "Pet", Rect::new(0.75, 0.5, 0.3, 0.4)));
        bag
    }

    #[test]
    fn test_round_trip() {
        let registry = TagRegistry::new();
        let mut meta = XmpMeta::new();
        encode_regions(&registry, &two_regions(), &mut meta).unwrap();

        assert_eq!(
            meta.get_property(ns::MWG_RS, "mwg-rs:Regions/mwg-rs:AppliedToDimensions/stDim:w")
                .unwrap()
                .value,
            "200"
        );
        assert_eq!(decode_regions(&registry, &meta), two_regions());
    }

    #[test]
    fn test_missing_interior_items_become_defaults() {
        let registry = TagRegistry::new();
        let mut meta = XmpMeta::new();
        for i in 1..=3 {
            let path = format!("mwg-rs:Regions/mwg-rs:RegionList[{i}]/mwg-rs:Type");
            meta.set_property(ns::MWG_RS, &path, "Face", PropertyShape::Simple).unwrap();
        }
        meta.delete_property(ns::MWG_RS, "mwg-rs:Regions/mwg-rs:RegionList[2]/mwg-rs:Type")
            .unwrap();
        meta.set_property(ns::MWG_RS, "mwg-rs:Regions/mwg-rs:RegionList[3]/mwg-rs:Name", "C", PropertyShape::Simple)
            .unwrap();

        let bag = decode_regions(&registry, &meta);
        assert_eq!(bag.len(), 3);
        assert_eq!(bag[1], Region::default());
        assert_eq!(bag[2].name, "C");
        assert_eq!(bag[0].area, Rect::default());
    }

    #[test]
    fn test_regions_past_the_cap_are_skipped() {
        let registry = TagRegistry::new();
        let mut meta = XmpMeta::new();
        for n in 1..=MAX_REGIONS + 1 {
            let path = format!("mwg-rs:Regions/mwg-rs:RegionList[{n}]/mwg-rs:Name");
            meta.set_property(ns::MWG_RS, &path, &format!("R{n}"), PropertyShape::Simple)
                .unwrap();
        }

        let bag = decode_regions(&registry, &meta);
        assert_eq!(bag.len(), MAX_REGIONS);
        assert_eq!(bag[MAX_REGIONS - 1].name, format!("R{MAX_REGIONS}"));
    }

    #[test]
    fn test_malformed_area_is_skipped() {
        let registry = TagRegistry::new();
        let mut meta = XmpMeta::new();
        encode_regions(&registry, &two_regions(), &mut meta).unwrap();
        meta.set_property(
            ns::MWG_RS,
            "mwg-rs:Regions/mwg-rs:RegionList[1]/mwg-rs:Area/stArea:x",
            "left",
            PropertyShape::Simple,
        )
        .unwrap();

        let bag = decode_regions(&registry, &meta);
        assert_eq!(bag[0].area.x, 0.0);
        assert_eq!(bag[0].area.y, 0.5);
    }
}
