//! Semantic tags and region fields

/// A photo metadata field as seen by applications
///
/// Every variant is a valid tag. Tags without an XMP mapping (`Make`,
/// `ImageWidth`, ...) belong to other metadata blocks; the registry
/// returns no descriptors for them and reads and writes ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tag {
    Creator,
    Subject,
    City,
    Country,
    Location,
    Rating,
    Timestamp,
    Description,
    Orientation,
    Title,
    GPSLatitude,
    GPSLongitude,
    GPSAltitude,
    GPSAltitudeRef,
    GPSImgDirection,
    GPSImgDirectionRef,
    GPSVersionID,
    GPSLatitudeRef,
    GPSLongitudeRef,
    Regions,
    Make,
    Model,
    ImageWidth,
    ImageHeight,
    FocalLength,
    ExposureTime,
    TimestampOriginal,
}

impl Tag {
    /// Every tag, in declaration order
    pub const ALL: [Tag; 27] = [
        Tag::Creator,
        Tag::Subject,
        Tag::City,
        Tag::Country,
        Tag::Location,
        Tag::Rating,
        Tag::Timestamp,
        Tag::Description,
        Tag::Orientation,
        Tag::Title,
        Tag::GPSLatitude,
        Tag::GPSLongitude,
        Tag::GPSAltitude,
        Tag::GPSAltitudeRef,
        Tag::GPSImgDirection,
        Tag::GPSImgDirectionRef,
        Tag::GPSVersionID,
        Tag::GPSLatitudeRef,
        Tag::GPSLongitudeRef,
        Tag::Regions,
        Tag::Make,
        Tag::Model,
        Tag::ImageWidth,
        Tag::ImageHeight,
        Tag::FocalLength,
        Tag::ExposureTime,
        Tag::TimestampOriginal,
    ];
}

/// One field of the MWG region structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionField {
    AppliedToDimensions,
    AppliedToDimensionsH,
    AppliedToDimensionsW,
    RegionList,
    RegionListItem,
    Name,
    Type,
    AreaX,
    AreaY,
    AreaH,
    AreaW,
    Extensions,
}

impl RegionField {
    /// Every field; position matches the discriminant
    pub const ALL: [RegionField; 12] = [
        RegionField::AppliedToDimensions,
        RegionField::AppliedToDimensionsH,
        RegionField::AppliedToDimensionsW,
        RegionField::RegionList,
        RegionField::RegionListItem,
        RegionField::Name,
        RegionField::Type,
        RegionField::AreaX,
        RegionField::AreaY,
        RegionField::AreaH,
        RegionField::AreaW,
        RegionField::Extensions,
    ];
}
