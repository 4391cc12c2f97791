//! Tag-level access to one XMP property tree
//!
//! [`PhotoXmp`] owns an optional tree and answers reads and writes of
//! [`Tag`]s through a [`TagCodec`]. Unsupported tags read as `None` and
//! write as no-ops.

use crate::core::error::XmpResult;
use crate::core::metadata::XmpMeta;
use crate::tags::codec::TagCodec;
use crate::tags::registry::TagRegistry;
use crate::tags::tag::{RegionField, Tag};
use crate::tags::value::TagValue;

#[cfg(feature = "files")]
use crate::core::error::XmpError;
#[cfg(feature = "files")]
use crate::files::{XmpFile, XmpOptions};
#[cfg(feature = "files")]
use std::path::Path;

/// An XMP property tree viewed through the tag registry
///
/// # Example
///
/// ```rust
/// use photo_xmp::{PhotoXmp, Tag, TagRegistry, TagValue};
///
/// let mut photo = PhotoXmp::new(TagRegistry::shared());
/// photo.set_entry(Tag::GPSLatitude, "48.8583")?;
/// assert_eq!(photo.entry(Tag::GPSLatitudeRef), Some(TagValue::from("N")));
/// # Ok::<(), photo_xmp::XmpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PhotoXmp<'r> {
    meta: Option<XmpMeta>,
    codec: TagCodec<'r>,
}

impl<'r> PhotoXmp<'r> {
    /// No tree yet; the first write creates one
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self {
            meta: None,
            codec: TagCodec::new(registry),
        }
    }

    pub fn from_meta(meta: XmpMeta, registry: &'r TagRegistry) -> Self {
        Self {
            meta: Some(meta),
            codec: TagCodec::new(registry),
        }
    }

    /// Whether a property tree is present
    pub fn is_valid(&self) -> bool {
        self.meta.is_some()
    }

    pub fn supports_entry(&self, tag: Tag) -> bool {
        self.codec.registry().supports(tag)
    }

    /// Whether any descriptor of `tag` holds a property
    pub fn has_entry(&self, tag: Tag) -> bool {
        match &self.meta {
            Some(meta) => self.codec.has_entry(tag, meta),
            None => false,
        }
    }

    /// Whether region field `field` of the region at 0-based `index` exists
    pub fn has_region_entry(&self, field: RegionField, index: usize) -> bool {
        match &self.meta {
            Some(meta) => self.codec.has_region_entry(field, index, meta),
            None => false,
        }
    }

    pub fn entry(&self, tag: Tag) -> Option<TagValue> {
        let meta = self.meta.as_ref()?;
        self.codec.decode(tag, meta)
    }

    /// Write `value` to every writable property mapped to `tag`
    ///
    /// Unsupported tags are ignored.
    pub fn set_entry(&mut self, tag: Tag, value: impl Into<TagValue>) -> XmpResult<()> {
        if !self.supports_entry(tag) {
            log::trace!("ignoring write of unsupported {:?}", tag);
            return Ok(());
        }
        let meta = self.meta.get_or_insert_with(XmpMeta::new);
        self.codec.encode(tag, &value.into(), meta)
    }

    pub fn remove_entry(&mut self, tag: Tag) -> XmpResult<()> {
        match &mut self.meta {
            Some(meta) => self.codec.remove(tag, meta),
            None => Ok(()),
        }
    }

    pub fn meta(&self) -> Option<&XmpMeta> {
        self.meta.as_ref()
    }

    pub fn meta_mut(&mut self) -> Option<&mut XmpMeta> {
        self.meta.as_mut()
    }

    pub fn into_meta(self) -> Option<XmpMeta> {
        self.meta
    }
}

#[cfg(feature = "files")]
impl<'r> PhotoXmp<'r> {
    /// Read the XMP packet of the file at `path`
    ///
    /// A file without a packet yields an instance with no tree.
    pub fn open<P: AsRef<Path>>(path: P, registry: &'r TagRegistry) -> XmpResult<Self> {
        let mut file = XmpFile::new();
        file.open_with(path.as_ref(), XmpOptions::default().for_read())?;
        let meta = file.get_xmp().cloned();
        file.close();

        Ok(Self {
            meta,
            codec: TagCodec::new(registry),
        })
    }

    /// Write the tree back to `path`, reporting only success
    ///
    /// Failures are logged. Use [`PhotoXmp::try_write`] for the error.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match self.try_write(path) {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to write XMP to {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Write the tree back to `path`
    ///
    /// Without a tree an empty packet is written.
    pub fn try_write<P: AsRef<Path>>(&self, path: P) -> XmpResult<()> {
        let path = path.as_ref();
        let meta = self.meta.clone().unwrap_or_default();

        let mut file = XmpFile::new();
        file.open_with(path, XmpOptions::default().for_update())?;
        if !file.can_put_xmp(&meta) {
            file.close();
            return Err(XmpError::NotSupported(format!(
                "Cannot put XMP into {}",
                path.display()
            )));
        }
        file.put_xmp(meta);
        file.try_close()
    }
}
