//! XMP File API
//!
//! This module opens a file, finds its XMP packet and writes an updated
//! packet back. Two layouts can be updated:
//!
//! - **Sidecars**: the whole file is one packet (or the path has an `.xmp`
//!   extension). The packet is replaced with a freshly padded one.
//! - **Embedded packets**: a writable packet inside other content. The new
//!   packet is written in place at the original length, so it must fit.

use crate::core::error::{XmpError, XmpResult};
use crate::core::metadata::XmpMeta;
use crate::files::options::XmpOptions;
use crate::files::packet::{find_packet, packet_size, render_fixed_size, PacketInfo};
use log::debug;
use std::path::{Path, PathBuf};

/// How the packet of an opened file can be written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacketLayout {
    /// The file is (or will become) exactly one packet
    Sidecar,
    /// A packet surrounded by other content
    Embedded(PacketInfo),
    /// Nothing writable was found
    Unwritable,
}

/// High-level API for working with XMP metadata in files
///
/// When a file is opened with [`XmpOptions::for_update`], changes made via
/// [`XmpFile::put_xmp`] are not written to disk immediately. They are only
/// written when [`XmpFile::close`] or [`XmpFile::try_close`] is called.
///
/// # Example
///
/// ```rust,no_run
/// use photo_xmp::{ns, PropertyShape, XmpFile, XmpMeta, XmpOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut file = XmpFile::new();
/// file.open_with("photo.xmp", XmpOptions::default().for_update())?;
///
/// let mut meta = file.get_xmp().cloned().unwrap_or_default();
/// meta.set_property(ns::XMP, "CreatorTool", "MyApp", PropertyShape::Simple)?;
/// if file.can_put_xmp(&meta) {
///     file.put_xmp(meta);
/// }
///
/// // Changes are written to disk when try_close() is called
/// file.try_close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct XmpFile {
    meta: Option<XmpMeta>,
    /// Original file path
    file_path: Option<PathBuf>,
    /// Original file data, kept only for update
    file_data: Option<Vec<u8>>,
    layout: PacketLayout,
    options: XmpOptions,
    /// Set by put_xmp, cleared by a successful close
    dirty: bool,
    is_open: bool,
}

impl XmpFile {
    /// Create a new empty XmpFile
    pub fn new() -> Self {
        Self {
            meta: None,
            file_path: None,
            file_data: None,
            layout: PacketLayout::Unwritable,
            options: XmpOptions::default(),
            dirty: false,
            is_open: false,
        }
    }

    /// Open a file for reading
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> XmpResult<()> {
        self.open_with(path, XmpOptions::default())
    }

    /// Open a file from a path with options
    ///
    /// A missing `.xmp` file opened for update is treated as an empty
    /// sidecar and created on close.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use photo_xmp::{XmpFile, XmpOptions};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut file = XmpFile::new();
    /// file.open_with("photo.xmp", XmpOptions::default().for_update())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open_with<P: AsRef<Path>>(&mut self, path: P, options: XmpOptions) -> XmpResult<()> {
        let path = path.as_ref();
        let is_sidecar_path = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xmp"));

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && is_sidecar_path && options.for_update => {
                debug!("{} does not exist yet, opening as a new sidecar", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        self.load(data, options, is_sidecar_path);
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Open in-memory file content with options
    ///
    /// Updated content is retrieved with [`XmpFile::write_to_bytes`].
    pub fn from_bytes_with(&mut self, data: &[u8], options: XmpOptions) -> XmpResult<()> {
        self.load(data.to_vec(), options, false);
        Ok(())
    }

    fn load(&mut self, data: Vec<u8>, options: XmpOptions, is_sidecar_path: bool) {
        // Reset state before opening (in case of reuse)
        *self = Self::new();
        self.options = options;

        let found = find_packet(&data);
        self.layout = match &found {
            Some((info, _)) if info.spans(&data) => PacketLayout::Sidecar,
            _ if is_sidecar_path => PacketLayout::Sidecar,
            Some((info, _)) if info.writable => PacketLayout::Embedded(*info),
            _ if data.iter().all(u8::is_ascii_whitespace) => PacketLayout::Sidecar,
            _ => PacketLayout::Unwritable,
        };
        debug!(
            "opened {} bytes, packet {:?}, layout {:?}",
            data.len(),
            found.as_ref().map(|(info, _)| info.range()),
            self.layout
        );

        self.meta = found.map(|(_, meta)| meta);
        if options.for_update {
            self.file_data = Some(data);
        }
        self.is_open = true;
    }

    /// Get the XMP metadata
    ///
    /// Returns `None` if no packet was found.
    pub fn get_xmp(&self) -> Option<&XmpMeta> {
        self.meta.as_ref()
    }

    /// Get mutable reference to XMP metadata
    pub fn get_xmp_mut(&mut self) -> Option<&mut XmpMeta> {
        self.meta.as_mut()
    }

    /// Whether `meta` could be written back to this file
    ///
    /// Requires the file to be open for update. Sidecars take any packet;
    /// an embedded packet must be writable and large enough.
    pub fn can_put_xmp(&self, meta: &XmpMeta) -> bool {
        if !self.is_open || !self.options.for_update {
            return false;
        }
        match self.layout {
            PacketLayout::Sidecar => true,
            PacketLayout::Embedded(info) => match packet_size(meta) {
                Ok(size) => size <= info.length,
                Err(_) => false,
            },
            PacketLayout::Unwritable => false,
        }
    }

    /// Put XMP metadata
    ///
    /// Replaces any existing metadata. Files opened for update are written
    /// when closed.
    pub fn put_xmp(&mut self, meta: XmpMeta) {
        self.meta = Some(meta);
        self.dirty = true;
    }

    /// Explicitly closes an opened file, ignoring errors.
    ///
    /// Use [`XmpFile::try_close`] to handle errors.
    pub fn close(&mut self) {
        let _ = self.try_close();
    }

    /// Explicitly closes an opened file with error handling.
    ///
    /// Files opened for update with a put packet are written here.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet does not fit or writing fails. The
    /// file stays open in that case.
    pub fn try_close(&mut self) -> XmpResult<()> {
        if !self.is_open {
            return Ok(());
        }

        if self.options.for_update && self.dirty {
            if let Some(path) = &self.file_path {
                let bytes = self.write_to_bytes()?;
                std::fs::write(path, bytes)?;
                debug!("wrote XMP to {}", path.display());
            }
        }

        self.dirty = false;
        self.is_open = false;
        Ok(())
    }

    /// The file content with the current metadata written back
    pub fn write_to_bytes(&self) -> XmpResult<Vec<u8>> {
        let meta = self.meta.as_ref().ok_or_else(|| {
            XmpError::BadValue("No XMP metadata available for writing".to_string())
        })?;
        let file_data = self.file_data.as_ref().ok_or_else(|| {
            XmpError::BadValue(
                "Original file data not available for writing. \
                To write XMP metadata, open the file with XmpOptions::for_update()."
                    .to_string(),
            )
        })?;

        match self.layout {
            PacketLayout::Sidecar => Ok(meta
                .serialize_packet_with_padding(self.options.padding)?
                .into_bytes()),
            PacketLayout::Embedded(info) => {
                let packet = render_fixed_size(meta, info.length)?;
                let mut output = file_data.clone();
                output.splice(info.range(), packet.into_bytes());
                Ok(output)
            }
            PacketLayout::Unwritable => Err(XmpError::NotSupported(
                "File has no writable XMP packet".to_string(),
            )),
        }
    }
}

impl Default for XmpFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::ns;
    use crate::core::node::PropertyShape;

    fn meta_with_label(label: &str) -> XmpMeta {
        let mut meta = XmpMeta::new();
        meta.set_property(ns::XMP, "Label", label, PropertyShape::Simple)
            .unwrap();
        meta
    }

    #[test]
    fn test_new() {
        let file = XmpFile::new();
        assert!(file.get_xmp().is_none());
        assert!(!file.can_put_xmp(&XmpMeta::new()));
    }

    #[test]
    fn test_read_only_cannot_put() {
        let packet = meta_with_label("red").serialize_packet().unwrap();
        let mut file = XmpFile::new();
        file.from_bytes_with(packet.as_bytes(), XmpOptions::default())
            .unwrap();
        assert!(file.get_xmp().is_some());
        assert!(!file.can_put_xmp(&meta_with_label("blue")));
        assert!(file.write_to_bytes().is_err());
    }

    #[test]
    fn test_embedded_rewrite_keeps_length() {
        let packet = meta_with_label("red")
            .serialize_packet_with_padding(200)
            .unwrap();
        let data = [b"HEAD".as_slice(), packet.as_bytes(), b"TAIL".as_slice()].concat();

        let mut file = XmpFile::new();
        file.from_bytes_with(&data, XmpOptions::default().for_update())
            .unwrap();
        let update = meta_with_label("blue");
        assert!(file.can_put_xmp(&update));
        file.put_xmp(update);

        let output = file.write_to_bytes().unwrap();
        assert_eq!(output.len(), data.len());
        assert!(output.starts_with(b"HEAD"));
        assert!(output.ends_with(b"TAIL"));

        let (_, reread) = find_packet(&output).unwrap();
        assert_eq!(reread.get_property(ns::XMP, "Label").unwrap().value, "blue");
    }

    #[test]
    fn test_embedded_too_small() {
        let packet = meta_with_label("red")
            .serialize_packet_with_padding(0)
            .unwrap();
        let data = [b"HEAD".as_slice(), packet.as_bytes(), b"TAIL".as_slice()].concat();

        let mut file = XmpFile::new();
        file.from_bytes_with(&data, XmpOptions::default().for_update())
            .unwrap();
        let update = meta_with_label(&"x".repeat(64));
        assert!(!file.can_put_xmp(&update));
    }

    #[test]
    fn test_no_packet_is_unwritable() {
        let mut file = XmpFile::new();
        file.from_bytes_with(b"\x89PNG binary", XmpOptions::default().for_update())
            .unwrap();
        assert!(file.get_xmp().is_none());
        assert!(!file.can_put_xmp(&XmpMeta::new()));
    }
}
