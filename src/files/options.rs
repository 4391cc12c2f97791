//! Open options for [`XmpFile`](crate::files::XmpFile)

use crate::core::serializer::XmpSerializer;

/// Options for XMP file operations.
///
/// Use the builder pattern to configure options.
///
/// # Example
///
/// ```rust,no_run
/// use photo_xmp::{XmpFile, XmpOptions};
///
/// let mut file = XmpFile::new();
/// file.open_with("photo.xmp", XmpOptions::default().for_update().padding(4096))?;
/// // ... modify metadata ...
/// file.try_close()?;
/// # Ok::<(), photo_xmp::XmpError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XmpOptions {
    /// Open for reading and writing (default: read-only)
    pub for_update: bool,
    /// Whitespace bytes reserved after the packet body when a sidecar is
    /// rewritten
    pub padding: usize,
}

impl Default for XmpOptions {
    fn default() -> Self {
        Self {
            for_update: false,
            padding: XmpSerializer::DEFAULT_PADDING,
        }
    }
}

impl XmpOptions {
    /// Open for read-only access (default).
    pub fn for_read(mut self) -> Self {
        self.for_update = false;
        self
    }

    /// Open for reading and writing.
    ///
    /// Files opened for update are written to only when closing.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    /// Padding used when a whole sidecar packet is written.
    ///
    /// Embedded packets are always rewritten to their original length.
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = XmpOptions::default();
        assert!(!options.for_update);
        assert_eq!(options.padding, XmpSerializer::DEFAULT_PADDING);

        let options = options.for_update().padding(16);
        assert!(options.for_update);
        assert_eq!(options.padding, 16);
        assert!(!options.for_read().for_update);
    }
}
