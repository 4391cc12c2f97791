//! Error types for XMP operations
//!
//! A single error enum covers the property store, the packet codec, the
//! tag codecs and the file boundary.

use thiserror::Error;

/// Error types for XMP operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// Bad parameter provided to a function
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Bad value provided (e.g., a coordinate or rational that does not parse)
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Bad schema URI or namespace prefix
    #[error("Bad schema: {0}")]
    BadSchema(String),

    /// Bad property path
    #[error("Bad XPath: {0}")]
    BadXPath(String),

    /// Parse error (XML/RDF parsing failed)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl XmpError {
    pub(crate) fn bad_value(what: &str, raw: &str) -> Self {
        XmpError::BadValue(format!("{what}: '{raw}'"))
    }
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = XmpError::BadXPath("RegionList[0]".to_string());
        assert_eq!(err.to_string(), "Bad XPath: RegionList[0]");
    }

    #[test]
    fn test_bad_value_helper() {
        let err = XmpError::bad_value("rational", "1/x");
        assert_eq!(err.to_string(), "Bad value: rational: '1/x'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let xmp_err: XmpError = io_err.into();
        assert!(matches!(xmp_err, XmpError::IoError(_)));
    }
}
