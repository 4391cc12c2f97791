//! The property store seen by the codecs
//!
//! Codecs only talk to the tree through this trait, so they can be driven
//! by any hierarchical XMP store. [`XmpMeta`] is the in-crate implementation.

use crate::core::error::XmpResult;
use crate::core::iterator::{IterOptions, XmpProperty};
use crate::core::metadata::XmpMeta;
use crate::core::node::{ArrayType, PropertyShape};
use crate::types::value::PropertyValue;

/// Hierarchical property access addressed by (schema URI, path)
pub trait PropertyStore {
    fn has_property(&self, schema: &str, path: &str) -> bool;

    fn get_property(&self, schema: &str, path: &str) -> Option<PropertyValue>;

    /// Value of the array item at 1-based `index`
    fn get_array_item(&self, schema: &str, path: &str, index: usize) -> Option<String>;

    /// `(value, actual language)` of the best matching alternative
    fn get_localized_text(
        &self,
        schema: &str,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> Option<(String, String)>;

    fn set_property(&mut self, schema: &str, path: &str, value: &str, shape: PropertyShape) -> XmpResult<()>;

    fn set_property_int(&mut self, schema: &str, path: &str, value: i64) -> XmpResult<()>;

    fn set_property_float(&mut self, schema: &str, path: &str, value: f64) -> XmpResult<()>;

    fn set_localized_text(
        &mut self,
        schema: &str,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
    ) -> XmpResult<()>;

    fn append_array_item(
        &mut self,
        schema: &str,
        path: &str,
        array_type: ArrayType,
        value: &str,
    ) -> XmpResult<()>;

    fn delete_property(&mut self, schema: &str, path: &str) -> XmpResult<()>;

    /// Depth-first, document-order entries of the subtree at `root_path`
    fn iterate(&self, schema: &str, root_path: &str, omit_qualifiers: bool) -> Vec<XmpProperty>;
}

impl PropertyStore for XmpMeta {
    fn has_property(&self, schema: &str, path: &str) -> bool {
        XmpMeta::has_property(self, schema, path)
    }

    fn get_property(&self, schema: &str, path: &str) -> Option<PropertyValue> {
        XmpMeta::get_property(self, schema, path)
    }

    fn get_array_item(&self, schema: &str, path: &str, index: usize) -> Option<String> {
        XmpMeta::get_array_item(self, schema, path, index)
    }

    fn get_localized_text(
        &self,
        schema: &str,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> Option<(String, String)> {
        XmpMeta::get_localized_text(self, schema, path, generic_lang, specific_lang)
    }

    fn set_property(&mut self, schema: &str, path: &str, value: &str, shape: PropertyShape) -> XmpResult<()> {
        XmpMeta::set_property(self, schema, path, value, shape)
    }

    fn set_property_int(&mut self, schema: &str, path: &str, value: i64) -> XmpResult<()> {
        XmpMeta::set_property_int(self, schema, path, value)
    }

    fn set_property_float(&mut self, schema: &str, path: &str, value: f64) -> XmpResult<()> {
        XmpMeta::set_property_float(self, schema, path, value)
    }

    fn set_localized_text(
        &mut self,
        schema: &str,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
    ) -> XmpResult<()> {
        XmpMeta::set_localized_text(self, schema, path, generic_lang, specific_lang, value)
    }

    fn append_array_item(
        &mut self,
        schema: &str,
        path: &str,
        array_type: ArrayType,
        value: &str,
    ) -> XmpResult<()> {
        XmpMeta::append_array_item(self, schema, path, array_type, value)
    }

    fn delete_property(&mut self, schema: &str, path: &str) -> XmpResult<()> {
        XmpMeta::delete_property(self, schema, path)
    }

    fn iterate(&self, schema: &str, root_path: &str, omit_qualifiers: bool) -> Vec<XmpProperty> {
        let options = IterOptions { omit_qualifiers };
        XmpMeta::iterate(self, schema, root_path, options)
    }
}
