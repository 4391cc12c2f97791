//! XMP value types
//!
//! This module defines the value and qualifier types exchanged with the
//! property store.

pub mod qualifier;
pub mod value;

pub use qualifier::{Qualifier, X_DEFAULT};
pub use value::PropertyValue;
