//! Native values of tags

use crate::core::error::{XmpError, XmpResult};
use crate::tags::region::RegionBag;
use std::fmt;

/// The value of a tag as applications see it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagValue {
    Text(String),
    List(Vec<String>),
    Integer(i64),
    Real(f64),
    Regions(RegionBag),
}

impl TagValue {
    /// Textual form; lists are joined with ", "
    pub fn to_text(&self) -> XmpResult<String> {
        match self {
            TagValue::Text(s) => Ok(s.clone()),
            TagValue::List(items) => Ok(items.join(", ")),
            TagValue::Integer(v) => Ok(v.to_string()),
            TagValue::Real(v) => Ok(v.to_string()),
            TagValue::Regions(_) => Err(XmpError::BadValue(
                "A region bag has no textual form".to_string(),
            )),
        }
    }

    /// List form; a scalar becomes a one-item list
    pub fn to_list(&self) -> XmpResult<Vec<String>> {
        match self {
            TagValue::List(items) => Ok(items.clone()),
            other => Ok(vec![other.to_text()?]),
        }
    }

    pub fn to_real(&self) -> XmpResult<f64> {
        match self {
            TagValue::Real(v) => Ok(*v),
            TagValue::Integer(v) => Ok(*v as f64),
            TagValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| XmpError::bad_value("Not a real number", s)),
            other => Err(XmpError::BadValue(format!("Not a real number: {:?}", other))),
        }
    }

    pub fn to_integer(&self) -> XmpResult<i64> {
        match self {
            TagValue::Integer(v) => Ok(*v),
            TagValue::Real(v) if v.is_finite() => Ok(v.trunc() as i64),
            TagValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| XmpError::bad_value("Not an integer", s)),
            other => Err(XmpError::BadValue(format!("Not an integer: {:?}", other))),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TagValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            TagValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_regions(&self) -> Option<&RegionBag> {
        match self {
            TagValue::Regions(bag) => Some(bag),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Regions(bag) => write!(f, "[{} regions]", bag.len()),
            other => match other.to_text() {
                Ok(text) => f.write_str(&text),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(value: Vec<String>) -> Self {
        TagValue::List(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Real(value)
    }
}

impl From<RegionBag> for TagValue {
    fn from(value: RegionBag) -> Self {
        TagValue::Regions(value)
    }
}
