//! Element occurrence constraints
//!
//! Reads `minOccurs`, `maxOccurs` and `nillable` from an element declaration.
//! Absent attributes fall back to `1`, `1` and `false`.

use super::xsd_attrs;
use crate::documents::Element;
use crate::error::{ParseError, Result};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Upper occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// At most this many occurrences
    Bounded(u32),
    /// `maxOccurs="unbounded"`
    Unbounded,
}

impl MaxOccurs {
    /// The literal used for the unbounded sentinel in XSD and in JSON output
    pub const UNBOUNDED: &'static str = "unbounded";

    /// JSON form: a number, or the string `"unbounded"`
    pub fn to_json(&self) -> JsonValue {
        match self {
            MaxOccurs::Bounded(n) => JsonValue::from(*n),
            MaxOccurs::Unbounded => JsonValue::from(Self::UNBOUNDED),
        }
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{}", n),
            MaxOccurs::Unbounded => f.write_str(Self::UNBOUNDED),
        }
    }
}

/// Occurrence bounds and nillability of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceInfo {
    /// Minimum number of occurrences (default 1)
    pub min_occurs: u32,
    /// Maximum number of occurrences (default 1)
    pub max_occurs: MaxOccurs,
    /// Whether the element may be nil (default false)
    pub nillable: bool,
}

impl Default for OccurrenceInfo {
    fn default() -> Self {
        Self::once()
    }
}

impl OccurrenceInfo {
    /// Create new occurrence info
    pub fn new(min_occurs: u32, max_occurs: MaxOccurs, nillable: bool) -> Self {
        Self {
            min_occurs,
            max_occurs,
            nillable,
        }
    }

    /// Default occurrence (1, 1, not nillable)
    pub fn once() -> Self {
        Self::new(1, MaxOccurs::Bounded(1), false)
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self::new(0, MaxOccurs::Bounded(1), false)
    }

    /// Read the occurrence attributes of an element declaration
    pub fn from_element(elem: &Element) -> Result<Self> {
        let min_occurs = match elem.get_attribute(xsd_attrs::MIN_OCCURS) {
            Some(s) => parse_count(elem, xsd_attrs::MIN_OCCURS, s)?,
            None => 1,
        };

        let max_occurs = match elem.get_attribute(xsd_attrs::MAX_OCCURS).map(str::trim) {
            Some(MaxOccurs::UNBOUNDED) => MaxOccurs::Unbounded,
            Some(s) => MaxOccurs::Bounded(parse_count(elem, xsd_attrs::MAX_OCCURS, s)?),
            None => MaxOccurs::Bounded(1),
        };

        let nillable = match elem.get_attribute(xsd_attrs::NILLABLE).map(str::trim) {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") | None => false,
            Some(other) => {
                return Err(invalid_attribute(elem, xsd_attrs::NILLABLE, other).into());
            }
        };

        Ok(Self::new(min_occurs, max_occurs, nillable))
    }

    /// Append `min_occurs`, `max_occurs` and `nillable` to a JSON object
    pub fn write_json(&self, map: &mut Map<String, JsonValue>) {
        map.insert("min_occurs".to_string(), JsonValue::from(self.min_occurs));
        map.insert("max_occurs".to_string(), self.max_occurs.to_json());
        map.insert("nillable".to_string(), JsonValue::Bool(self.nillable));
    }
}

fn parse_count(elem: &Element, attr: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid_attribute(elem, attr, value).into())
}

fn invalid_attribute(elem: &Element, attr: &str, value: &str) -> ParseError {
    let name = elem.get_attribute(xsd_attrs::NAME).unwrap_or("<anonymous>");
    ParseError::new(format!("invalid {} value '{}'", attr, value))
        .with_location(format!("element '{}'", name))
}
