//! XSD constraining facets
//!
//! A restriction is reduced to a flat [`RestrictionSet`]: the base type name
//! plus one entry per facet. `enumeration` and `pattern` accumulate (any one
//! value satisfies the constraint); every other facet keeps its last value.

use super::{local_type_name, xsd_attrs, xsd_elements};
use crate::documents::Element;
use crate::XSD_NAMESPACE;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Facet kinds, declared in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKind {
    /// Acceptable literal values (multi-valued)
    Enumeration,
    /// Maximum number of decimal places
    FractionDigits,
    /// Exact length
    Length,
    /// Exclusive upper bound
    MaxExclusive,
    /// Inclusive upper bound
    MaxInclusive,
    /// Maximum length
    MaxLength,
    /// Exclusive lower bound
    MinExclusive,
    /// Inclusive lower bound
    MinInclusive,
    /// Minimum length
    MinLength,
    /// Regular expressions (multi-valued)
    Pattern,
    /// Exact number of digits
    TotalDigits,
    /// White space handling
    WhiteSpace,
}

impl FacetKind {
    /// All facet kinds in output order
    pub const ALL: [FacetKind; 12] = [
        FacetKind::Enumeration,
        FacetKind::FractionDigits,
        FacetKind::Length,
        FacetKind::MaxExclusive,
        FacetKind::MaxInclusive,
        FacetKind::MaxLength,
        FacetKind::MinExclusive,
        FacetKind::MinInclusive,
        FacetKind::MinLength,
        FacetKind::Pattern,
        FacetKind::TotalDigits,
        FacetKind::WhiteSpace,
    ];

    /// Look up a facet by its XSD element local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// XSD element local name, also used as the JSON key
    pub fn name(&self) -> &'static str {
        match self {
            FacetKind::Enumeration => "enumeration",
            FacetKind::FractionDigits => "fractionDigits",
            FacetKind::Length => "length",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::MaxLength => "maxLength",
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::MinLength => "minLength",
            FacetKind::Pattern => "pattern",
            FacetKind::TotalDigits => "totalDigits",
            FacetKind::WhiteSpace => "whiteSpace",
        }
    }

    /// Whether repeated occurrences accumulate instead of overwriting
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FacetKind::Enumeration | FacetKind::Pattern)
    }
}

/// Scalar value constraints extracted from an `xs:restriction`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionSet {
    /// Local name of the `base` type, if any
    pub base_type: Option<String>,
    /// Enumerated values in document order
    pub enumeration: Vec<String>,
    /// Patterns in document order
    pub pattern: Vec<String>,
    /// Single-valued facets
    single: BTreeMap<FacetKind, String>,
}

impl RestrictionSet {
    /// Create an empty restriction set
    pub fn new() -> Self {
        Self::default()
    }

    /// A bare type label with no facets
    pub fn named(base_type: impl Into<String>) -> Self {
        Self {
            base_type: Some(base_type.into()),
            ..Self::default()
        }
    }

    /// Extract facets from an `xs:restriction` element
    pub fn from_restriction(restriction: &Element) -> Self {
        let mut set = Self {
            base_type: restriction.get_attribute(xsd_attrs::BASE).map(local_type_name),
            ..Self::default()
        };

        for facet in restriction.children.iter().filter(|c| c.qname.is_in(XSD_NAMESPACE)) {
            let Some(kind) = FacetKind::from_local_name(facet.local_name()) else {
                continue;
            };
            match facet.get_attribute(xsd_attrs::VALUE) {
                Some(value) => set.add_facet(kind, value),
                None => tracing::debug!(facet = kind.name(), "facet without value ignored"),
            }
        }

        set
    }

    /// Extract the restriction of an `xs:simpleType` (or of any element
    /// wrapping one, such as an `xs:attribute`)
    pub fn from_simple_type(simple_type: &Element) -> Self {
        simple_type
            .find_child(XSD_NAMESPACE, xsd_elements::RESTRICTION)
            .map(Self::from_restriction)
            .unwrap_or_default()
    }

    /// Add one facet value
    pub fn add_facet(&mut self, kind: FacetKind, value: impl Into<String>) {
        let value = value.into();
        match kind {
            FacetKind::Enumeration => self.enumeration.push(value),
            FacetKind::Pattern => self.pattern.push(value),
            _ => {
                self.single.insert(kind, value);
            }
        }
    }

    /// Value of a single-valued facet
    pub fn facet(&self, kind: FacetKind) -> Option<&str> {
        self.single.get(&kind).map(String::as_str)
    }

    /// Whether any facet is set
    pub fn has_facets(&self) -> bool {
        !self.enumeration.is_empty() || !self.pattern.is_empty() || !self.single.is_empty()
    }

    /// A base type name without facets, e.g. `{type: "string"}`
    pub fn as_label(&self) -> Option<&str> {
        if self.has_facets() {
            None
        } else {
            self.base_type.as_deref()
        }
    }

    /// Write `type` followed by the facets in [`FacetKind::ALL`] order
    pub fn write_json(&self, map: &mut Map<String, JsonValue>) {
        if let Some(ref base) = self.base_type {
            map.insert("type".to_string(), JsonValue::from(base.as_str()));
        }
        for kind in FacetKind::ALL {
            let value = match kind {
                FacetKind::Enumeration if !self.enumeration.is_empty() => {
                    JsonValue::from(self.enumeration.clone())
                }
                FacetKind::Pattern if !self.pattern.is_empty() => JsonValue::from(self.pattern.clone()),
                _ => match self.single.get(&kind) {
                    Some(v) => JsonValue::from(v.as_str()),
                    None => continue,
                },
            };
            map.insert(kind.name().to_string(), value);
        }
    }

    /// JSON object of this restriction alone
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        self.write_json(&mut map);
        JsonValue::Object(map)
    }
}
