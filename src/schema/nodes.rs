//! Schema tree nodes
//!
//! [`SchemaNode`] is the recursive sum type shared by the type registry, the
//! resolver and the element tree. Every variant carries the occurrence of the
//! element it was materialized for; registry entries use the default.

use super::facets::RestrictionSet;
use super::occurs::OccurrenceInfo;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

/// Child elements in containment order
pub type OrderedChildren = IndexMap<String, SchemaNode>;

/// Attribute name to its value constraints
pub type AttributeMap = IndexMap<String, RestrictionSet>;

/// An unresolved reference to a named type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Local name of the referenced type
    pub name: String,
    /// Occurrence of the referencing element
    pub occurs: OccurrenceInfo,
}

/// A leaf value constrained by a restriction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarNode {
    /// Base type and facets
    pub restriction: RestrictionSet,
    /// Occurrence of the element
    pub occurs: OccurrenceInfo,
}

/// An element with child elements and/or attributes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeNode {
    /// Child elements in document order
    pub children: OrderedChildren,
    /// Attributes declared on the element's type
    pub attrs: AttributeMap,
    /// Occurrence of the element
    pub occurs: OccurrenceInfo,
}

impl CompositeNode {
    /// Create an empty composite
    pub fn new(occurs: OccurrenceInfo) -> Self {
        Self {
            occurs,
            ..Self::default()
        }
    }
}

/// A simple-type union: any one member restriction is acceptable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionNode {
    /// Member restrictions in declaration order
    pub members: Vec<RestrictionSet>,
    /// Occurrence of the element
    pub occurs: OccurrenceInfo,
}

/// A node of the schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Named type not yet substituted; never present after resolution
    TypeReference(TypeReference),
    /// Leaf value
    Scalar(ScalarNode),
    /// Element with children and attributes
    Composite(CompositeNode),
    /// Union of alternative restrictions
    Union(UnionNode),
}

impl SchemaNode {
    /// Unresolved reference to the named type
    pub fn reference(name: impl Into<String>) -> Self {
        SchemaNode::TypeReference(TypeReference {
            name: name.into(),
            occurs: OccurrenceInfo::default(),
        })
    }

    /// Scalar from a restriction
    pub fn scalar(restriction: RestrictionSet) -> Self {
        SchemaNode::Scalar(ScalarNode {
            restriction,
            occurs: OccurrenceInfo::default(),
        })
    }

    /// Scalar holding only a type label, e.g. a built-in type
    pub fn label(type_name: impl Into<String>) -> Self {
        Self::scalar(RestrictionSet::named(type_name))
    }

    /// Union of member restrictions
    pub fn union(members: Vec<RestrictionSet>) -> Self {
        SchemaNode::Union(UnionNode {
            members,
            occurs: OccurrenceInfo::default(),
        })
    }

    /// Short variant name for messages
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaNode::TypeReference(_) => "reference",
            SchemaNode::Scalar(_) => "scalar",
            SchemaNode::Composite(_) => "composite",
            SchemaNode::Union(_) => "union",
        }
    }

    /// Occurrence of this node
    pub fn occurs(&self) -> &OccurrenceInfo {
        match self {
            SchemaNode::TypeReference(r) => &r.occurs,
            SchemaNode::Scalar(s) => &s.occurs,
            SchemaNode::Composite(c) => &c.occurs,
            SchemaNode::Union(u) => &u.occurs,
        }
    }

    /// Replace the occurrence, e.g. when a type is used by an element
    pub fn with_occurs(mut self, occurs: OccurrenceInfo) -> Self {
        match &mut self {
            SchemaNode::TypeReference(r) => r.occurs = occurs,
            SchemaNode::Scalar(s) => s.occurs = occurs,
            SchemaNode::Composite(c) => c.occurs = occurs,
            SchemaNode::Union(u) => u.occurs = occurs,
        }
        self
    }

    /// Child elements, for composites
    pub fn children(&self) -> Option<&OrderedChildren> {
        match self {
            SchemaNode::Composite(c) => Some(&c.children),
            _ => None,
        }
    }

    /// Whether this node has at least one child element
    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|c| !c.is_empty())
    }

    /// Names of type references still present anywhere below this node
    pub fn unresolved_references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            SchemaNode::TypeReference(r) => names.push(&r.name),
            SchemaNode::Composite(c) => {
                for child in c.children.values() {
                    child.collect_references(names);
                }
            }
            SchemaNode::Scalar(_) | SchemaNode::Union(_) => {}
        }
    }

    /// Whether no type reference remains below this node
    pub fn is_resolved(&self) -> bool {
        self.unresolved_references().is_empty()
    }

    /// Nested JSON form of this node
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        match self {
            SchemaNode::TypeReference(r) => {
                map.insert("type".to_string(), JsonValue::from(r.name.as_str()));
            }
            SchemaNode::Scalar(s) => s.restriction.write_json(&mut map),
            SchemaNode::Composite(c) => {
                if !c.children.is_empty() {
                    let children: Map<String, JsonValue> = c
                        .children
                        .iter()
                        .map(|(name, child)| (name.clone(), child.to_json()))
                        .collect();
                    map.insert("children".to_string(), JsonValue::Object(children));
                }
                if !c.attrs.is_empty() {
                    let attrs: Map<String, JsonValue> = c
                        .attrs
                        .iter()
                        .map(|(name, set)| (name.clone(), set.to_json()))
                        .collect();
                    map.insert("attrs".to_string(), JsonValue::Object(attrs));
                }
            }
            SchemaNode::Union(u) => {
                let members = u.members.iter().map(RestrictionSet::to_json).collect();
                map.insert("children".to_string(), JsonValue::Array(members));
            }
        }
        self.occurs().write_json(&mut map);
        JsonValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::facets::FacetKind;
    use crate::schema::occurs::MaxOccurs;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn composite(children: Vec<(&str, SchemaNode)>) -> SchemaNode {
        let mut node = CompositeNode::new(OccurrenceInfo::once());
        for (name, child) in children {
            node.children.insert(name.to_string(), child);
        }
        SchemaNode::Composite(node)
    }

    #[test]
    fn test_unresolved_references_are_found_at_depth() {
        let tree = composite(vec![
            ("a", SchemaNode::label("string")),
            ("b", composite(vec![("c", SchemaNode::reference("Address"))])),
        ]);
        assert_eq!(tree.unresolved_references(), vec!["Address"]);
        assert!(!tree.is_resolved());
        assert!(composite(vec![("a", SchemaNode::label("string"))]).is_resolved());
    }

    #[test]
    fn test_with_occurs_keeps_content() {
        let node = SchemaNode::label("int").with_occurs(OccurrenceInfo::optional());
        assert_eq!(node.occurs().min_occurs, 0);
        assert_eq!(node.kind(), "scalar");
    }

    #[test]
    fn test_composite_json() {
        let mut node = CompositeNode::new(OccurrenceInfo::new(1, MaxOccurs::Unbounded, false));
        node.children
            .insert("Name".to_string(), SchemaNode::label("string"));
        let mut kind = RestrictionSet::named("string");
        kind.add_facet(FacetKind::Enumeration, "home");
        node.attrs.insert("kind".to_string(), kind);

        assert_eq!(
            SchemaNode::Composite(node).to_json(),
            json!({
                "children": {
                    "Name": {"type": "string", "min_occurs": 1, "max_occurs": 1, "nillable": false}
                },
                "attrs": {"kind": {"type": "string", "enumeration": ["home"]}},
                "min_occurs": 1,
                "max_occurs": "unbounded",
                "nillable": false
            })
        );
    }

    #[test]
    fn test_empty_composite_has_no_children_key() {
        let json = composite(vec![]).to_json();
        assert!(json.get("children").is_none());
        assert!(!composite(vec![]).has_children());
    }

    #[test]
    fn test_union_json() {
        let node = SchemaNode::union(vec![RestrictionSet::named("int"), RestrictionSet::named("string")]);
        assert_eq!(
            node.to_json(),
            json!({
                "children": [{"type": "int"}, {"type": "string"}],
                "min_occurs": 1,
                "max_occurs": 1,
                "nillable": false
            })
        );
    }
}
