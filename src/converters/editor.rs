//! Editor-assist (flattened) form
//!
//! The containment tree is reshaped into one entry per element name. Every
//! appearance of a name, under any parent, is merged into the same entry:
//! children become a set of names, attributes keep only their enumerations,
//! and union alternatives are collected as `conditions`.

use super::{OutputShaper, SCHEMA_ID};
use crate::schema::{AttributeMap, ElementTree, OccurrenceInfo, RestrictionSet, SchemaNode};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value as JsonValue};

/// Deduplicated set of element names (first-insertion order)
pub type NameSet = IndexSet<String>;

/// Key of the synthetic entry listing the document-root elements
pub const TOP_KEY: &str = "!top";

/// One element name of the flattened schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatEntry {
    /// Names of child elements seen under this name
    pub children: NameSet,
    /// Attributes seen on this name
    pub attrs: AttributeMap,
    /// Scalar constraints of the last appearance, if it was a scalar
    pub restriction: Option<RestrictionSet>,
    /// Occurrence of the last appearance
    pub occurs: Option<OccurrenceInfo>,
    /// Alternative restrictions from union types
    pub conditions: Vec<RestrictionSet>,
}

impl FlatEntry {
    /// Merge the non-container fields of one appearance into this entry
    fn absorb(&mut self, node: &SchemaNode) {
        self.occurs = Some(*node.occurs());
        match node {
            SchemaNode::Composite(composite) => {
                for (name, set) in &composite.attrs {
                    self.attrs.insert(name.clone(), set.clone());
                }
            }
            SchemaNode::Scalar(scalar) => self.restriction = Some(scalar.restriction.clone()),
            SchemaNode::TypeReference(reference) => {
                self.restriction = Some(RestrictionSet::named(reference.name.clone()));
            }
            SchemaNode::Union(_) => {}
        }
    }

    fn add_condition(&mut self, condition: &RestrictionSet) {
        if !self.conditions.contains(condition) {
            self.conditions.push(condition.clone());
        }
    }

    /// Editor JSON: children list, attribute enumerations, remaining fields
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert(
            "children".to_string(),
            JsonValue::from(self.children.iter().cloned().collect::<Vec<_>>()),
        );
        if !self.attrs.is_empty() {
            let attrs: Map<String, JsonValue> = self
                .attrs
                .iter()
                .map(|(name, set)| {
                    let values = if set.enumeration.is_empty() {
                        JsonValue::Null
                    } else {
                        JsonValue::from(set.enumeration.clone())
                    };
                    (name.clone(), values)
                })
                .collect();
            map.insert("attrs".to_string(), JsonValue::Object(attrs));
        }
        if let Some(ref restriction) = self.restriction {
            restriction.write_json(&mut map);
        }
        if let Some(ref occurs) = self.occurs {
            occurs.write_json(&mut map);
        }
        if !self.conditions.is_empty() {
            let conditions = self.conditions.iter().map(RestrictionSet::to_json).collect();
            map.insert("conditions".to_string(), JsonValue::Array(conditions));
        }
        JsonValue::Object(map)
    }
}

/// Name-indexed schema built from an element tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatSchema {
    /// Names of the document-root elements
    pub top: NameSet,
    /// One entry per element name, in first-seen order
    pub entries: IndexMap<String, FlatEntry>,
}

impl FlatSchema {
    /// Flatten an element tree
    pub fn from_tree(tree: &ElementTree) -> Self {
        let mut flat = Self::default();
        for (name, node) in &tree.roots {
            flat.top.insert(name.clone());
            flat.visit(name, node);
        }
        tracing::debug!(entries = flat.entries.len(), roots = flat.top.len(), "schema flattened");
        flat
    }

    /// Record one appearance of `name`, then its children
    fn visit(&mut self, name: &str, node: &SchemaNode) {
        self.entries.entry(name.to_string()).or_default().absorb(node);

        match node {
            SchemaNode::Composite(composite) => {
                for (child_name, child) in &composite.children {
                    if let Some(entry) = self.entries.get_mut(name) {
                        entry.children.insert(child_name.clone());
                    }
                    self.visit(child_name, child);
                }
            }
            SchemaNode::Union(union) => {
                if let Some(entry) = self.entries.get_mut(name) {
                    for member in &union.members {
                        entry.add_condition(member);
                    }
                }
            }
            SchemaNode::Scalar(_) | SchemaNode::TypeReference(_) => {}
        }
    }

    /// Look up an entry by element name
    pub fn get(&self, name: &str) -> Option<&FlatEntry> {
        self.entries.get(name)
    }

    /// Editor JSON body: `!top` followed by one object per entry
    pub fn to_json_map(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        map.insert(
            TOP_KEY.to_string(),
            JsonValue::from(self.top.iter().cloned().collect::<Vec<_>>()),
        );
        for (name, entry) in &self.entries {
            map.insert(name.clone(), entry.to_json());
        }
        map
    }
}

/// Shapes a tree into the flattened editor form
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorShaper;

impl EditorShaper {
    /// Create a new editor shaper
    pub fn new() -> Self {
        Self
    }
}

impl OutputShaper for EditorShaper {
    fn shape(&self, tree: &ElementTree) -> Map<String, JsonValue> {
        let mut map = FlatSchema::from_tree(tree).to_json_map();
        map.insert("schema".to_string(), JsonValue::from(SCHEMA_ID));
        map.insert("type".to_string(), JsonValue::from("object"));
        map
    }

    fn is_lossy(&self) -> bool {
        true
    }
}
