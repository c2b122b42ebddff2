//! Nested (containment) form
//!
//! Emits the element tree as nested `children` objects. When the schema has
//! a single root element with children of its own, that root is unwrapped so
//! its fields sit at the top level.

use super::{OutputShaper, SCHEMA_ID};
use crate::schema::ElementTree;
use serde_json::{Map, Value as JsonValue};

/// Shapes a tree into the nested form
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedShaper;

impl NestedShaper {
    /// Create a new nested shaper
    pub fn new() -> Self {
        Self
    }
}

impl OutputShaper for NestedShaper {
    fn shape(&self, tree: &ElementTree) -> Map<String, JsonValue> {
        let mut map = match tree.single_root() {
            Some((name, root)) if root.has_children() => {
                tracing::debug!(root = %name, "unwrapping single root element");
                match root.to_json() {
                    JsonValue::Object(map) => map,
                    _ => Map::new(),
                }
            }
            _ => {
                let children: Map<String, JsonValue> = tree
                    .roots
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json()))
                    .collect();
                let mut map = Map::new();
                map.insert("children".to_string(), JsonValue::Object(children));
                map
            }
        };
        map.insert("schema".to_string(), JsonValue::from(SCHEMA_ID));
        map.insert("type".to_string(), JsonValue::from("object"));
        map
    }

    fn is_lossy(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CompositeNode, OccurrenceInfo, SchemaNode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(roots: Vec<(&str, SchemaNode)>) -> ElementTree {
        let mut tree = ElementTree::default();
        for (name, node) in roots {
            tree.roots.insert(name.to_string(), node);
        }
        tree
    }

    fn root_with_child() -> SchemaNode {
        let mut node = CompositeNode::new(OccurrenceInfo::once());
        node.children.insert("Name".to_string(), SchemaNode::label("string"));
        SchemaNode::Composite(node)
    }

    #[test]
    fn test_single_root_with_children_is_unwrapped() {
        let map = NestedShaper::new().shape(&tree(vec![("Root", root_with_child())]));
        assert_eq!(
            JsonValue::Object(map),
            json!({
                "children": {
                    "Name": {"type": "string", "min_occurs": 1, "max_occurs": 1, "nillable": false}
                },
                "min_occurs": 1,
                "max_occurs": 1,
                "nillable": false,
                "schema": "http://json-schema.org/schema#",
                "type": "object"
            })
        );
    }

    #[test]
    fn test_single_leaf_root_is_kept() {
        let map = NestedShaper::new().shape(&tree(vec![("Note", SchemaNode::label("string"))]));
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["children", "schema", "type"]);
        assert_eq!(map["children"]["Note"]["type"], json!("string"));
    }

    #[test]
    fn test_several_roots_are_kept() {
        let map = NestedShaper::new().shape(&tree(vec![
            ("A", root_with_child()),
            ("B", root_with_child()),
        ]));
        let roots: Vec<_> = map["children"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(roots, vec!["A", "B"]);
        assert!(!NestedShaper::new().is_lossy());
    }
}
