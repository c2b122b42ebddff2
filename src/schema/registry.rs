//! Named type registry
//!
//! Collects the top-level `xs:complexType` and `xs:simpleType` definitions of
//! a schema into two independent name spaces. A name may appear in both; on
//! lookup the complex type is preferred.

use super::facets::RestrictionSet;
use super::nodes::SchemaNode;
use super::resolver::TypeResolver;
use super::tree::ElementTreeBuilder;
use super::{local_type_name, xsd_attrs, xsd_elements};
use crate::documents::Element;
use crate::error::{ParseError, Result};
use crate::limits::Limits;
use crate::XSD_NAMESPACE;
use indexmap::IndexMap;

/// Named complex and simple types of one schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    complex_types: IndexMap<String, SchemaNode>,
    simple_types: IndexMap<String, SchemaNode>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the top-level type definitions of a schema element.
    ///
    /// Complex type content is built with `builder`; references to other named
    /// types stay unresolved until [`TypeRegistry::resolve`].
    pub fn build(schema: &Element, builder: &ElementTreeBuilder) -> Result<Self> {
        let mut registry = Self::new();

        for complex_type in schema.find_children(XSD_NAMESPACE, xsd_elements::COMPLEX_TYPE) {
            let name = type_name(complex_type)?;
            let node = builder.build_complex_type(complex_type)?;
            registry.insert_complex(name, node);
            builder.limits().check_types(registry.len())?;
        }

        for simple_type in schema.find_children(XSD_NAMESPACE, xsd_elements::SIMPLE_TYPE) {
            let name = type_name(simple_type)?;
            registry.insert_simple(name, simple_type_node(simple_type));
            builder.limits().check_types(registry.len())?;
        }

        tracing::debug!(
            complex = registry.complex_types.len(),
            simple = registry.simple_types.len(),
            "type registry built"
        );
        Ok(registry)
    }

    /// Produce a fresh registry with every type reference substituted
    pub fn resolve(&self, limits: &Limits) -> Result<TypeRegistry> {
        TypeResolver::new(self, limits).resolve_all()
    }

    /// Register a complex type; a later definition replaces an earlier one
    pub fn insert_complex(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        let previous = self.complex_types.insert(name.clone(), node);
        if previous.is_some() {
            tracing::debug!(name = %name, "complex type redefined, last definition wins");
        }
        previous
    }

    /// Register a simple type; a later definition replaces an earlier one
    pub fn insert_simple(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        let previous = self.simple_types.insert(name.clone(), node);
        if previous.is_some() {
            tracing::debug!(name = %name, "simple type redefined, last definition wins");
        }
        previous
    }

    /// Look up a complex type by name
    pub fn complex_type(&self, name: &str) -> Option<&SchemaNode> {
        self.complex_types.get(name)
    }

    /// Look up a simple type by name
    pub fn simple_type(&self, name: &str) -> Option<&SchemaNode> {
        self.simple_types.get(name)
    }

    /// Look up a type by name, complex types first
    pub fn lookup(&self, name: &str) -> Option<&SchemaNode> {
        self.complex_type(name).or_else(|| self.simple_type(name))
    }

    /// Iterate over complex types in definition order
    pub fn complex_types(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.complex_types.iter()
    }

    /// Iterate over simple types in definition order
    pub fn simple_types(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.simple_types.iter()
    }

    /// Total number of registered types
    pub fn len(&self) -> usize {
        self.complex_types.len() + self.simple_types.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether no type reference remains in any entry
    pub fn is_resolved(&self) -> bool {
        self.complex_types
            .values()
            .chain(self.simple_types.values())
            .all(SchemaNode::is_resolved)
    }

    /// Replace a bare attribute type label by the named simple restriction
    pub fn resolve_attribute(&self, set: RestrictionSet) -> RestrictionSet {
        let Some(label) = set.as_label() else {
            return set;
        };
        match self.simple_type(label) {
            Some(SchemaNode::Scalar(scalar)) => scalar.restriction.clone(),
            _ => set,
        }
    }

    /// Replace bare union members that name a registered simple type by that
    /// type's restriction(s). Entries of a resolved registry are already
    /// expanded, so one level suffices.
    pub fn expand_union_members(&self, node: SchemaNode) -> SchemaNode {
        let SchemaNode::Union(mut union) = node else {
            return node;
        };
        let mut members = Vec::with_capacity(union.members.len());
        for member in union.members {
            match member.as_label().and_then(|label| self.simple_type(label)) {
                Some(SchemaNode::Scalar(scalar)) => members.push(scalar.restriction.clone()),
                Some(SchemaNode::Union(nested)) => members.extend(nested.members.iter().cloned()),
                _ => members.push(member),
            }
        }
        union.members = members;
        SchemaNode::Union(union)
    }
}

fn type_name(definition: &Element) -> Result<String> {
    definition
        .get_attribute(xsd_attrs::NAME)
        .map(str::to_string)
        .ok_or_else(|| {
            ParseError::new(format!("top-level {} without a name", definition.local_name()))
                .with_location(format!("{}", definition.qname))
                .into()
        })
}

/// Schema node of an `xs:simpleType`: a union of member restrictions, or a
/// single restriction
pub(crate) fn simple_type_node(simple_type: &Element) -> SchemaNode {
    let Some(union) = simple_type.find_child(XSD_NAMESPACE, xsd_elements::UNION) else {
        return SchemaNode::scalar(RestrictionSet::from_simple_type(simple_type));
    };

    let mut members: Vec<RestrictionSet> = union
        .get_attribute(xsd_attrs::MEMBER_TYPES)
        .map(|list| {
            list.split_whitespace()
                .map(|member| RestrictionSet::named(local_type_name(member)))
                .collect()
        })
        .unwrap_or_default();
    members.extend(
        union
            .find_children(XSD_NAMESPACE, xsd_elements::SIMPLE_TYPE)
            .map(RestrictionSet::from_simple_type),
    );

    SchemaNode::union(members)
}
