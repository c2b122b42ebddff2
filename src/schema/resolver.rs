//! Type reference resolution
//!
//! Turns a raw [`TypeRegistry`] into a resolved one in which every
//! [`SchemaNode::TypeReference`] has been replaced by a copy of the named
//! type, itself resolved first. Names that are not registered become plain
//! type labels (built-in scalars such as `string` or `decimal`).
//!
//! The raw registry is never modified. Names currently being resolved are
//! kept on a stack; meeting one of them again means the type contains itself,
//! which is reported as [`Error::CycleDetected`].

use super::facets::RestrictionSet;
use super::nodes::{CompositeNode, OrderedChildren, SchemaNode, UnionNode};
use super::registry::TypeRegistry;
use crate::error::{Error, Result};
use crate::limits::Limits;
use indexmap::IndexSet;
use std::fmt;

/// A type being resolved, qualified by its name space
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Complex(String),
    Simple(String),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Complex(name) | TypeKey::Simple(name) => f.write_str(name),
        }
    }
}

/// Resolves the entries of a raw registry into a fresh one
#[derive(Debug)]
pub struct TypeResolver<'a> {
    raw: &'a TypeRegistry,
    limits: &'a Limits,
    resolved: TypeRegistry,
    resolving: IndexSet<TypeKey>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver over a raw registry
    pub fn new(raw: &'a TypeRegistry, limits: &'a Limits) -> Self {
        Self {
            raw,
            limits,
            resolved: TypeRegistry::new(),
            resolving: IndexSet::new(),
        }
    }

    /// Resolve every registered type, keeping the raw definition order
    pub fn resolve_all(mut self) -> Result<TypeRegistry> {
        for (name, _) in self.raw.complex_types() {
            self.resolve_complex(name, 0)?;
        }
        for (name, _) in self.raw.simple_types() {
            self.resolve_simple(name, 0)?;
        }

        // Dependencies were stored first; restore definition order
        let mut ordered = TypeRegistry::new();
        for (name, _) in self.raw.complex_types() {
            if let Some(node) = self.resolved.complex_type(name) {
                ordered.insert_complex(name.clone(), node.clone());
            }
        }
        for (name, _) in self.raw.simple_types() {
            if let Some(node) = self.resolved.simple_type(name) {
                ordered.insert_simple(name.clone(), node.clone());
            }
        }
        Ok(ordered)
    }

    /// Resolve one node against the registry
    pub fn resolve_node(&mut self, node: &SchemaNode, depth: usize) -> Result<SchemaNode> {
        self.limits.check_nesting_depth(depth)?;

        match node {
            SchemaNode::TypeReference(reference) => {
                let resolved = match self.resolve_named(&reference.name, depth)? {
                    Some(found) => found,
                    None => {
                        tracing::trace!(name = %reference.name, "unregistered type kept as label");
                        SchemaNode::label(reference.name.clone())
                    }
                };
                Ok(resolved.with_occurs(reference.occurs))
            }
            SchemaNode::Composite(composite) => {
                let mut children = OrderedChildren::with_capacity(composite.children.len());
                for (name, child) in &composite.children {
                    children.insert(name.clone(), self.resolve_node(child, depth + 1)?);
                }
                let attrs = composite
                    .attrs
                    .iter()
                    .map(|(name, set)| (name.clone(), self.raw.resolve_attribute(set.clone())))
                    .collect();
                Ok(SchemaNode::Composite(CompositeNode {
                    children,
                    attrs,
                    occurs: composite.occurs,
                }))
            }
            SchemaNode::Union(union) => {
                let mut members = Vec::with_capacity(union.members.len());
                for member in &union.members {
                    members.extend(self.resolve_member(member, depth)?);
                }
                Ok(SchemaNode::Union(UnionNode {
                    members,
                    occurs: union.occurs,
                }))
            }
            SchemaNode::Scalar(_) => Ok(node.clone()),
        }
    }

    fn resolve_named(&mut self, name: &str, depth: usize) -> Result<Option<SchemaNode>> {
        if self.raw.complex_type(name).is_some() {
            self.resolve_complex(name, depth + 1).map(Some)
        } else if self.raw.simple_type(name).is_some() {
            self.resolve_simple(name, depth + 1).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A union member naming a registered simple type contributes that
    /// type's restriction(s); any other member is kept as is
    fn resolve_member(&mut self, member: &RestrictionSet, depth: usize) -> Result<Vec<RestrictionSet>> {
        let Some(label) = member.as_label() else {
            return Ok(vec![member.clone()]);
        };
        if self.raw.simple_type(label).is_none() {
            return Ok(vec![member.clone()]);
        }
        let label = label.to_string();
        Ok(match self.resolve_simple(&label, depth + 1)? {
            SchemaNode::Scalar(scalar) => vec![scalar.restriction],
            SchemaNode::Union(union) => union.members,
            _ => vec![member.clone()],
        })
    }

    fn resolve_complex(&mut self, name: &str, depth: usize) -> Result<SchemaNode> {
        if let Some(done) = self.resolved.complex_type(name) {
            return Ok(done.clone());
        }
        let raw = self.raw.complex_type(name).cloned().unwrap_or_else(|| SchemaNode::label(name));
        let node = self.resolve_guarded(TypeKey::Complex(name.to_string()), &raw, depth)?;
        self.resolved.insert_complex(name, node.clone());
        Ok(node)
    }

    fn resolve_simple(&mut self, name: &str, depth: usize) -> Result<SchemaNode> {
        if let Some(done) = self.resolved.simple_type(name) {
            return Ok(done.clone());
        }
        let raw = self.raw.simple_type(name).cloned().unwrap_or_else(|| SchemaNode::label(name));
        let node = self.resolve_guarded(TypeKey::Simple(name.to_string()), &raw, depth)?;
        self.resolved.insert_simple(name, node.clone());
        Ok(node)
    }

    fn resolve_guarded(&mut self, key: TypeKey, raw: &SchemaNode, depth: usize) -> Result<SchemaNode> {
        if let Some(start) = self.resolving.get_index_of(&key) {
            let chain: Vec<String> = self
                .resolving
                .iter()
                .skip(start)
                .map(ToString::to_string)
                .chain(std::iter::once(key.to_string()))
                .collect();
            return Err(Error::CycleDetected(chain.join(" -> ")));
        }

        tracing::trace!(name = %key, depth, "resolving type");
        self.resolving.insert(key);
        let result = self.resolve_node(raw, depth);
        self.resolving.pop();
        result
    }
}
