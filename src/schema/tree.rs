//! Element containment tree
//!
//! Builds the ordered tree of element declarations reachable from the
//! document-root `xs:element`s. Typed elements are materialized from the
//! resolved [`TypeRegistry`]; anonymous types are expanded inline.
//!
//! The same element logic builds the children of top-level complex types for
//! the registry, in which case named types are left as
//! [`SchemaNode::TypeReference`]s for the resolver.

use super::facets::RestrictionSet;
use super::nodes::{AttributeMap, CompositeNode, OrderedChildren, SchemaNode};
use super::occurs::OccurrenceInfo;
use super::registry::{simple_type_node, TypeRegistry};
use super::{attribute_decls, local_element_decls, local_type_name, xsd_attrs, xsd_elements, TypeName};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::XSD_NAMESPACE;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// What to do when a nested element reuses an already visited name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Skip the later declaration entirely; the first one seen defines the name
    #[default]
    FirstWins,
    /// Build the later declaration and fail if it differs from the first
    ErrorOnConflict,
    /// Keep every declaration at its own position
    Merge,
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first-wins" | "first" => Ok(ConflictPolicy::FirstWins),
            "error" | "error-on-conflict" => Ok(ConflictPolicy::ErrorOnConflict),
            "merge" => Ok(ConflictPolicy::Merge),
            _ => Err(Error::Parse(crate::error::ParseError::new(format!(
                "unknown conflict policy '{}'. Use: first-wins, error, merge",
                s
            )))),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictPolicy::FirstWins => "first-wins",
            ConflictPolicy::ErrorOnConflict => "error",
            ConflictPolicy::Merge => "merge",
        })
    }
}

/// Ordered tree of the document-root elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTree {
    /// Root elements in document order
    pub roots: OrderedChildren,
}

impl ElementTree {
    /// Number of root elements
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the schema declares no root element
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Look up a root element by name
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.roots.get(name)
    }

    /// The only root, if there is exactly one
    pub fn single_root(&self) -> Option<(&String, &SchemaNode)> {
        if self.roots.len() == 1 {
            self.roots.first()
        } else {
            None
        }
    }

    /// Whether no type reference remains anywhere in the tree
    pub fn is_resolved(&self) -> bool {
        self.roots.values().all(SchemaNode::is_resolved)
    }
}

/// Where typed elements get their content from
#[derive(Clone, Copy)]
enum TypeSource<'r> {
    /// Leave named types as references (registry construction)
    Deferred,
    /// Substitute from an already resolved registry
    Resolved(&'r TypeRegistry),
}

/// Per-traversal state: the visited element names
struct BuildContext<'r> {
    types: TypeSource<'r>,
    /// Visited names; the first definition is kept only when it is needed
    /// for conflict checks, `None` while it is still being built
    visited: IndexMap<String, Option<SchemaNode>>,
    /// Whether visited names are tracked at all; detached builds expand
    /// every declaration
    track_names: bool,
}

impl<'r> BuildContext<'r> {
    fn new(types: TypeSource<'r>) -> Self {
        Self {
            types,
            visited: IndexMap::new(),
            track_names: true,
        }
    }

    fn detached(types: TypeSource<'r>) -> Self {
        Self {
            track_names: false,
            ..Self::new(types)
        }
    }
}

/// Builds element trees and complex-type content
#[derive(Debug, Clone, Default)]
pub struct ElementTreeBuilder {
    policy: ConflictPolicy,
    limits: Limits,
}

impl ElementTreeBuilder {
    /// Create a builder with the default policy and limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the conflict policy
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The conflict policy in use
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// The limits in use
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Build the tree of the schema's top-level element declarations
    pub fn build(&self, schema: &Element, registry: &TypeRegistry) -> Result<ElementTree> {
        let mut ctx = BuildContext::new(TypeSource::Resolved(registry));
        let mut tree = ElementTree::default();

        for decl in schema.find_children(XSD_NAMESPACE, xsd_elements::ELEMENT) {
            let Some(name) = decl.get_attribute(xsd_attrs::NAME) else {
                tracing::debug!("skipping top-level element declaration without name");
                continue;
            };
            // Roots are always built, even when the name was seen nested before
            let first_sight = !ctx.visited.contains_key(name);
            if first_sight {
                ctx.visited.insert(name.to_string(), None);
            }
            let node = self.build_element(decl, &mut ctx, 1)?;
            if first_sight {
                self.record(&mut ctx, decl, name, 1)?;
            }
            tracing::debug!(element = name, kind = node.kind(), "built root element");
            tree.roots.insert(name.to_string(), node);
        }

        Ok(tree)
    }

    /// Build a top-level complex type as an unresolved composite
    pub fn build_complex_type(&self, complex_type: &Element) -> Result<SchemaNode> {
        let mut ctx = BuildContext::new(TypeSource::Deferred);
        let mut node = CompositeNode::new(OccurrenceInfo::default());
        node.attrs = self.build_attributes(complex_type, ctx.types);
        self.build_children(complex_type, &mut node.children, &mut ctx, 1)?;
        Ok(SchemaNode::Composite(node))
    }

    fn build_element(&self, decl: &Element, ctx: &mut BuildContext<'_>, depth: usize) -> Result<SchemaNode> {
        self.limits.check_nesting_depth(depth)?;
        let occurs = OccurrenceInfo::from_element(decl)?;

        if let Some(type_attr) = decl.get_attribute(xsd_attrs::TYPE) {
            let node = match (TypeName::parse(decl, type_attr), ctx.types) {
                (TypeName::Builtin(name), _) => SchemaNode::label(name),
                (TypeName::Named(name), TypeSource::Deferred) => SchemaNode::reference(name),
                (TypeName::Named(name), TypeSource::Resolved(registry)) => {
                    match registry.lookup(&name) {
                        Some(found) => found.clone(),
                        None => SchemaNode::label(name),
                    }
                }
            };
            return Ok(node.with_occurs(occurs));
        }

        if let Some(simple_type) = decl.find_child(XSD_NAMESPACE, xsd_elements::SIMPLE_TYPE) {
            let node = match ctx.types {
                TypeSource::Resolved(registry) => registry.expand_union_members(simple_type_node(simple_type)),
                TypeSource::Deferred => simple_type_node(simple_type),
            };
            return Ok(node.with_occurs(occurs));
        }

        let mut node = CompositeNode::new(occurs);
        if let Some(complex_type) = decl.find_child(XSD_NAMESPACE, xsd_elements::COMPLEX_TYPE) {
            node.attrs = self.build_attributes(complex_type, ctx.types);
        }
        self.build_children(decl, &mut node.children, ctx, depth + 1)?;
        Ok(SchemaNode::Composite(node))
    }

    fn build_children(
        &self,
        container: &Element,
        children: &mut OrderedChildren,
        ctx: &mut BuildContext<'_>,
        depth: usize,
    ) -> Result<()> {
        for decl in local_element_decls(container) {
            let Some(name) = decl.get_attribute(xsd_attrs::NAME) else {
                tracing::debug!(
                    reference = decl.get_attribute(xsd_attrs::REF),
                    "skipping element declaration without name"
                );
                continue;
            };

            if !ctx.track_names {
                let node = self.build_element(decl, ctx, depth)?;
                children.entry(name.to_string()).or_insert(node);
                continue;
            }

            if let Some(first) = ctx.visited.get(name) {
                match self.policy {
                    ConflictPolicy::FirstWins => {
                        tracing::debug!(element = name, "already visited, skipped");
                        continue;
                    }
                    ConflictPolicy::ErrorOnConflict => {
                        let Some(first) = first.clone() else {
                            return Err(Error::NameConflict(format!(
                                "element '{}' is redeclared inside its own definition",
                                name
                            )));
                        };
                        if self.build_detached(decl, ctx.types, depth)? != first {
                            return Err(Error::NameConflict(format!(
                                "element '{}' is declared more than once with different content",
                                name
                            )));
                        }
                        tracing::debug!(element = name, "identical redeclaration skipped");
                        continue;
                    }
                    ConflictPolicy::Merge => {}
                }
            } else {
                ctx.visited.insert(name.to_string(), None);
            }

            let node = self.build_element(decl, ctx, depth)?;
            self.record(ctx, decl, name, depth)?;
            children.insert(name.to_string(), node);
        }
        Ok(())
    }

    /// Keep the complete first definition of `name` for later comparisons.
    /// Only needed under [`ConflictPolicy::ErrorOnConflict`].
    fn record(&self, ctx: &mut BuildContext<'_>, decl: &Element, name: &str, depth: usize) -> Result<()> {
        if self.policy != ConflictPolicy::ErrorOnConflict {
            return Ok(());
        }
        let full = self.build_detached(decl, ctx.types, depth)?;
        if let Some(slot) = ctx.visited.get_mut(name) {
            if slot.is_none() {
                *slot = Some(full);
            }
        }
        Ok(())
    }

    /// Build a declaration without visited-name tracking, so that names
    /// seen elsewhere in the tree do not prune its content
    fn build_detached(&self, decl: &Element, types: TypeSource<'_>, depth: usize) -> Result<SchemaNode> {
        let mut scratch = BuildContext::detached(types);
        self.build_element(decl, &mut scratch, depth)
    }

    fn build_attributes(&self, complex_type: &Element, types: TypeSource<'_>) -> AttributeMap {
        let mut attrs = AttributeMap::new();
        for decl in attribute_decls(complex_type) {
            let Some(name) = decl.get_attribute(xsd_attrs::NAME) else {
                continue;
            };
            let restriction = match decl.find_child(XSD_NAMESPACE, xsd_elements::SIMPLE_TYPE) {
                Some(simple_type) => RestrictionSet::from_simple_type(simple_type),
                None => decl
                    .get_attribute(xsd_attrs::TYPE)
                    .map(|t| RestrictionSet::named(local_type_name(t)))
                    .unwrap_or_default(),
            };
            let restriction = match types {
                TypeSource::Resolved(registry) => registry.resolve_attribute(restriction),
                TypeSource::Deferred => restriction,
            };
            attrs.insert(name.to_string(), restriction);
        }
        attrs
    }
}
