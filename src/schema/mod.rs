//! XSD schema components
//!
//! This module turns a parsed XSD document into schema trees:
//!
//! - [`occurs`]: `minOccurs`/`maxOccurs`/`nillable` extraction
//! - [`facets`]: restriction facets into a [`RestrictionSet`]
//! - [`nodes`]: the [`SchemaNode`] sum type
//! - [`registry`]: named complex and simple types
//! - [`resolver`]: substitution of type references with registry entries
//! - [`tree`]: the containment tree built from the document-root elements

pub mod facets;
pub mod nodes;
pub mod occurs;
pub mod registry;
pub mod resolver;
pub mod tree;

pub use facets::{FacetKind, RestrictionSet};
pub use nodes::{
    AttributeMap, CompositeNode, OrderedChildren, ScalarNode, SchemaNode, TypeReference,
    UnionNode,
};
pub use occurs::{MaxOccurs, OccurrenceInfo};
pub use registry::TypeRegistry;
pub use resolver::TypeResolver;
pub use tree::{ConflictPolicy, ElementTree, ElementTreeBuilder};

use crate::documents::Element;
use crate::namespaces::split_prefixed;
use crate::XSD_NAMESPACE;

/// XSD element local names
pub(crate) mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
}

/// XSD attribute names
pub(crate) mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const NILLABLE: &str = "nillable";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

/// A `type`/`base` attribute value, classified by namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeName {
    /// A type from the XSD namespace (`xs:string`, `xs:integer`, ...)
    Builtin(String),
    /// Any other type, looked up by local name
    Named(String),
}

impl TypeName {
    /// Classify a type attribute value found on `elem`
    pub(crate) fn parse(elem: &Element, value: &str) -> Self {
        match elem.resolve_qname(value) {
            Ok(qname) if qname.is_in(XSD_NAMESPACE) => TypeName::Builtin(qname.local_name),
            Ok(qname) => TypeName::Named(qname.local_name),
            Err(e) => {
                // Undeclared prefixes are tolerated; the local part still names the type
                tracing::debug!(value, error = %e, "type name with unresolved prefix");
                TypeName::Named(split_prefixed(value).1.to_string())
            }
        }
    }
}

/// Reduce a type name to its local part (`xs:string` -> `string`)
pub(crate) fn local_type_name(value: &str) -> String {
    split_prefixed(value.trim()).1.to_string()
}

/// Element declarations of a content model, in document order.
///
/// Walks compositors and content wrappers below `container` but does not
/// descend into the declarations it returns.
pub(crate) fn local_element_decls(container: &Element) -> Vec<&Element> {
    let mut decls = Vec::new();
    collect_element_decls(container, &mut decls);
    decls
}

fn collect_element_decls<'a>(container: &'a Element, decls: &mut Vec<&'a Element>) {
    use xsd_elements::*;

    for child in &container.children {
        if !child.qname.is_in(XSD_NAMESPACE) {
            continue;
        }
        match child.local_name() {
            ELEMENT => decls.push(child),
            COMPLEX_TYPE | SEQUENCE | CHOICE | ALL | COMPLEX_CONTENT | SIMPLE_CONTENT
            | EXTENSION | RESTRICTION => collect_element_decls(child, decls),
            _ => {}
        }
    }
}

/// Attribute declarations of a complex type: direct children plus those of
/// a simple/complex content derivation
pub(crate) fn attribute_decls(complex_type: &Element) -> Vec<&Element> {
    use xsd_elements::*;

    let mut decls: Vec<&Element> = complex_type.find_children(XSD_NAMESPACE, ATTRIBUTE).collect();
    for content in complex_type
        .children
        .iter()
        .filter(|c| c.qname.matches(XSD_NAMESPACE, SIMPLE_CONTENT) || c.qname.matches(XSD_NAMESPACE, COMPLEX_CONTENT))
    {
        for derivation in content
            .children
            .iter()
            .filter(|c| c.qname.matches(XSD_NAMESPACE, EXTENSION) || c.qname.matches(XSD_NAMESPACE, RESTRICTION))
        {
            decls.extend(derivation.find_children(XSD_NAMESPACE, ATTRIBUTE));
        }
    }
    decls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn schema_root(xml: &str) -> Element {
        Document::from_string(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_type_name_classification() {
        let root = schema_root(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:t"/>"#,
        );
        assert_eq!(TypeName::parse(&root, "xs:string"), TypeName::Builtin("string".into()));
        assert_eq!(TypeName::parse(&root, "tns:Person"), TypeName::Named("Person".into()));
        assert_eq!(TypeName::parse(&root, "Person"), TypeName::Named("Person".into()));
        assert_eq!(TypeName::parse(&root, "nope:Person"), TypeName::Named("Person".into()));
    }

    #[test]
    fn test_local_element_decls_stop_at_declarations() {
        let root = schema_root(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="Root">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:element name="A">
                                <xs:complexType><xs:sequence>
                                    <xs:element name="Inner"/>
                                </xs:sequence></xs:complexType>
                            </xs:element>
                            <xs:choice>
                                <xs:element name="B"/>
                            </xs:choice>
                        </xs:sequence>
                        <xs:attribute name="id"/>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
        );
        let root_decl = root.find_child(XSD_NAMESPACE, "element").unwrap();
        let names: Vec<_> = local_element_decls(root_decl)
            .into_iter()
            .filter_map(|e| e.get_attribute("name"))
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_attribute_decls_include_simple_content() {
        let root = schema_root(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:complexType name="Price">
                    <xs:simpleContent>
                        <xs:extension base="xs:decimal">
                            <xs:attribute name="currency" type="xs:string"/>
                        </xs:extension>
                    </xs:simpleContent>
                </xs:complexType>
            </xs:schema>"#,
        );
        let ct = root.find_child(XSD_NAMESPACE, "complexType").unwrap();
        let names: Vec<_> = attribute_decls(ct)
            .into_iter()
            .filter_map(|e| e.get_attribute("name"))
            .collect();
        assert_eq!(names, vec!["currency"]);
    }

    #[test]
    fn test_local_type_name() {
        assert_eq!(local_type_name("xs:decimal"), "decimal");
        assert_eq!(local_type_name("decimal"), "decimal");
    }
}
