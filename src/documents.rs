//! XML document handling
//!
//! A small namespace-aware DOM over `quick-xml` events. Elements keep their
//! resolved qualified name and the namespace mappings in scope, and can be
//! queried for children or descendants by `(namespace, local name)`.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{split_prefixed, NamespaceContext, QName};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes (namespace declarations excluded)
    pub attributes: HashMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace mappings in scope at this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: HashMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an unqualified attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.namespace.is_none() && qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Direct children with the given qualified name, in document order
    pub fn find_children<'a>(
        &'a self,
        namespace: &str,
        local_name: &str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        let namespace = namespace.to_string();
        let local_name = local_name.to_string();
        self.children
            .iter()
            .filter(move |e| e.qname.matches(&namespace, &local_name))
    }

    /// First direct child with the given qualified name
    pub fn find_child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|e| e.qname.matches(namespace, local_name))
    }

    /// Resolve a prefixed name (e.g. an attribute value like `xs:string`)
    /// against the namespaces in scope at this element
    pub fn resolve_qname(&self, prefixed_name: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed_name)
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes(), &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8], limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = Self::parse_element(&e, element_stack.last(), limits)?;
                    element_stack.push(element);
                    limits.check_xml_depth(element_stack.len())?;
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        Self::attach(&mut doc, &mut element_stack, current)?;
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, element_stack.last(), limits)?;
                    Self::attach(&mut doc, &mut element_stack, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.set_text(text);
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                        current.set_text(text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore other events (comments, processing instructions, etc.)
            }
            buf.clear();
        }

        if let Some(open) = element_stack.last() {
            return Err(Error::Xml(format!(
                "unexpected end of document: element '{}' is not closed",
                open.local_name()
            )));
        }
        if doc.root.is_none() {
            return Err(Error::Xml("document has no root element".to_string()));
        }

        Ok(doc)
    }

    fn attach(doc: &mut Document, stack: &mut [Element], element: Element) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.add_child(element);
        } else if doc.root.is_some() {
            return Err(Error::Xml(format!(
                "multiple root elements: unexpected '{}'",
                element.local_name()
            )));
        } else {
            doc.root = Some(element);
        }
        Ok(())
    }

    /// Parse element from BytesStart event, resolving its namespace against
    /// the parent's scope plus its own declarations
    fn parse_element(start: &BytesStart, parent: Option<&Element>, limits: &Limits) -> Result<Element> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut namespaces = parent.map(|p| p.namespaces.clone()).unwrap_or_default();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            // Handle namespace declarations
            if attr_name == "xmlns" {
                namespaces.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        let qname = namespaces
            .resolve(&name)
            .map_err(|e| Error::Xml(format!("element '{}': {}", name, e)))?;
        let mut element = Element::new(qname);

        for (attr_name, attr_value) in raw_attributes {
            // Unprefixed attributes are in no namespace
            let attr_qname = match split_prefixed(&attr_name) {
                (Some(_), _) => namespaces
                    .resolve(&attr_name)
                    .map_err(|e| Error::Xml(format!("attribute '{}': {}", attr_name, e)))?,
                (None, local) => QName::local(local),
            };
            element.attributes.insert(attr_qname, attr_value);
        }
        element.namespaces = namespaces;

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XSD_NAMESPACE;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("value2"));
        assert_eq!(root.get_attribute("missing"), None);
    }

    #[test]
    fn test_namespace_resolution_is_inherited() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="a"><xs:complexType/></xs:element>
        </xs:schema>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert!(root.qname.matches(XSD_NAMESPACE, "schema"));
        let element = root.find_child(XSD_NAMESPACE, "element").unwrap();
        assert_eq!(element.get_attribute("name"), Some("a"));
        assert!(element.find_child(XSD_NAMESPACE, "complexType").is_some());
        assert_eq!(
            element.resolve_qname("xs:string").unwrap(),
            QName::namespaced(XSD_NAMESPACE, "string")
        );
    }

    #[test]
    fn test_prefix_choice_does_not_matter() {
        let xml = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"><xsd:element name="a"/></xsd:schema>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.find_children(XSD_NAMESPACE, "element").count(), 1);
    }

    #[test]
    fn test_find_child_qualified() {
        let xml = r#"<x:r xmlns:x="urn:x" xmlns:y="urn:y"><y:a n="0"/><x:a n="1"/><x:a n="2"/></x:r>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root().unwrap();

        let found = root.find_child("urn:x", "a").unwrap();
        assert_eq!(found.get_attribute("n"), Some("1"));
        assert!(root.find_child("urn:z", "a").is_none());

        let names: Vec<_> = root
            .find_children("urn:x", &String::from("a"))
            .filter_map(|e| e.get_attribute("n"))
            .collect();
        assert_eq!(names, vec!["1", "2"]);
    }

    #[test]
    fn test_malformed_xml_is_xml_error() {
        let result = Document::from_string("<root><child></root>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }

    #[test]
    fn test_unclosed_document_is_xml_error() {
        let result = Document::from_string("<root><child/>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(matches!(Document::from_string(""), Err(Error::Xml(_))));
    }

    #[test]
    fn test_undeclared_prefix_fails() {
        let result = Document::from_string("<xs:schema/>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }

    #[test]
    fn test_depth_limit() {
        let xml = "<a><a><a><a/></a></a></a>";
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;
        let result = Document::parse(xml.as_bytes(), &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_depth_limit_counts_empty_elements() {
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;
        assert!(Document::parse(b"<a><b></b></a>", &limits).is_ok());
        let result = Document::parse(b"<a><b><c/></b></a>", &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
