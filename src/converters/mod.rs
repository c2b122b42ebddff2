//! XSD to JSON converters
//!
//! This module drives the whole conversion (load, parse, registry, resolution,
//! element tree) and shapes the result into one of two output forms:
//!
//! - Nested: the containment tree as nested `children` objects
//! - Editor: a flattened, name-indexed form for autocomplete-style consumers
//!
//! Both forms end with a `schema` identifier and `"type": "object"`.

mod editor;
mod nested;

pub use editor::{EditorShaper, FlatEntry, FlatSchema, NameSet, TOP_KEY};
pub use nested::NestedShaper;

use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::locations::Location;
use crate::schema::{ConflictPolicy, ElementTree, ElementTreeBuilder, TypeRegistry};
use crate::XSD_NAMESPACE;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value as JsonValue};

/// Schema identifier written as the trailing `schema` key
pub const SCHEMA_ID: &str = "http://json-schema.org/schema#";

/// Trait for turning an element tree into an output JSON object
pub trait OutputShaper {
    /// Shape the tree, including the trailing `schema` and `type` keys
    fn shape(&self, tree: &ElementTree) -> Map<String, JsonValue>;

    /// Returns true if the shape drops information present in the tree
    fn is_lossy(&self) -> bool;
}

/// Output form selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Nested containment form
    #[default]
    Nested,
    /// Flattened editor-assist form
    Editor,
}

impl OutputFormat {
    /// Map the `flatten` switch to a format
    pub fn from_flatten(flatten: bool) -> Self {
        if flatten {
            OutputFormat::Editor
        } else {
            OutputFormat::Nested
        }
    }
}

/// Create a shaper by format
pub fn create_shaper(format: OutputFormat) -> Box<dyn OutputShaper> {
    match format {
        OutputFormat::Nested => Box::new(NestedShaper::new()),
        OutputFormat::Editor => Box::new(EditorShaper::new()),
    }
}

/// Configuration of a conversion
#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    /// Output form
    pub format: OutputFormat,
    /// Handling of element names declared more than once
    pub conflict_policy: ConflictPolicy,
    /// Resource limits
    pub limits: Limits,
}

impl ConverterConfig {
    /// Create a configuration with defaults (nested form, first-wins)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Select the flattened editor form
    pub fn with_flatten(self, flatten: bool) -> Self {
        self.with_format(OutputFormat::from_flatten(flatten))
    }

    /// Set the conflict policy
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// XSD to JSON converter
#[derive(Debug, Clone, Default)]
pub struct Xsd2Json {
    config: ConverterConfig,
}

impl Xsd2Json {
    /// Create a converter with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Load and parse a schema document, checking that its root is `xs:schema`
    pub fn load_schema(&self, source: &Location) -> Result<Document> {
        let text = Loader::new()
            .with_limits(self.config.limits.clone())
            .load(source)?;
        let doc = Document::parse(text.as_bytes(), &self.config.limits)?;

        let root = schema_root(&doc)?;
        if !root.qname.matches(XSD_NAMESPACE, crate::schema::xsd_elements::SCHEMA) {
            return Err(ParseError::new(format!(
                "root element {} is not an XML Schema",
                root.qname
            ))
            .with_location(source.describe())
            .into());
        }
        Ok(doc)
    }

    /// Build the resolved element tree of a schema
    pub fn build_tree(&self, source: impl Into<Location>) -> Result<ElementTree> {
        let source = source.into();
        let doc = self.load_schema(&source)?;
        let schema = schema_root(&doc)?;

        let builder = ElementTreeBuilder::new()
            .with_policy(self.config.conflict_policy)
            .with_limits(self.config.limits.clone());
        let raw = TypeRegistry::build(schema, &builder)?;
        let registry = raw.resolve(builder.limits())?;
        let tree = builder.build(schema, &registry)?;

        tracing::debug!(
            source = %source.describe(),
            types = registry.len(),
            roots = tree.len(),
            "element tree built"
        );
        Ok(tree)
    }

    /// Convert a schema to a JSON value
    pub fn convert_value(&self, source: impl Into<Location>) -> Result<JsonValue> {
        let tree = self.build_tree(source)?;
        let shaper = create_shaper(self.config.format);
        Ok(JsonValue::Object(shaper.shape(&tree)))
    }

    /// Convert a schema to JSON text
    pub fn convert(&self, source: impl Into<Location>) -> Result<String> {
        to_json_text(&self.convert_value(source)?)
    }
}

fn schema_root(doc: &Document) -> Result<&Element> {
    doc.root()
        .ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

/// Serialize with 4-space indentation, keys in insertion order
pub fn to_json_text(value: &JsonValue) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Convert an XSD file path or XSD text to JSON text.
///
/// `flatten = false` gives the nested form, `flatten = true` the editor form.
pub fn convert(source: impl Into<Location>, flatten: bool) -> Result<String> {
    Xsd2Json::with_config(ConverterConfig::new().with_flatten(flatten)).convert(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="Root">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="Name" type="xs:string"/>
                <xs:element name="Age" type="xs:integer" minOccurs="0"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

    #[test]
    fn test_output_format_from_flatten() {
        assert_eq!(OutputFormat::from_flatten(true), OutputFormat::Editor);
        assert_eq!(OutputFormat::from_flatten(false), OutputFormat::Nested);
        assert_eq!(OutputFormat::default(), OutputFormat::Nested);
    }

    #[test]
    fn test_create_shaper() {
        assert!(!create_shaper(OutputFormat::Nested).is_lossy());
        assert!(create_shaper(OutputFormat::Editor).is_lossy());
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::new()
            .with_flatten(true)
            .with_conflict_policy(ConflictPolicy::Merge)
            .with_limits(Limits::strict());
        assert_eq!(config.format, OutputFormat::Editor);
        assert_eq!(config.conflict_policy, ConflictPolicy::Merge);
        assert_eq!(config.limits.max_nesting_depth, Limits::strict().max_nesting_depth);
    }

    #[test]
    fn test_four_space_indent() {
        let text = to_json_text(&serde_json::json!({"a": {"b": 1}})).unwrap();
        assert_eq!(text, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
    }

    #[test]
    fn test_convert_nested() {
        let text = convert(PERSON_XSD, false).unwrap();
        let value: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(value["children"]["Name"]["min_occurs"], 1);
        assert_eq!(value["children"]["Age"]["min_occurs"], 0);
        assert_eq!(value["type"], "object");
        assert_eq!(value["schema"], SCHEMA_ID);
    }

    #[test]
    fn test_non_schema_root_is_parse_error() {
        let err = convert("<root/>", false).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
