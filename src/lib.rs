//! # xsd2json
//!
//! Converts an XML Schema (XSD) document into a JSON Schema-like tree, or into
//! a flattened "editor-assist" form suited to autocomplete in XML editors.
//!
//! ## Features
//!
//! - Named complex and simple types, resolved transitively before use
//! - Occurrence constraints (`minOccurs`, `maxOccurs`, `nillable`)
//! - Facets of simple type restrictions, attribute enumerations
//! - Simple type unions (`memberTypes` and inline members)
//! - Cycle detection for self-referencing type definitions
//! - Resource limits against oversized or deeply nested input
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsd2json::convert;
//!
//! // Nested form from a file path
//! let json = convert("path/to/schema.xsd", false)?;
//!
//! // Flattened editor form from XSD text
//! let json = convert(xsd_text.as_str(), true)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod loaders;
pub mod documents;

// Schema model
pub mod schema;

// Output forms
pub mod converters;

// Re-exports for convenience
pub use converters::{convert, ConverterConfig, OutputFormat, Xsd2Json};
pub use error::{Error, Result};
pub use schema::ConflictPolicy;

/// Version of the xsd2json library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
