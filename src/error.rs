//! Error types for xsd2json
//!
//! This module defines all error types used throughout the library.
//! Every failure aborts the whole conversion; there is no partial output.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xsd2json Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsd2json operations
#[derive(Error, Debug)]
pub enum Error {
    /// The document is well-formed XML but not a usable XSD schema
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Resource loading error (file not found, unreadable)
    #[error("resource error: {0}")]
    Resource(String),

    /// The document is not well-formed XML
    #[error("invalid document: {0}")]
    Xml(String),

    /// Namespace error (undeclared prefix)
    #[error("namespace error: {0}")]
    Namespace(String),

    /// A named type references itself, directly or transitively
    #[error("cyclic type reference: {0}")]
    CycleDetected(String),

    /// Two element declarations share a name but differ in structure
    #[error("conflicting element definitions: {0}")]
    NameConflict(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check whether this error was caused by the input itself
    /// (missing file or malformed XML) rather than by schema content
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Resource(_) | Error::Xml(_) | Error::Io(_))
    }
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema (element path or declaration name)
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
