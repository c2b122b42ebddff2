//! Limits and constraints for schema conversion
//!
//! This module defines limits that bound resource usage while parsing and
//! converting a schema. Deeply nested declarations and oversized inputs are
//! reported as [`Error::LimitExceeded`] instead of exhausting the stack.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum nesting depth of the XML document
    pub max_xml_depth: usize,

    /// Maximum XML file size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum nesting depth of element declarations and type substitutions
    pub max_nesting_depth: usize,

    /// Maximum number of named types in one schema
    pub max_types: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
            max_nesting_depth: 256,
            max_types: 100000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
            max_nesting_depth: 32,
            max_types: 10000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_nesting_depth: 2048,
            max_types: 1000000,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a declaration or substitution depth is within limits
    pub fn check_nesting_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_nesting_depth {
            Err(Error::LimitExceeded(format!(
                "schema too deeply nested: depth {} exceeds maximum {}",
                depth, self.max_nesting_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of named types is within limits
    pub fn check_types(&self, count: usize) -> Result<()> {
        if count > self.max_types {
            Err(Error::LimitExceeded(format!(
                "Named type count {} exceeds maximum {}",
                count, self.max_types
            )))
        } else {
            Ok(())
        }
    }
}
