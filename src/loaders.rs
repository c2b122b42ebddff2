//! Resource loading utilities
//!
//! This module reads schema sources into text, enforcing size limits and
//! keeping "file not found" apart from other I/O failures.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::fs;
use std::io::ErrorKind;

/// Resource loader for schema sources
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| match e.kind() {
                    ErrorKind::NotFound => {
                        Error::Resource(format!("file '{}' not found", path.display()))
                    }
                    _ => Error::Resource(format!(
                        "Failed to read file '{}': {}",
                        path.display(),
                        e
                    )),
                })?;

                self.limits.check_xml_size(content.len())?;
                tracing::debug!(path = %path.display(), bytes = content.len(), "loaded schema file");

                Ok(content)
            }
            Location::String(s) => {
                self.limits.check_xml_size(s.len())?;
                Ok(s.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<xs:schema/>").unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new();
        let content = loader.load(&location).unwrap();

        assert!(content.contains("<xs:schema/>"));
    }

    #[test]
    fn test_load_from_string() {
        let location = Location::String("<xs:schema/>".to_string());
        let loader = Loader::new();
        let content = loader.load(&location).unwrap();

        assert_eq!(content, "<xs:schema/>");
    }

    #[test]
    fn test_missing_file() {
        let location = Location::detect("/definitely/not/here.xsd");
        let err = Loader::new().load(&location).unwrap_err();
        assert!(matches!(err, Error::Resource(ref m) if m.contains("not found")));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new().with_limits(Limits::strict());
        let result = loader.load(&location);

        // Strict limits (10 MB max) should reject 11MB file
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
