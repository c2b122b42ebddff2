//! Schema source locations
//!
//! A schema can be given either as a filesystem path or as the XSD text
//! itself. [`Location::detect`] decides between the two for plain strings.

use std::path::{Path, PathBuf};

/// Schema source - a file path or in-memory XSD text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// Inline XSD content
    String(String),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    ///
    /// Text whose first non-blank character is `<` is taken as XML content,
    /// anything else as a path.
    pub fn detect(s: &str) -> Self {
        let trimmed = s.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        if trimmed.starts_with('<') {
            Location::String(s.to_string())
        } else {
            Location::Path(PathBuf::from(s))
        }
    }

    /// Get the location as a short string for messages
    pub fn describe(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::String(_) => "<inline schema>".to_string(),
        }
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        Location::detect(s)
    }
}

impl From<String> for Location {
    fn from(s: String) -> Self {
        Location::detect(&s)
    }
}

impl From<&String> for Location {
    fn from(s: &String) -> Self {
        Location::detect(s)
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::Path(path.to_path_buf())
    }
}
