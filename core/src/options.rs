//! Consolidation options.
//!
//! Options are plain serde data so they can live in a YAML file next to the
//! document they apply to. Every field has a default, so a partial file (or
//! an empty one) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! ignore_keys:
//!   - description
//! items_title_suffix: .Items
//! scan_path:
//!   - paths
//! table_path:
//!   - components
//!   - schemas
//! max_depth: 512
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::escape_pointer_segment;

/// Default nesting limit for the walker.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings for one consolidation run.
///
/// # Examples
///
/// ```
/// use schema_consolidate_core::ConsolidateOptions;
///
/// let options = ConsolidateOptions::default();
/// assert_eq!(options.ignore_keys, vec!["description"]);
/// assert_eq!(options.reference_prefix(), "#/components/schemas/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateOptions {
    /// Schema fields skipped when comparing two bodies for equality.
    pub ignore_keys: Vec<String>,
    /// Suffix appended to an array title to name its untitled `items`.
    pub items_title_suffix: String,
    /// Key path of the region scanned for inline schemas.
    pub scan_path: Vec<String>,
    /// Key path of the shared schema table.
    pub table_path: Vec<String>,
    /// Maximum nesting depth below the scan root.
    pub max_depth: usize,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            ignore_keys: vec!["description".to_string()],
            items_title_suffix: ".Items".to_string(),
            scan_path: vec!["paths".to_string()],
            table_path: vec!["components".to_string(), "schemas".to_string()],
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConsolidateOptions {
    /// Loads options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ConsolidateError::Io) if the file cannot be
    /// read, or [`Yaml`](crate::ConsolidateError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let options = serde_yaml::from_reader(reader)?;
        Ok(options)
    }

    /// Saves the options as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ConsolidateError::Io) if the file cannot be
    /// written, or [`Yaml`](crate::ConsolidateError::Yaml) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Replaces the ignore list.
    pub fn with_ignore_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the pointer prefix every generated reference starts with.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_consolidate_core::ConsolidateOptions;
    ///
    /// let mut options = ConsolidateOptions::default();
    /// options.table_path = vec!["definitions".into()];
    /// assert_eq!(options.reference_prefix(), "#/definitions/");
    /// ```
    pub fn reference_prefix(&self) -> String {
        let mut prefix = String::from("#/");
        for segment in &self.table_path {
            prefix.push_str(&escape_pointer_segment(segment));
            prefix.push('/');
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_yaml_uses_defaults() {
        let options: ConsolidateOptions = serde_yaml::from_str("max_depth: 32\n").unwrap();
        assert_eq!(options.max_depth, 32);
        assert_eq!(options.ignore_keys, vec!["description"]);
        assert_eq!(options.items_title_suffix, ".Items");
        assert_eq!(options.table_path, vec!["components", "schemas"]);
    }

    #[test]
    fn test_deserialize_complete_yaml() {
        let yaml = r#"
ignore_keys: [description, example]
items_title_suffix: "Item"
scan_path: [webhooks]
table_path: [definitions]
max_depth: 64
"#;
        let options: ConsolidateOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.ignore_keys, vec!["description", "example"]);
        assert_eq!(options.items_title_suffix, "Item");
        assert_eq!(options.scan_path, vec!["webhooks"]);
        assert_eq!(options.reference_prefix(), "#/definitions/");
        assert_eq!(options.max_depth, 64);
    }

    #[test]
    fn test_reference_prefix_escapes_segments() {
        let mut options = ConsolidateOptions::default();
        options.table_path = vec!["x-types/v1".into(), "all".into()];
        assert_eq!(options.reference_prefix(), "#/x-types~1v1/all/");
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consolidate.yml");

        let original = ConsolidateOptions::default().with_ignore_keys(["description", "summary"]);
        original.save(&path).unwrap();

        let loaded = ConsolidateOptions::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConsolidateOptions::load(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, crate::ConsolidateError::Io(_)));
    }
}
