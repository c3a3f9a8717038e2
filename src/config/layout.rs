use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Naming conventions used to classify files while bundling and to interpret
/// paths when reading a store back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// File whose presence marks a directory as a package.
    pub init_file: String,
    /// Suffix of importable source files, including the leading dot.
    pub source_suffix: String,
    /// Name of the metadata file inside a distribution's info directory.
    pub metadata_file: String,
    pub dist_info_suffix: String,
    /// Compiled shared-library artifacts that are never bundled.
    pub skipped_suffixes: Vec<String>,
    pub cache_dir: String,
    /// Top-level entries that are never bundled.
    pub skipped_root_entries: Vec<String>,
}

impl Layout {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// The form stored in a bundle's metadata table.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.init_file.is_empty() || self.init_file.contains('/') {
            return Err(Error::Config(
                "init_file must be a plain file name".to_string(),
            ));
        }
        if !self.source_suffix.starts_with('.') || self.source_suffix.len() < 2 {
            return Err(Error::Config(
                "source_suffix must start with a period".to_string(),
            ));
        }
        if self.metadata_file.is_empty() || self.metadata_file.contains('/') {
            return Err(Error::Config(
                "metadata_file must be a plain file name".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_source_file(&self, name: &str) -> bool {
        name.len() > self.source_suffix.len() && name.ends_with(&self.source_suffix)
    }

    pub fn is_skipped_suffix(&self, name: &str) -> bool {
        self.skipped_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            init_file: "__init__.py".to_string(),
            source_suffix: ".py".to_string(),
            metadata_file: "METADATA".to_string(),
            dist_info_suffix: ".dist-info".to_string(),
            skipped_suffixes: vec![".so".to_string(), ".pyd".to_string()],
            cache_dir: "__pycache__".to_string(),
            skipped_root_entries: vec!["bin".to_string()],
        }
    }
}
