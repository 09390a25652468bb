//! Persistence provider trait and implementations
//!
//! Providers turn trees and records into structured-text documents on disk.
//! JSON is the default; YAML is available behind the `yaml` feature.

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Trait for pluggable load/save of structured documents
pub trait PersistenceProvider: Clone + Send + Sync {
    /// File extension for this format (e.g., "json", "yaml")
    fn extension(&self) -> &str;

    /// Serialize data to a document string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from a document string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Check whether a document exists at the path
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Read and deserialize a document from a file
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.deserialize(&content)
    }

    /// Serialize and write a document to a file.
    ///
    /// Uses atomic write: temp file then rename, so a crash mid-write never
    /// leaves a truncated document behind.
    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// =============================================================================
// JSON Provider
// =============================================================================

/// JSON persistence provider (default)
#[derive(Clone)]
pub struct JsonProvider {
    /// Pretty print JSON output
    pretty: bool,
}

impl Default for JsonProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonProvider {
    /// Create a JSON provider with pretty printing enabled
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON provider (no pretty printing)
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl PersistenceProvider for JsonProvider {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// YAML Provider (yaml feature)
// =============================================================================

/// YAML persistence provider
#[cfg(feature = "yaml")]
#[derive(Clone, Default)]
pub struct YamlProvider;

#[cfg(feature = "yaml")]
impl YamlProvider {
    /// Create a YAML provider
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "yaml")]
impl PersistenceProvider for YamlProvider {
    fn extension(&self) -> &str {
        "yaml"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        serde_yaml::to_string(data).map_err(|e| Error::Parse(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_yaml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
