//! Format-agnostic document loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Format-agnostic document store.
///
/// Detects the format from the file extension and handles
/// serialization transparently. Catalog tables are YAML in practice,
/// but TOML and JSON documents load the same way.
#[derive(Debug, Default)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    ///
    /// Format is detected from file extension:
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        let extension = path.extension().unwrap_or("");

        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Save a document to a file.
    ///
    /// Format is determined from the file extension. Uses atomic write.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let extension = path.extension().unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::to_string(value).map_err(|e| Error::DocumentSerialize {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            })?,
            "toml" => toml::to_string_pretty(value).map_err(|e| Error::DocumentSerialize {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            })?,
            "json" => serde_json::to_string_pretty(value).map_err(|e| Error::DocumentSerialize {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            })?,
            _ => {
                return Err(Error::UnsupportedFormat {
                    extension: extension.to_string(),
                });
            }
        };

        io::write_atomic(path, content.as_bytes())
    }
}
