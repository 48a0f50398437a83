//! Raw resume documents as handed to the extractor

use crate::input::file_detector::FileType;
use std::path::Path;

/// Immutable document input: bytes plus the declared extension.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    extension: String,
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, extension: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            bytes,
        }
    }

    /// Build a document from a path and its already-read contents.
    pub fn from_path(path: &Path, bytes: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(name, extension, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_extension(&self.extension)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
