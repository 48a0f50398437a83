//! Input manager for loading resumes from disk

use crate::error::{Result, ResumeScreenerError};
use crate::input::document::Document;
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{ExtractedText, ExtractionResult, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

pub struct InputManager {
    extractor: Arc<TextExtractor>,
    cache: HashMap<PathBuf, ExtractedText>,
}

impl InputManager {
    pub fn new(extractor: Arc<TextExtractor>) -> Self {
        Self {
            extractor,
            cache: HashMap::new(),
        }
    }

    /// Read a supported resume file into a [`Document`].
    pub async fn load_document(path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(ResumeScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path);
        if !file_type.is_supported() {
            return Err(ResumeScreenerError::InvalidInput(format!(
                "Unsupported file type for: {} (expected .pdf or .docx)",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        Ok(Document::from_path(path, bytes))
    }

    /// Load every PDF/DOCX directly inside `dir`, sorted by file name.
    /// Other files are skipped.
    pub async fn load_directory(dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(ResumeScreenerError::InvalidInput(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if FileType::from_path(&path).is_supported() {
                paths.push(path);
            } else {
                debug!("Skipping unsupported file: {}", path.display());
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(Self::load_document(&path).await?);
        }

        info!("Found {} resumes in {}", documents.len(), dir.display());
        Ok(documents)
    }

    /// Extract text on the blocking pool; OCR and PDF parsing are CPU heavy.
    pub async fn extract_document(&self, document: Document) -> Result<ExtractionResult> {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| ResumeScreenerError::Processing(format!("Extraction task failed: {}", e)))
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<ExtractedText> {
        if let Some(cached) = self.cache.get(path) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached.clone());
        }

        let document = Self::load_document(path).await?;
        info!("Extracting text from {} ({})", path.display(), document.file_type());
        let extracted = self.extract_document(document).await??;

        self.cache.insert(path.to_path_buf(), extracted.clone());

        Ok(extracted)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
