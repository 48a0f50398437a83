//! Error handling for the resume screener

use crate::input::file_detector::FileType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read document: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Missing required job field: {0}")]
    MissingJobField(String),

    #[error("Invalid job data: {0}")]
    InvalidJobData(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Why a document produced no usable text.
///
/// Returned in place of text so that a failure message can never be scored
/// as if it were resume content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionFailure {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("no extractable text found in {0} document")]
    NoExtractableText(FileType),

    #[error("{format} document is unreadable: {reason}")]
    Unreadable { format: FileType, reason: String },
}

/// Coarse grouping used when surfacing errors to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UnreadableDocument,
    InvalidJobData,
    InternalScoring,
    Usage,
}

impl ErrorCategory {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCategory::UnreadableDocument => "could not read document",
            ErrorCategory::InvalidJobData => "invalid job data",
            ErrorCategory::InternalScoring => "internal scoring error",
            ErrorCategory::Usage => "invalid usage or configuration",
        }
    }
}

impl ResumeScreenerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResumeScreenerError::Io(_)
            | ResumeScreenerError::Extraction(_)
            | ResumeScreenerError::PdfExtraction(_)
            | ResumeScreenerError::DocxExtraction(_)
            | ResumeScreenerError::Ocr(_) => ErrorCategory::UnreadableDocument,
            ResumeScreenerError::MissingJobField(_) | ResumeScreenerError::InvalidJobData(_) => {
                ErrorCategory::InvalidJobData
            }
            ResumeScreenerError::Embedding(_)
            | ResumeScreenerError::ModelLoading(_)
            | ResumeScreenerError::Scoring(_)
            | ResumeScreenerError::Processing(_) => ErrorCategory::InternalScoring,
            ResumeScreenerError::Configuration(_)
            | ResumeScreenerError::Serialization(_)
            | ResumeScreenerError::InvalidInput(_) => ErrorCategory::Usage,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResumeScreenerError>;

/// Model2Vec reports load failures through anyhow
impl From<anyhow::Error> for ResumeScreenerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeScreenerError::ModelLoading(err.to_string())
    }
}
