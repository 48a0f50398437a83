//! Input processing module
//! Handles file detection, document loading and layered text extraction

pub mod document;
pub mod file_detector;
pub mod manager;
pub mod ocr;
pub mod text_extractor;
