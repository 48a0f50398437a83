//! Resume screener library
//!
//! Extracts text from PDF/DOCX resumes (OCR as a last resort), reads contact
//! details and scores resumes against a job requirement with weighted
//! embedding similarity.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{ExtractionFailure, Result, ResumeScreenerError};
pub use input::text_extractor::{ExtractedText, TextExtractor};
pub use processing::ats_scorer::{ATSResult, ATSScoringEngine, Factor};
pub use processing::contact::{ContactExtractor, ContactInfo, RegexContactExtractor};
pub use processing::job::JobRequirement;
pub use processing::pipeline::{ResumeScreener, ScreeningOutcome};
pub use processing::shortlist::is_shortlisted;
