//! Contact extraction, similarity and ATS scoring

pub mod ats_scorer;
pub mod contact;
pub mod embeddings;
pub mod job;
pub mod pipeline;
pub mod shortlist;
pub mod similarity;
