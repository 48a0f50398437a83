//! Screening report structures

use crate::processing::job::JobRequirement;
use crate::processing::pipeline::ScreeningOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Which outcomes a report lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFilter {
    #[default]
    All,
    Shortlisted,
    NotShortlisted,
}

impl ResultFilter {
    pub fn matches(&self, outcome: &ScreeningOutcome) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Shortlisted => outcome.shortlisted,
            ResultFilter::NotShortlisted => !outcome.shortlisted,
        }
    }
}

impl FromStr for ResultFilter {
    type Err = String;

    fn from_str(filter: &str) -> Result<Self, Self::Err> {
        match filter.to_lowercase().replace('_', "-").as_str() {
            "all" => Ok(ResultFilter::All),
            "shortlisted" => Ok(ResultFilter::Shortlisted),
            "not-shortlisted" => Ok(ResultFilter::NotShortlisted),
            _ => Err(format!(
                "Invalid filter: {}. Supported: all, shortlisted, not-shortlisted",
                filter
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub screened: usize,
    pub shortlisted: usize,
    pub unreadable: usize,
    pub top_score: Option<f64>,
}

impl ReportSummary {
    fn from_outcomes(outcomes: &[ScreeningOutcome]) -> Self {
        Self {
            screened: outcomes.len(),
            shortlisted: outcomes.iter().filter(|o| o.shortlisted).count(),
            unreadable: outcomes.iter().filter(|o| o.extraction.is_failed()).count(),
            top_score: outcomes
                .iter()
                .map(|o| o.ats.final_score)
                .max_by(|a, b| a.total_cmp(b)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub embedding_model: String,
    pub version: String,
}

/// Results of screening one or more resumes against a single job.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub job_title: String,
    pub threshold: f64,
    pub filter: ResultFilter,
    /// Counts over every screened resume, before filtering
    pub summary: ReportSummary,
    pub results: Vec<ScreeningOutcome>,
    pub metadata: ReportMetadata,
}

impl ScreeningReport {
    pub fn new(
        job: &JobRequirement,
        threshold: f64,
        outcomes: Vec<ScreeningOutcome>,
        embedding_model: &str,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            job_title: job.job_title.clone(),
            threshold,
            filter: ResultFilter::All,
            summary: ReportSummary::from_outcomes(&outcomes),
            results: outcomes,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                processing_time_ms,
                embedding_model: embedding_model.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Keep only the outcomes the filter selects; the summary is unchanged.
    pub fn filtered(mut self, filter: ResultFilter) -> Self {
        self.results.retain(|outcome| filter.matches(outcome));
        self.filter = filter;
        self
    }
}
