//! Job requirement records and their loading from JSON/TOML

use crate::config::validate_threshold;
use crate::error::{Result, ResumeScreenerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A complete job requirement; every text field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequirement {
    pub job_title: String,
    pub job_description: String,
    pub required_skills: Vec<String>,
    pub preferred_qualifications: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Per-job threshold; `None` defers to the caller's default
    pub ats_threshold: Option<f64>,
}

/// Wire shape: everything optional so absence can be reported by name.
#[derive(Debug, Default, Deserialize)]
struct RawJobRequirement {
    job_title: Option<String>,
    job_description: Option<String>,
    required_skills: Option<Vec<String>>,
    preferred_qualifications: Option<Vec<String>>,
    responsibilities: Option<Vec<String>>,
    ats_threshold: Option<f64>,
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| ResumeScreenerError::MissingJobField(field.to_string()))
}

impl TryFrom<RawJobRequirement> for JobRequirement {
    type Error = ResumeScreenerError;

    fn try_from(raw: RawJobRequirement) -> Result<Self> {
        if let Some(threshold) = raw.ats_threshold {
            validate_threshold(threshold)
                .map_err(|_| ResumeScreenerError::InvalidJobData(format!(
                    "ats_threshold {} is outside 0..=100",
                    threshold
                )))?;
        }

        Ok(Self {
            job_title: require(raw.job_title, "job_title")?,
            job_description: require(raw.job_description, "job_description")?,
            required_skills: require(raw.required_skills, "required_skills")?,
            preferred_qualifications: require(raw.preferred_qualifications, "preferred_qualifications")?,
            responsibilities: require(raw.responsibilities, "responsibilities")?,
            ats_threshold: raw.ats_threshold,
        })
    }
}

impl JobRequirement {
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawJobRequirement = serde_json::from_str(content)
            .map_err(|e| ResumeScreenerError::InvalidJobData(format!("Malformed job JSON: {}", e)))?;
        raw.try_into()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawJobRequirement = toml::from_str(content)
            .map_err(|e| ResumeScreenerError::InvalidJobData(format!("Malformed job TOML: {}", e)))?;
        raw.try_into()
    }

    /// Load from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "json" => Self::from_json(&content),
            Some(ext) if ext == "toml" => Self::from_toml(&content),
            _ => Err(ResumeScreenerError::InvalidInput(format!(
                "Job file must be .json or .toml: {}",
                path.display()
            ))),
        }
    }
}
