//! Multi-factor ATS scoring
//!
//! The resume is compared against five job fields, the weighted sum is lifted
//! by a flat offset and then by a range-dependent band bonus. Both lifts are
//! additive, so a strong match ends up above 100 (an identical resume scores
//! 130). That inflation is long-standing behaviour that downstream thresholds
//! are tuned against; it is kept as is rather than clamped.

use crate::error::{Result, ResumeScreenerError};
use crate::processing::job::JobRequirement;
use crate::processing::similarity::{round2, SimilarityScorer};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Flat bonus added to every weighted base score
pub const SCORE_OFFSET: f64 = 30.0;

/// `(inclusive upper bound, bonus)`, checked in ascending order. The first
/// band is exclusive of 30; anything above 90 gets no bonus.
const BANDS: [(f64, f64); 6] = [
    (40.0, 35.0),
    (50.0, 40.0),
    (70.0, 25.0),
    (80.0, 10.0),
    (90.0, 5.0),
    (f64::INFINITY, 0.0),
];
const BELOW_THIRTY_BONUS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    JobTitle,
    JobDescription,
    RequiredSkills,
    PreferredQualifications,
    Responsibilities,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::JobTitle,
        Factor::JobDescription,
        Factor::RequiredSkills,
        Factor::PreferredQualifications,
        Factor::Responsibilities,
    ];

    /// Percentage weight; the five weights sum to 100.
    pub fn weight(&self) -> f64 {
        match self {
            Factor::JobTitle => 20.0,
            Factor::JobDescription => 30.0,
            Factor::RequiredSkills => 25.0,
            Factor::PreferredQualifications => 10.0,
            Factor::Responsibilities => 15.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::JobTitle => "job_title",
            Factor::JobDescription => "job_description",
            Factor::RequiredSkills => "required_skills",
            Factor::PreferredQualifications => "preferred_qualifications",
            Factor::Responsibilities => "responsibilities",
        }
    }

    /// The job text this factor compares the resume against.
    pub fn job_text(&self, job: &JobRequirement) -> String {
        match self {
            Factor::JobTitle => job.job_title.clone(),
            Factor::JobDescription => job.job_description.clone(),
            Factor::RequiredSkills => job.required_skills.join(" "),
            Factor::PreferredQualifications => job.preferred_qualifications.join(" "),
            Factor::Responsibilities => job.responsibilities.join(" "),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type FactorScores = BTreeMap<Factor, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ATSResult {
    pub factor_scores: FactorScores,
    /// Weighted sum before offset and banding
    pub base_score: f64,
    pub final_score: f64,
}

impl ATSResult {
    pub fn strongest_factor(&self) -> Option<Factor> {
        self.factor_scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(factor, _)| *factor)
    }
}

pub struct ATSScoringEngine {
    scorer: Arc<dyn SimilarityScorer>,
}

impl ATSScoringEngine {
    pub fn new(scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn score(&self, resume_text: &str, job: &JobRequirement) -> Result<ATSResult> {
        let mut factor_scores = FactorScores::new();
        for factor in Factor::ALL {
            let similarity = self
                .scorer
                .similarity(resume_text, &factor.job_text(job))
                .map_err(|e| ResumeScreenerError::Scoring(format!("{} similarity failed: {}", factor, e)))?;
            factor_scores.insert(factor, similarity);
        }

        let base_score = weighted_base(&factor_scores);
        let final_score = round2(apply_banding(base_score + SCORE_OFFSET));
        debug!(
            "ATS base {:.2} -> final {:.2} for '{}'",
            base_score, final_score, job.job_title
        );

        Ok(ATSResult {
            factor_scores,
            base_score: round2(base_score),
            final_score,
        })
    }
}

pub fn weighted_base(factor_scores: &FactorScores) -> f64 {
    factor_scores
        .iter()
        .map(|(factor, score)| score * factor.weight() / 100.0)
        .sum()
}

/// Add the band bonus for an already offset score.
pub fn apply_banding(offset_score: f64) -> f64 {
    if offset_score < 30.0 {
        return offset_score + BELOW_THIRTY_BONUS;
    }
    let bonus = BANDS
        .iter()
        .find(|(upper, _)| offset_score <= *upper)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0);
    offset_score + bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Returns a preset score per job text
    struct TableScorer(HashMap<String, f64>);

    impl SimilarityScorer for TableScorer {
        fn similarity(&self, _resume: &str, job_text: &str) -> Result<f64> {
            Ok(*self.0.get(job_text).unwrap_or(&0.0))
        }
    }

    struct FailingScorer;

    impl SimilarityScorer for FailingScorer {
        fn similarity(&self, _a: &str, _b: &str) -> Result<f64> {
            Err(ResumeScreenerError::Embedding("model unavailable".to_string()))
        }
    }

    fn job() -> JobRequirement {
        JobRequirement {
            job_title: "title".to_string(),
            job_description: "description".to_string(),
            required_skills: vec!["a".to_string(), "b".to_string()],
            preferred_qualifications: vec!["pref".to_string()],
            responsibilities: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            ats_threshold: None,
        }
    }

    #[test]
    fn test_weights_sum_to_one_hundred() {
        let total: f64 = Factor::ALL.iter().map(|f| f.weight()).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_sequence_fields_are_space_joined() {
        let job = job();
        assert_eq!(Factor::RequiredSkills.job_text(&job), "a b");
        assert_eq!(Factor::Responsibilities.job_text(&job), "x y z");
        assert_eq!(Factor::JobTitle.job_text(&job), "title");
    }

    #[test]
    fn test_banding_boundaries() {
        assert_relative_eq!(apply_banding(29.99), 59.99, epsilon = 1e-9);
        assert_eq!(apply_banding(30.0), 65.0);
        assert_eq!(apply_banding(40.0), 75.0);
        assert_eq!(apply_banding(40.5), 80.5);
        assert_eq!(apply_banding(50.0), 90.0);
        assert_eq!(apply_banding(50.5), 75.5);
        assert_eq!(apply_banding(70.0), 95.0);
        assert_eq!(apply_banding(80.0), 90.0);
        assert_eq!(apply_banding(90.0), 95.0);
        assert_eq!(apply_banding(90.01), 90.01);
        assert_eq!(apply_banding(130.0), 130.0);
    }

    #[test]
    fn test_weighted_offset_and_band() {
        let scores: HashMap<String, f64> = [
            ("title", 50.0),
            ("description", 40.0),
            ("a b", 60.0),
            ("pref", 20.0),
            ("x y z", 30.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let engine = ATSScoringEngine::new(Arc::new(TableScorer(scores)));

        let result = engine.score("resume", &job()).unwrap();
        // 10 + 12 + 15 + 2 + 4.5 = 43.5; +30 = 73.5; band (70, 80] +10
        assert_relative_eq!(result.base_score, 43.5);
        assert_relative_eq!(result.final_score, 83.5);
        assert_eq!(result.factor_scores.len(), 5);
        assert_eq!(result.strongest_factor(), Some(Factor::RequiredSkills));
    }

    #[test]
    fn test_perfect_match_exceeds_one_hundred() {
        let scores: HashMap<String, f64> = ["title", "description", "a b", "pref", "x y z"]
            .into_iter()
            .map(|k| (k.to_string(), 100.0))
            .collect();
        let engine = ATSScoringEngine::new(Arc::new(TableScorer(scores)));

        let result = engine.score("resume", &job()).unwrap();
        assert_relative_eq!(result.base_score, 100.0);
        assert_relative_eq!(result.final_score, 130.0);
    }

    #[test]
    fn test_zero_match_still_gets_offset_and_band() {
        let engine = ATSScoringEngine::new(Arc::new(TableScorer(HashMap::new())));
        let result = engine.score("", &job()).unwrap();
        assert_eq!(result.base_score, 0.0);
        assert_eq!(result.final_score, 65.0);
    }

    #[test]
    fn test_scorer_errors_propagate() {
        let engine = ATSScoringEngine::new(Arc::new(FailingScorer));
        let err = engine.score("resume", &job()).unwrap_err();
        assert!(matches!(err, ResumeScreenerError::Scoring(ref msg) if msg.contains("job_title")));
    }
}
