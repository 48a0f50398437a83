//! End-to-end screening of resumes against a job requirement

use crate::error::{ExtractionFailure, Result, ResumeScreenerError};
use crate::input::document::Document;
use crate::input::text_extractor::{ExtractionResult, TextExtractor, TextSource};
use crate::processing::ats_scorer::{ATSResult, ATSScoringEngine};
use crate::processing::contact::{ContactExtractor, ContactInfo};
use crate::processing::job::JobRequirement;
use crate::processing::shortlist::is_shortlisted;
use crate::processing::similarity::SimilarityScorer;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// How the resume text was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Extracted { source: TextSource, characters: usize },
    Failed { reason: String },
}

impl ExtractionStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionStatus::Failed { .. })
    }
}

impl From<&ExtractionFailure> for ExtractionStatus {
    fn from(failure: &ExtractionFailure) -> Self {
        ExtractionStatus::Failed {
            reason: failure.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutcome {
    pub name: String,
    pub extraction: ExtractionStatus,
    pub contact: ContactInfo,
    pub ats: ATSResult,
    pub threshold: f64,
    pub shortlisted: bool,
}

pub struct ResumeScreener {
    extractor: Arc<TextExtractor>,
    contacts: Arc<dyn ContactExtractor>,
    engine: ATSScoringEngine,
}

impl ResumeScreener {
    pub fn new(
        extractor: Arc<TextExtractor>,
        contacts: Arc<dyn ContactExtractor>,
        scorer: Arc<dyn SimilarityScorer>,
    ) -> Self {
        Self {
            extractor,
            contacts,
            engine: ATSScoringEngine::new(scorer),
        }
    }

    /// Extract, read contacts, score and decide for one document. Blocking.
    ///
    /// An unreadable document is scored as empty text and the failure is
    /// kept on the outcome; scoring errors are returned.
    pub fn screen(
        &self,
        document: &Document,
        job: &JobRequirement,
        threshold: f64,
    ) -> Result<ScreeningOutcome> {
        let extraction = self.extractor.extract(document);
        self.screen_extracted(document.name(), extraction, job, threshold)
    }

    /// Screen text that has already been extracted.
    pub fn screen_extracted(
        &self,
        name: &str,
        extraction: ExtractionResult,
        job: &JobRequirement,
        threshold: f64,
    ) -> Result<ScreeningOutcome> {
        let (text, status) = match &extraction {
            Ok(extracted) => (
                extracted.text.as_str(),
                ExtractionStatus::Extracted {
                    source: extracted.source,
                    characters: extracted.text.chars().count(),
                },
            ),
            Err(failure) => {
                warn!("Scoring {} without text: {}", name, failure);
                ("", ExtractionStatus::from(failure))
            }
        };

        let contact = self.contacts.extract_contact(text);
        let ats = self.engine.score(text, job)?;
        let shortlisted = is_shortlisted(ats.final_score, threshold);

        debug!(
            "{}: final {:.2} vs threshold {:.2} -> {}",
            name,
            ats.final_score,
            threshold,
            if shortlisted { "shortlisted" } else { "not shortlisted" }
        );

        Ok(ScreeningOutcome {
            name: name.to_string(),
            extraction: status,
            contact,
            ats,
            threshold,
            shortlisted,
        })
    }

    /// Screen many documents on the blocking pool, at most `max_workers` at
    /// a time, and return them ranked by final score. `on_done` sees each
    /// outcome as it completes.
    pub async fn screen_batch<F>(
        self: Arc<Self>,
        documents: Vec<Document>,
        job: Arc<JobRequirement>,
        threshold: f64,
        max_workers: usize,
        mut on_done: F,
    ) -> Result<Vec<ScreeningOutcome>>
    where
        F: FnMut(&ScreeningOutcome),
    {
        let total = documents.len();
        info!("Screening {} resumes with {} workers", total, max_workers.max(1));

        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for document in documents {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ResumeScreenerError::Processing(format!("Worker pool closed: {}", e)))?;
            let screener = self.clone();
            let job = job.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                screener.screen(&document, &job, threshold)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| ResumeScreenerError::Processing(format!("Screening task failed: {}", e)))??;
            on_done(&outcome);
            outcomes.push(outcome);
        }

        rank_outcomes(&mut outcomes);
        Ok(outcomes)
    }
}

/// Highest final score first; ties broken by name for stable output.
pub fn rank_outcomes(outcomes: &mut [ScreeningOutcome]) {
    outcomes.sort_by(|a, b| {
        b.ats
            .final_score
            .total_cmp(&a.ats.final_score)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::text_extractor::ExtractionStrategy;
    use crate::processing::contact::RegexContactExtractor;
    use crate::processing::ats_scorer::Factor;

    /// Treats the document bytes as UTF-8 text
    struct PlainText;

    impl ExtractionStrategy for PlainText {
        fn name(&self) -> &'static str {
            "plain text"
        }

        fn source(&self) -> TextSource {
            TextSource::TextLayer
        }

        fn extract(&self, bytes: &[u8]) -> Result<String> {
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }

    /// 100 when the resume mentions the job text, otherwise 0
    struct MentionScorer;

    impl SimilarityScorer for MentionScorer {
        fn similarity(&self, resume: &str, job_text: &str) -> Result<f64> {
            let found = !job_text.is_empty() && resume.to_lowercase().contains(&job_text.to_lowercase());
            Ok(if found { 100.0 } else { 0.0 })
        }
    }

    fn screener() -> ResumeScreener {
        let extractor = TextExtractor::with_strategies(vec![Box::new(PlainText)], vec![Box::new(PlainText)]);
        ResumeScreener::new(
            Arc::new(extractor),
            Arc::new(RegexContactExtractor::new()),
            Arc::new(MentionScorer),
        )
    }

    fn job() -> JobRequirement {
        JobRequirement {
            job_title: "Backend Engineer".to_string(),
            job_description: "Build reliable services".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_qualifications: vec!["Kubernetes".to_string()],
            responsibilities: vec!["On-call".to_string()],
            ats_threshold: None,
        }
    }

    fn pdf(name: &str, text: &str) -> Document {
        Document::new(name, "pdf", text.as_bytes().to_vec())
    }

    #[test]
    fn test_screen_reads_contact_and_scores() {
        let outcome = screener()
            .screen(
                &pdf("jane.pdf", "Jane Doe jane@example.com +1 555 123 4567\nBackend Engineer, Rust"),
                &job(),
                60.0,
            )
            .unwrap();

        assert_eq!(outcome.name, "jane.pdf");
        assert_eq!(outcome.contact.email.as_deref(), Some("jane@example.com"));
        assert!(outcome.contact.phone.is_some());
        assert_eq!(outcome.ats.factor_scores[&Factor::JobTitle], 100.0);
        assert_eq!(outcome.ats.factor_scores[&Factor::RequiredSkills], 100.0);
        // 20 + 25 = 45; +30 = 75; +10
        assert_eq!(outcome.ats.final_score, 85.0);
        assert!(outcome.shortlisted);
        assert!(matches!(
            outcome.extraction,
            ExtractionStatus::Extracted { source: TextSource::TextLayer, .. }
        ));
    }

    #[test]
    fn test_threshold_is_caller_supplied() {
        let outcome = screener()
            .screen(&pdf("jane.pdf", "Backend Engineer, Rust"), &job(), 90.0)
            .unwrap();
        assert_eq!(outcome.threshold, 90.0);
        assert!(!outcome.shortlisted);
    }

    #[test]
    fn test_unreadable_document_scores_as_empty_text() {
        let outcome = screener()
            .screen(&Document::new("resume.odt", "odt", b"Backend Engineer".to_vec()), &job(), 60.0)
            .unwrap();

        assert!(outcome.extraction.is_failed());
        assert_eq!(outcome.contact, ContactInfo::default());
        // the failure message itself is never scored
        assert!(outcome.ats.factor_scores.values().all(|score| *score == 0.0));
        assert_eq!(outcome.ats.final_score, 65.0);
    }

    #[test]
    fn test_empty_document_is_recorded() {
        let outcome = screener().screen(&pdf("blank.pdf", ""), &job(), 60.0).unwrap();
        assert_eq!(
            outcome.extraction,
            ExtractionStatus::Failed {
                reason: "no extractable text found in PDF document".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_batch_is_ranked_by_score() {
        let documents = vec![
            pdf("weak.pdf", "Gardener"),
            pdf("strong.pdf", "Backend Engineer. Build reliable services in Rust. Kubernetes. On-call"),
            pdf("middle.pdf", "Rust developer"),
        ];

        let mut seen = 0;
        let outcomes = Arc::new(screener())
            .screen_batch(documents, Arc::new(job()), 60.0, 2, |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(seen, 3);

        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["strong.pdf", "middle.pdf", "weak.pdf"]);
        assert_eq!(outcomes[0].ats.final_score, 130.0);
        assert_eq!(outcomes[1].ats.final_score, 80.0);
        assert_eq!(outcomes[2].ats.final_score, 65.0);
    }

    #[tokio::test]
    async fn test_batch_of_nothing() {
        let outcomes = Arc::new(screener())
            .screen_batch(Vec::new(), Arc::new(job()), 60.0, 4, |_| {})
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
