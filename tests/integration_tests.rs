//! Integration tests for the resume screener

use approx::assert_relative_eq;
use docx_rs::{Docx, Paragraph, Run};
use resume_screener::error::ResumeScreenerError;
use resume_screener::input::manager::InputManager;
use resume_screener::input::text_extractor::{TextExtractor, TextSource};
use resume_screener::processing::ats_scorer::{ATSScoringEngine, Factor};
use resume_screener::processing::contact::RegexContactExtractor;
use resume_screener::processing::embeddings::Embedder;
use resume_screener::processing::job::JobRequirement;
use resume_screener::processing::pipeline::{ExtractionStatus, ResumeScreener};
use resume_screener::processing::similarity::EmbeddingSimilarity;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const VOCABULARY: [&str; 11] = [
    "senior",
    "backend",
    "engineer",
    "python",
    "distributed",
    "systems",
    "graphic",
    "designer",
    "adobe",
    "illustrator",
    "typography",
];

/// Counts vocabulary words; one dimension per word so nothing collides
struct BagOfWords;

impl Embedder for BagOfWords {
    fn embed(&self, texts: &[String]) -> resume_screener::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; VOCABULARY.len()];
                for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
                    if let Some(i) = VOCABULARY.iter().position(|word| *word == token) {
                        vector[i] += 1.0;
                    }
                }
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

fn backend_job() -> JobRequirement {
    JobRequirement::from_json(
        r#"{
            "job_title": "Backend Engineer",
            "job_description": "",
            "required_skills": ["Python", "distributed systems"],
            "preferred_qualifications": [],
            "responsibilities": []
        }"#,
    )
    .unwrap()
}

fn designer_job() -> JobRequirement {
    JobRequirement {
        job_title: "Graphic Designer".to_string(),
        required_skills: vec!["Adobe Illustrator".to_string(), "typography".to_string()],
        ..backend_job()
    }
}

fn engine() -> ATSScoringEngine {
    ATSScoringEngine::new(Arc::new(EmbeddingSimilarity::new(Arc::new(BagOfWords))))
}

fn write_docx(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, cursor.into_inner()).unwrap();
    path
}

/// Flip a byte inside `word/document.xml` so its checksum no longer matches
fn break_document_checksum(path: &Path) {
    let mut bytes = std::fs::read(path).unwrap();
    let name = b"word/document.xml";
    let header = (0..bytes.len() - 30)
        .find(|&i| bytes[i..i + 4] == [0x50, 0x4b, 0x03, 0x04] && bytes[i + 30..].starts_with(name))
        .unwrap();
    let size = u32::from_le_bytes(bytes[header + 18..header + 22].try_into().unwrap()) as usize;
    let extra = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    let data = header + 30 + name.len() + extra;
    bytes[data + size / 2] ^= 0xff;
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_backend_resume_scenario() {
    let resume = "Senior backend engineer, Python, distributed systems";

    let backend = engine().score(resume, &backend_job()).unwrap();
    let designer = engine().score(resume, &designer_job()).unwrap();

    assert_eq!(backend.strongest_factor(), Some(Factor::RequiredSkills));
    assert_relative_eq!(backend.factor_scores[&Factor::JobTitle], 57.74, epsilon = 1e-9);
    assert_relative_eq!(backend.factor_scores[&Factor::RequiredSkills], 70.71, epsilon = 1e-9);
    // 29.23 base, +30, then the (50, 70] band adds 25
    assert_relative_eq!(backend.final_score, 84.23, epsilon = 1e-9);

    assert!(designer.factor_scores.values().all(|score| *score == 0.0));
    assert_relative_eq!(designer.final_score, 65.0);
    assert!(backend.final_score > designer.final_score);
}

#[test]
fn test_identical_resume_scores_one_hundred_thirty() {
    let job = JobRequirement {
        job_title: "Backend Engineer".to_string(),
        job_description: "Backend Engineer".to_string(),
        required_skills: vec!["Backend".to_string(), "Engineer".to_string()],
        preferred_qualifications: vec!["Backend Engineer".to_string()],
        responsibilities: vec!["Backend Engineer".to_string()],
        ats_threshold: None,
    };

    let result = engine().score("Backend Engineer", &job).unwrap();
    assert_relative_eq!(result.base_score, 100.0, epsilon = 1e-6);
    assert_relative_eq!(result.final_score, 130.0, epsilon = 1e-6);
}

#[test]
fn test_scoring_is_deterministic() {
    let resume = "Senior backend engineer, Python, distributed systems";
    let first = engine().score(resume, &backend_job()).unwrap();
    let second = engine().score(resume, &backend_job()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_docx_extraction_and_caching() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_docx(
        temp_dir.path(),
        "jane.docx",
        &["Jane Doe", "jane@example.com", "Senior backend engineer"],
    );

    let mut manager = InputManager::new(Arc::new(TextExtractor::new(None)));
    let first = manager.extract_text(&path).await.unwrap();
    assert!(first.text.contains("Jane Doe"));
    assert!(first.text.contains("Senior backend engineer"));
    assert_eq!(first.source, TextSource::TextLayer);
    assert_eq!(manager.cache_size(), 1);

    let second = manager.extract_text(&path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.txt");
    std::fs::write(&path, "Jane Doe").unwrap();

    let mut manager = InputManager::new(Arc::new(TextExtractor::new(None)));
    let result = manager.extract_text(&path).await;
    assert!(matches!(result, Err(ResumeScreenerError::InvalidInput(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new(Arc::new(TextExtractor::new(None)));
    let result = manager.extract_text(Path::new("does/not/exist.pdf")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_corrupt_docx_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let mut manager = InputManager::new(Arc::new(TextExtractor::new(None)));
    let err = manager.extract_text(&path).await.unwrap_err();
    assert!(matches!(err, ResumeScreenerError::Extraction(_)));
    assert_eq!(err.category().message(), "could not read document");
}

#[tokio::test]
async fn test_load_directory_skips_other_files() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(temp_dir.path(), "b.docx", &["Bob"]);
    write_docx(temp_dir.path(), "a.DOCX", &["Alice"]);
    std::fs::write(temp_dir.path().join("notes.txt"), "ignore me").unwrap();
    std::fs::create_dir(temp_dir.path().join("archive.pdf")).unwrap();

    let documents = InputManager::load_directory(temp_dir.path()).await.unwrap();
    let names: Vec<&str> = documents.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["a.DOCX", "b.docx"]);
}

#[tokio::test]
async fn test_screen_directory_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(
        temp_dir.path(),
        "backend.docx",
        &[
            "Jane Doe",
            "jane@example.com | +1 (555) 123-4567",
            "Senior backend engineer, Python, distributed systems",
        ],
    );
    write_docx(
        temp_dir.path(),
        "designer.docx",
        &["Sam Roe", "Graphic designer, Adobe Illustrator, typography"],
    );
    std::fs::write(temp_dir.path().join("empty.pdf"), b"").unwrap();

    let screener = Arc::new(ResumeScreener::new(
        Arc::new(TextExtractor::new(None)),
        Arc::new(RegexContactExtractor::new()),
        Arc::new(EmbeddingSimilarity::new(Arc::new(BagOfWords))),
    ));

    let documents = InputManager::load_directory(temp_dir.path()).await.unwrap();
    let outcomes = screener
        .screen_batch(documents, Arc::new(backend_job()), 80.0, 2, |_| {})
        .await
        .unwrap();

    let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["backend.docx", "designer.docx", "empty.pdf"]);

    let backend = &outcomes[0];
    assert!(backend.shortlisted);
    assert_eq!(backend.contact.email.as_deref(), Some("jane@example.com"));
    assert_eq!(backend.contact.phone.as_deref(), Some("+15551234567"));
    assert_relative_eq!(backend.ats.final_score, 84.23, epsilon = 1e-9);

    let designer = &outcomes[1];
    assert!(!designer.shortlisted);
    assert_relative_eq!(designer.ats.final_score, 65.0);

    let empty = &outcomes[2];
    assert!(empty.extraction.is_failed());
    assert_eq!(
        empty.extraction,
        ExtractionStatus::Failed {
            reason: "no extractable text found in PDF document".to_string()
        }
    );
    assert_relative_eq!(empty.ats.final_score, 65.0);
}

#[tokio::test]
async fn test_corrupt_docx_does_not_sink_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(
        temp_dir.path(),
        "good.docx",
        &["Senior backend engineer, Python, distributed systems"],
    );
    let bad = write_docx(temp_dir.path(), "bad.docx", &["Senior backend engineer, Python"]);
    break_document_checksum(&bad);

    let screener = Arc::new(ResumeScreener::new(
        Arc::new(TextExtractor::new(None)),
        Arc::new(RegexContactExtractor::new()),
        Arc::new(EmbeddingSimilarity::new(Arc::new(BagOfWords))),
    ));

    let documents = InputManager::load_directory(temp_dir.path()).await.unwrap();
    let outcomes = screener
        .screen_batch(documents, Arc::new(backend_job()), 80.0, 2, |_| {})
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].name, "good.docx");
    assert!(outcomes[0].shortlisted);
    assert_eq!(outcomes[1].name, "bad.docx");
    assert!(matches!(outcomes[1].extraction, ExtractionStatus::Failed { .. }));
    assert_relative_eq!(outcomes[1].ats.final_score, 65.0);
}
