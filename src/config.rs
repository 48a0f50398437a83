//! Configuration management for the resume screener

use crate::error::{Result, ResumeScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shortlisting threshold used when neither the caller nor the job supplies one
pub const DEFAULT_ATS_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub ocr: OcrConfig,
    pub screening: ScreeningConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableModel {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub enabled: bool,
    pub tesseract_path: PathBuf,
    pub pdftoppm_path: PathBuf,
    pub language: String,
    pub dpi: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// HR-wide default threshold; a job's own threshold takes precedence
    pub ats_threshold: f64,
    pub max_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tesseract_path: PathBuf::from("tesseract"),
            pdftoppm_path: PathBuf::from("pdftoppm"),
            language: "eng".to_string(),
            dpi: 300,
        }
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        let max_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            ats_threshold: DEFAULT_ATS_THRESHOLD,
            max_workers,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                available_models: vec![
                    AvailableModel {
                        name: "potion-base-8M".to_string(),
                        repo_id: "minishlab/potion-base-8M".to_string(),
                        size_mb: 33,
                        description: "Model2Vec embeddings with 8M parameters (recommended)".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-base".to_string(),
                        repo_id: "minishlab/M2V_base_output".to_string(),
                        size_mb: 90,
                        description: "Fast Model2Vec base embeddings model".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-large".to_string(),
                        repo_id: "minishlab/M2V_large_output".to_string(),
                        size_mb: 250,
                        description: "High-quality Model2Vec large embeddings model".to_string(),
                    },
                ],
            },
            ocr: OcrConfig::default(),
            screening: ScreeningConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the file at `config_path`, writing defaults there on first use.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.screening.ats_threshold)?;
        if self.screening.max_workers == 0 {
            return Err(ResumeScreenerError::Configuration(
                "screening.max_workers must be at least 1".to_string(),
            ));
        }
        if self.ocr.dpi == 0 {
            return Err(ResumeScreenerError::Configuration("ocr.dpi must be positive".to_string()));
        }
        Ok(())
    }

    /// Update a single dotted key, e.g. `screening.ats_threshold`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "screening.ats_threshold" => {
                let threshold = parse_value::<f64>(key, value)?;
                validate_threshold(threshold)?;
                self.screening.ats_threshold = threshold;
            }
            "screening.max_workers" => self.screening.max_workers = parse_value(key, value)?,
            "ocr.enabled" => self.ocr.enabled = parse_value(key, value)?,
            "ocr.language" => self.ocr.language = value.to_string(),
            "ocr.dpi" => self.ocr.dpi = parse_value(key, value)?,
            "ocr.tesseract_path" => self.ocr.tesseract_path = PathBuf::from(value),
            "ocr.pdftoppm_path" => self.ocr.pdftoppm_path = PathBuf::from(value),
            "models.embedding_model" => self.models.embedding_model = value.to_string(),
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "output.format" => {
                self.output.format = parse_output_format(value).map_err(ResumeScreenerError::Configuration)?
            }
            "output.detailed" => self.output.detailed = parse_value(key, value)?,
            "output.color_output" => self.output.color_output = parse_value(key, value)?,
            _ => {
                return Err(ResumeScreenerError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        self.validate()
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn get_model_by_name(&self, name: &str) -> Option<&AvailableModel> {
        self.models.available_models.iter().find(|m| m.name == name)
    }

    /// Directory holding a downloaded copy of `name_or_repo`, if any.
    pub fn local_model_path(&self, name_or_repo: &str) -> Option<PathBuf> {
        let repo_id = self
            .get_model_by_name(name_or_repo)
            .map(|m| m.repo_id.clone())
            .unwrap_or_else(|| name_or_repo.to_string());

        [
            self.models.models_dir.join(name_or_repo),
            self.models.models_dir.join(repo_id.replace('/', "--")),
        ]
        .into_iter()
        .find(|p| p.join("tokenizer.json").exists())
    }

    /// Resolve the configured embedding model to a local directory when one
    /// exists, otherwise to the Hugging Face repo id.
    pub fn embedding_model_location(&self) -> PathBuf {
        let configured = &self.models.embedding_model;
        self.local_model_path(configured).unwrap_or_else(|| {
            let repo_id = self
                .get_model_by_name(configured)
                .map(|m| m.repo_id.clone())
                .unwrap_or_else(|| configured.clone());
            PathBuf::from(repo_id)
        })
    }
}

/// Thresholds are percentages
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err(ResumeScreenerError::Configuration(format!(
            "Invalid threshold value {}. Must be between 0 and 100.",
            threshold
        )));
    }
    Ok(())
}

pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        ResumeScreenerError::Configuration(format!("Invalid value '{}' for {}", value, key))
    })
}
