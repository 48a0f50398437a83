//! CLI interface for the resume screener

use crate::config::validate_threshold;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen PDF/DOCX resumes against a job requirement")]
#[command(long_about = "Extract resume text (with OCR fallback), pull out contact details and rank resumes with a weighted multi-factor ATS score")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the text extracted from a resume
    Extract {
        /// Path to resume file (PDF, DOCX)
        file: PathBuf,
    },

    /// Print the email and phone found in a resume
    Contact {
        /// Path to resume file (PDF, DOCX)
        file: PathBuf,
    },

    /// Score one resume against a job
    Score {
        /// Path to resume file (PDF, DOCX)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job requirement file (JSON, TOML)
        #[arg(short, long)]
        job: PathBuf,

        /// Shortlisting threshold, overrides the job and config values
        #[arg(short, long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Show per-factor scores
        #[arg(short, long)]
        detailed: bool,
    },

    /// Screen every resume in a directory and rank them
    Screen {
        /// Directory containing PDF/DOCX resumes
        #[arg(long)]
        dir: PathBuf,

        /// Job requirement file (JSON, TOML)
        #[arg(short, long)]
        job: PathBuf,

        /// Shortlisting threshold, overrides the job and config values
        #[arg(short, long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Which results to list: all, shortlisted, not-shortlisted
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Show per-factor scores
        #[arg(short, long)]
        detailed: bool,

        /// Save the report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "screening.ats_threshold")
        key: String,

        /// Configuration value
        value: String,
    },
}

pub fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    validate_threshold(threshold).map_err(|e| e.to_string())?;
    Ok(threshold)
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
