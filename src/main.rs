//! Resume screener: OCR-aware resume extraction and ATS-style ranking

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_screener::config::{parse_output_format, Config, OutputFormat};
use resume_screener::error::{Result, ResumeScreenerError};
use resume_screener::input::manager::InputManager;
use resume_screener::input::ocr::OcrPipeline;
use resume_screener::input::text_extractor::TextExtractor;
use resume_screener::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_screener::output::report::{ResultFilter, ScreeningReport};
use resume_screener::processing::contact::{ContactExtractor, RegexContactExtractor};
use resume_screener::processing::embeddings::LazyEmbedder;
use resume_screener::processing::job::JobRequirement;
use resume_screener::processing::pipeline::ResumeScreener;
use resume_screener::processing::shortlist::resolve_threshold;
use resume_screener::processing::similarity::EmbeddingSimilarity;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("{}: {}", e.category().message(), e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Extract { file } => {
            let mut input_manager = InputManager::new(build_extractor(&config));
            let extracted = input_manager.extract_text(&file).await?;

            println!("📄 {} ({} characters via {})\n", file.display(), extracted.text.len(), extracted.source);
            println!("{}", extracted.text);
        }

        Commands::Contact { file } => {
            let mut input_manager = InputManager::new(build_extractor(&config));
            let extracted = input_manager.extract_text(&file).await?;
            let contact = RegexContactExtractor::new().extract_contact(&extracted.text);

            println!("📇 Contact details for {}", file.display());
            println!("  • Email: {}", contact.email.as_deref().unwrap_or("not found"));
            println!("  • Phone: {}", contact.phone.as_deref().unwrap_or("not found"));
        }

        Commands::Score {
            resume,
            job,
            threshold,
            output,
            detailed,
        } => {
            let start_time = Instant::now();
            let job = load_job(&job)?;
            let threshold = resolve_threshold(threshold, job.ats_threshold, config.screening.ats_threshold);
            let output_format = resolve_output_format(output.as_deref(), &config)?;

            let document = InputManager::load_document(&resume).await?;
            info!("Scoring {} against '{}'", document.name(), job.job_title);

            let (screener, model_name) = build_screener(&config);
            let job_for_task = job.clone();
            let outcome = tokio::task::spawn_blocking(move || screener.screen(&document, &job_for_task, threshold))
                .await
                .map_err(|e| ResumeScreenerError::Processing(format!("Scoring task failed: {}", e)))??;

            let report = ScreeningReport::new(
                &job,
                threshold,
                vec![outcome],
                &model_name,
                start_time.elapsed().as_millis() as u64,
            );
            let generator = ReportGenerator::with_options(
                config.output.color_output,
                detailed || config.output.detailed,
                true,
            );
            println!("{}", generator.generate_report(&report, &output_format)?);
        }

        Commands::Screen {
            dir,
            job,
            threshold,
            filter,
            output,
            detailed,
            save,
        } => {
            let start_time = Instant::now();
            let filter: ResultFilter = filter.parse().map_err(ResumeScreenerError::InvalidInput)?;
            let job = Arc::new(load_job(&job)?);
            let threshold = resolve_threshold(threshold, job.ats_threshold, config.screening.ats_threshold);
            let output_format = resolve_output_format(output.as_deref(), &config)?;

            let documents = InputManager::load_directory(&dir).await?;
            if documents.is_empty() {
                println!("⚠️  No PDF or DOCX resumes found in {}", dir.display());
                return Ok(());
            }

            let progress = ProgressBar::new(documents.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| ResumeScreenerError::Processing(e.to_string()))?
                    .progress_chars("=> "),
            );

            let (screener, model_name) = build_screener(&config);
            let outcomes = Arc::new(screener)
                .screen_batch(documents, job.clone(), threshold, config.screening.max_workers, |outcome| {
                    progress.set_message(outcome.name.clone());
                    progress.inc(1);
                })
                .await?;
            progress.finish_and_clear();

            let report = ScreeningReport::new(
                &job,
                threshold,
                outcomes,
                &model_name,
                start_time.elapsed().as_millis() as u64,
            )
            .filtered(filter);

            let generator = ReportGenerator::with_options(
                config.output.color_output,
                detailed || config.output.detailed,
                true,
            );
            println!("{}", generator.generate_report(&report, &output_format)?);

            if let Some(path) = save {
                let path = if path.is_dir() {
                    path.join(suggest_filename(&output_format, &job.job_title, true))
                } else {
                    path
                };
                let content = ReportGenerator::with_options(false, true, true)
                    .generate_report(&report, &save_format(&path, output_format))?;
                save_report_to_file(&content, &path)?;
                println!("💾 Report saved to {}", path.display());
            }
        }

        Commands::Models { action } => match action {
            ModelAction::List => {
                println!("📚 Embedding Models\n");
                for model in &config.models.available_models {
                    let status = match config.local_model_path(&model.name) {
                        Some(path) => format!("✅ Local ({})", path.display()),
                        None => "⬇️  Fetched from Hugging Face on first use".to_string(),
                    };
                    let marker = if model.name == config.models.embedding_model
                        || model.repo_id == config.models.embedding_model
                    {
                        " (active)".green().to_string()
                    } else {
                        String::new()
                    };

                    println!("  • {} ({}) - {} MB{}", model.name, model.repo_id, model.size_mb, marker);
                    println!("    {}", model.description);
                    println!("    {}\n", status);
                }
                println!("💡 Models directory: {}", config.models_dir().display());
            }
        },

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("Models Directory: {}", config.models_dir().display());
                println!("Embedding Model: {}", config.models.embedding_model);
                println!("\nScreening:");
                println!("  ATS threshold: {:.2}", config.screening.ats_threshold);
                println!("  Max workers: {}", config.screening.max_workers);
                println!("\nOCR:");
                println!("  Enabled: {}", config.ocr.enabled);
                println!("  Tesseract: {} (lang {})", config.ocr.tesseract_path.display(), config.ocr.language);
                println!("  pdftoppm: {} ({} dpi)", config.ocr.pdftoppm_path.display(), config.ocr.dpi);
                println!("\nOutput:");
                println!("  Format: {:?}", config.output.format);
                println!("  Detailed: {}", config.output.detailed);
                println!("  Colors: {}", config.output.color_output);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut config = config;
                config.set(&key, &value)?;
                config.save_to(config_path)?;
                println!("✅ {} = {}", key, value);
            }
        },
    }

    Ok(())
}

fn build_extractor(config: &Config) -> Arc<TextExtractor> {
    Arc::new(TextExtractor::new(OcrPipeline::from_config(&config.ocr)))
}

/// Wire the production pipeline; the embedding model loads on first score.
fn build_screener(config: &Config) -> (ResumeScreener, String) {
    let embedder = Arc::new(LazyEmbedder::new(config.embedding_model_location()));
    let similarity = EmbeddingSimilarity::new(embedder);
    let model_name = similarity.model_name().to_string();

    let screener = ResumeScreener::new(
        build_extractor(config),
        Arc::new(RegexContactExtractor::new()),
        Arc::new(similarity),
    );
    (screener, model_name)
}

fn load_job(path: &Path) -> Result<JobRequirement> {
    cli::validate_file_extension(path, &["json", "toml"])
        .map_err(|e| ResumeScreenerError::InvalidInput(format!("Job file: {}", e)))?;
    JobRequirement::load(path)
}

fn resolve_output_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => parse_output_format(format).map_err(ResumeScreenerError::InvalidInput),
        None => Ok(config.output.format),
    }
}

/// A `.json` save path always gets JSON; anything else gets plain console text.
fn save_format(path: &Path, requested: OutputFormat) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        Some(_) => OutputFormat::Console,
        None => requested,
    }
}
