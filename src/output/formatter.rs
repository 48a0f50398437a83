//! Console and JSON rendering of screening reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{ResultFilter, ScreeningReport};
use crate::processing::ats_scorer::Factor;
use crate::processing::pipeline::{ExtractionStatus, ScreeningOutcome};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting screening reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String>;
}

/// Colored, human-readable ranking
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

/// Picks the formatter for the requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_decision_badge(&self, shortlisted: bool) -> String {
        let (badge, color) = if shortlisted {
            ("SHORTLISTED", Color::Green)
        } else {
            ("NOT SHORTLISTED", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn score_color(score: f64, threshold: f64) -> Color {
        if score >= threshold + 20.0 {
            Color::Green
        } else if score >= threshold {
            Color::BrightGreen
        } else if score >= threshold - 10.0 {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    fn format_outcome(&self, rank: usize, outcome: &ScreeningOutcome) -> String {
        let mut output = String::new();

        let score = format!("{:>6.2}", outcome.ats.final_score);
        output.push_str(&format!(
            "{:>3}. {} {} {}\n",
            rank,
            self.colorize(&score, Self::score_color(outcome.ats.final_score, outcome.threshold)),
            outcome.name,
            self.format_decision_badge(outcome.shortlisted)
        ));

        let email = outcome.contact.email.as_deref().unwrap_or("-");
        let phone = outcome.contact.phone.as_deref().unwrap_or("-");
        output.push_str(&format!("     Email: {} | Phone: {}\n", email, phone));

        match &outcome.extraction {
            ExtractionStatus::Failed { reason } => {
                output.push_str(&format!(
                    "     {} {}\n",
                    self.colorize("⚠️  could not read document:", Color::Yellow),
                    reason
                ));
            }
            ExtractionStatus::Extracted { source, characters } if self.detailed => {
                output.push_str(&format!("     Text: {} characters via {}\n", characters, source));
            }
            ExtractionStatus::Extracted { .. } => {}
        }

        if self.detailed {
            for factor in Factor::ALL {
                let score = outcome.ats.factor_scores.get(&factor).copied().unwrap_or(0.0);
                output.push_str(&format!(
                    "     • {:<26} {:>6.2}  (weight {:.0}%)\n",
                    factor.as_str(),
                    score,
                    factor.weight()
                ));
            }
            output.push_str(&format!("     Base score: {:.2}\n", outcome.ats.base_score));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME SCREENING REPORT", 1));
        output.push_str(&format!(
            "Job: {} | Threshold: {:.2}\n",
            self.colorize(&report.job_title, Color::Cyan),
            report.threshold
        ));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Screened: {} | Shortlisted: {} | Unreadable: {}\n",
            report.summary.screened,
            self.colorize(&report.summary.shortlisted.to_string(), Color::Green),
            report.summary.unreadable
        ));
        if let Some(top) = report.summary.top_score {
            output.push_str(&format!("Top score: {:.2}\n", top));
        }

        let title = match report.filter {
            ResultFilter::All => "Ranking",
            ResultFilter::Shortlisted => "Ranking (shortlisted only)",
            ResultFilter::NotShortlisted => "Ranking (not shortlisted only)",
        };
        output.push_str(&self.format_header(title, 2));

        if report.results.is_empty() {
            output.push_str("  No resumes match this filter.\n");
        }
        for (i, outcome) in report.results.iter().enumerate() {
            output.push_str(&self.format_outcome(i + 1, outcome));
        }

        if report.results.iter().any(|o| o.ats.final_score > 100.0) {
            output.push_str(&self.colorize(
                "\nℹ️  Scores include a +30 offset and band bonus and can exceed 100.\n",
                Color::BrightBlack,
            ));
        }

        if self.detailed {
            output.push_str(&self.format_header("Metadata", 3));
            output.push_str(&format!("Embedding model: {}\n", report.metadata.embedding_model));
            output.push_str(&format!("resume-screener v{}\n", report.metadata.version));
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

impl ReportGenerator {
    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    pub fn generate_report(&self, report: &ScreeningReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
        }
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, job_title: &str, timestamp: bool) -> String {
    let base_name: String = job_title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let base_name = if base_name.is_empty() { "job".to_string() } else { base_name };

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_screening{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_screening{}.json", base_name, timestamp_suffix),
    }
}
