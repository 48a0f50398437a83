//! OCR backends used as the last-resort extraction strategy
//!
//! Recognition shells out to the Tesseract CLI and PDF rasterisation to
//! poppler's `pdftoppm`. Both sit behind traits so the extractor can be
//! exercised without either binary installed.

use crate::config::OcrConfig;
use crate::error::{Result, ResumeScreenerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::guard_panics;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

/// Turns an image file into text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<String>;
}

/// Renders individual PDF pages to image files.
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self, pdf: &Path) -> Result<usize>;

    /// Render the 1-based `page` and return the path of the written image.
    fn rasterize_page(&self, pdf: &Path, page: usize, output_prefix: &Path) -> Result<PathBuf>;
}

/// The engine/rasteriser pair handed to the OCR strategies.
#[derive(Clone)]
pub struct OcrPipeline {
    pub engine: Arc<dyn OcrEngine>,
    pub rasterizer: Arc<dyn PageRasterizer>,
}

impl OcrPipeline {
    pub fn new(engine: Arc<dyn OcrEngine>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { engine, rasterizer }
    }

    /// Build the CLI-backed pipeline, or `None` when OCR is switched off.
    pub fn from_config(config: &OcrConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self::new(
            Arc::new(TesseractOcr::new(&config.tesseract_path, &config.language)),
            Arc::new(PdftoppmRasterizer::new(&config.pdftoppm_path, config.dpi)),
        ))
    }
}

pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: &Path, language: &str) -> Self {
        Self {
            binary: binary.to_path_buf(),
            language: language.to_string(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &Path) -> Result<String> {
        debug!("Running tesseract on {}", image.display());
        let output = run_tool(
            Command::new(&self.binary)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.language),
            &self.binary,
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

pub struct PdftoppmRasterizer {
    binary: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(binary: &Path, dpi: u32) -> Self {
        Self {
            binary: binary.to_path_buf(),
            dpi,
        }
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn page_count(&self, pdf: &Path) -> Result<usize> {
        guard_panics(FileType::Pdf, || {
            let document = lopdf::Document::load(pdf).map_err(|e| {
                ResumeScreenerError::Ocr(format!("cannot count pages of {}: {}", pdf.display(), e))
            })?;
            Ok(document.get_pages().len())
        })
    }

    fn rasterize_page(&self, pdf: &Path, page: usize, output_prefix: &Path) -> Result<PathBuf> {
        let page = page.to_string();
        run_tool(
            Command::new(&self.binary)
                .args(["-f", page.as_str(), "-l", page.as_str()])
                .arg("-r")
                .arg(self.dpi.to_string())
                .args(["-png", "-singlefile"])
                .arg(pdf)
                .arg(output_prefix),
            &self.binary,
        )?;

        // -singlefile writes exactly <prefix>.png
        let image = PathBuf::from(format!("{}.png", output_prefix.display()));
        if !image.exists() {
            return Err(ResumeScreenerError::Ocr(format!(
                "pdftoppm produced no image for page {}",
                page
            )));
        }
        Ok(image)
    }
}

fn run_tool(command: &mut Command, binary: &Path) -> Result<Output> {
    let output = command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => ResumeScreenerError::Ocr(format!(
            "'{}' not found; install it or set its path in the OCR configuration",
            binary.display()
        )),
        _ => ResumeScreenerError::Ocr(format!("failed to run '{}': {}", binary.display(), e)),
    })?;

    if !output.status.success() {
        return Err(ResumeScreenerError::Ocr(format!(
            "'{}' exited with {}: {}",
            binary.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output)
}
