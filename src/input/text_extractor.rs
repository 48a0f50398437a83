//! Text extraction from resume documents
//!
//! Each format owns an ordered list of strategies. They are tried in turn and
//! the first one producing non-blank text wins; OCR always comes last.

use crate::error::{ExtractionFailure, Result, ResumeScreenerError};
use crate::input::document::Document;
use crate::input::file_detector::FileType;
use crate::input::ocr::{OcrEngine, OcrPipeline};
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCell,
    TableCellContent, TableChild, TableRowChild,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

pub type ExtractionResult = std::result::Result<ExtractedText, ExtractionFailure>;

/// Which kind of strategy produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    TextLayer,
    FallbackParser,
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::TextLayer => write!(f, "text layer"),
            TextSource::FallbackParser => write!(f, "fallback parser"),
            TextSource::Ocr => write!(f, "OCR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub source: TextSource,
}

/// One way of turning document bytes into text.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn source(&self) -> TextSource;
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct TextExtractor {
    pdf_strategies: Vec<Box<dyn ExtractionStrategy>>,
    docx_strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl TextExtractor {
    /// Native parsers, followed by OCR when a pipeline is supplied.
    pub fn new(ocr: Option<OcrPipeline>) -> Self {
        let mut pdf_strategies: Vec<Box<dyn ExtractionStrategy>> =
            vec![Box::new(PdfTextLayer), Box::new(PdfFallbackParser)];
        let mut docx_strategies: Vec<Box<dyn ExtractionStrategy>> = vec![Box::new(DocxText)];

        if let Some(ocr) = ocr {
            docx_strategies.push(Box::new(DocxImageOcr::new(ocr.engine.clone())));
            pdf_strategies.push(Box::new(PdfOcr::new(ocr)));
        }

        Self::with_strategies(pdf_strategies, docx_strategies)
    }

    pub fn with_strategies(
        pdf_strategies: Vec<Box<dyn ExtractionStrategy>>,
        docx_strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Self {
        Self {
            pdf_strategies,
            docx_strategies,
        }
    }

    pub fn extract(&self, document: &Document) -> ExtractionResult {
        let format = document.file_type();
        let strategies = match format {
            FileType::Pdf => &self.pdf_strategies,
            FileType::Docx => &self.docx_strategies,
            FileType::Unknown => {
                return Err(ExtractionFailure::UnsupportedFormat(
                    document.extension().to_string(),
                ))
            }
        };

        if document.is_empty() {
            warn!("{} is empty", document.name());
            return Err(ExtractionFailure::NoExtractableText(format));
        }

        let mut last_error = None;
        let mut any_clean_run = false;

        // a panicking parser counts as a failed strategy
        for strategy in strategies {
            match guard_panics(format, || strategy.extract(document.bytes())) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        "Extracted {} characters from {} using {}",
                        text.len(),
                        document.name(),
                        strategy.name()
                    );
                    return Ok(ExtractedText {
                        text: text.trim().to_string(),
                        source: strategy.source(),
                    });
                }
                Ok(_) => {
                    debug!("{} yielded no text for {}", strategy.name(), document.name());
                    any_clean_run = true;
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", strategy.name(), document.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !any_clean_run => Err(ExtractionFailure::Unreadable {
                format,
                reason: e.to_string(),
            }),
            _ => Err(ExtractionFailure::NoExtractableText(format)),
        }
    }
}

/// Page-by-page text layer via lopdf
pub struct PdfTextLayer;

impl ExtractionStrategy for PdfTextLayer {
    fn name(&self) -> &'static str {
        "pdf text layer"
    }

    fn source(&self) -> TextSource {
        TextSource::TextLayer
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| ResumeScreenerError::PdfExtraction(format!("Failed to parse PDF: {}", e)))?;

        let pages = document.get_pages();
        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => page_texts.push(text),
                Err(e) => warn!("Failed to extract text from page {}: {}", page_number, e),
            }
        }

        Ok(page_texts.join("\n"))
    }
}

/// Whole-document parse via pdf-extract, which copes with some encodings
/// the text-layer pass does not.
pub struct PdfFallbackParser;

impl ExtractionStrategy for PdfFallbackParser {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn source(&self) -> TextSource {
        TextSource::FallbackParser
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ResumeScreenerError::PdfExtraction(format!("Failed to extract text from PDF: {}", e)))
    }
}

/// Rasterise every page and OCR it, one page image on disk at a time.
pub struct PdfOcr {
    ocr: OcrPipeline,
}

impl PdfOcr {
    pub fn new(ocr: OcrPipeline) -> Self {
        Self { ocr }
    }
}

impl ExtractionStrategy for PdfOcr {
    fn name(&self) -> &'static str {
        "pdf OCR"
    }

    fn source(&self) -> TextSource {
        TextSource::Ocr
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("document.pdf");
        std::fs::write(&pdf_path, bytes)?;

        let page_count = self.ocr.rasterizer.page_count(&pdf_path)?;
        info!("No text layer found, running OCR on {} page(s)", page_count);

        let mut page_texts = Vec::with_capacity(page_count);
        let mut last_error = None;

        for page in 1..=page_count {
            let prefix = workdir.path().join(format!("page-{}", page));
            let image = match self.ocr.rasterizer.rasterize_page(&pdf_path, page, &prefix) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Failed to rasterize page {}: {}", page, e);
                    last_error = Some(e);
                    continue;
                }
            };

            match recognize_and_discard(self.ocr.engine.as_ref(), &image) {
                Ok(text) => page_texts.push(text),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", page, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if page_texts.is_empty() => Err(e),
            _ => Ok(page_texts.join("\n")),
        }
    }
}

/// Paragraphs in document order, then table rows as `cell | cell` lines.
pub struct DocxText;

impl ExtractionStrategy for DocxText {
    fn name(&self) -> &'static str {
        "docx text"
    }

    fn source(&self) -> TextSource {
        TextSource::TextLayer
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let docx = read_docx(bytes)
            .map_err(|e| ResumeScreenerError::DocxExtraction(format!("Failed to read DOCX: {:?}", e)))?;

        let children = &docx.document.children;
        let mut lines = Vec::new();

        for child in children {
            if let DocumentChild::Paragraph(paragraph) = child {
                lines.push(paragraph_text(paragraph));
            }
        }
        for child in children {
            if let DocumentChild::Table(table) = child {
                lines.extend(table_lines(table));
            }
        }

        Ok(lines.join("\n"))
    }
}

/// OCR over every image stored under `word/media/`.
pub struct DocxImageOcr {
    engine: Arc<dyn OcrEngine>,
}

impl DocxImageOcr {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

impl ExtractionStrategy for DocxImageOcr {
    fn name(&self) -> &'static str {
        "docx image OCR"
    }

    fn source(&self) -> TextSource {
        TextSource::Ocr
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ResumeScreenerError::DocxExtraction(format!("Not a DOCX container: {}", e)))?;
        let workdir = tempfile::tempdir()?;

        let mut texts = Vec::new();
        let mut last_error = None;

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| ResumeScreenerError::DocxExtraction(format!("Corrupt DOCX entry: {}", e)))?;
            let entry_name = entry.name().to_string();
            if !is_media_image(&entry_name) {
                continue;
            }

            let file_name = Path::new(&entry_name)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string());
            let image = workdir.path().join(format!("{}-{}", index, file_name));
            {
                let mut file = std::fs::File::create(&image)?;
                std::io::copy(&mut entry, &mut file)?;
            }

            match recognize_and_discard(self.engine.as_ref(), &image) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("OCR failed on embedded image {}: {}", entry_name, e);
                    last_error = Some(e);
                }
            }
        }

        if texts.is_empty() {
            debug!("No OCR-readable images found in DOCX");
        }
        match last_error {
            Some(e) if texts.is_empty() => Err(e),
            _ => Ok(texts.join("\n")),
        }
    }
}

/// Run a parser and report a panic inside it as an extraction error.
///
/// pdf-extract, lopdf and docx-rs all panic on some malformed inputs.
pub(crate) fn guard_panics<T>(format: FileType, parse: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(parse)).unwrap_or_else(|_| {
        let reason = format!("{} parser aborted on malformed input", format);
        Err(match format {
            FileType::Docx => ResumeScreenerError::DocxExtraction(reason),
            _ => ResumeScreenerError::PdfExtraction(reason),
        })
    })
}

/// OCR one image and delete it straight away so only one lives on disk.
fn recognize_and_discard(engine: &dyn OcrEngine, image: &Path) -> Result<String> {
    let recognized = engine.recognize(image);
    if let Err(e) = std::fs::remove_file(image) {
        debug!("Could not remove {}: {}", image.display(), e);
    }
    recognized
}

fn is_media_image(entry_name: &str) -> bool {
    const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

    entry_name.starts_with("word/media/")
        && Path::new(entry_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        push_paragraph_child(child, &mut text);
    }
    text
}

fn push_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => push_run(run, out),
        ParagraphChild::Hyperlink(link) => {
            for nested in &link.children {
                push_paragraph_child(nested, out);
            }
        }
        _ => {}
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

#[allow(irrefutable_let_patterns)]
fn table_lines(table: &Table) -> Vec<String> {
    let mut lines = Vec::new();
    for row in &table.rows {
        if let TableChild::TableRow(row) = row {
            let cells: Vec<String> = row
                .cells
                .iter()
                .filter_map(|cell| match cell {
                    TableRowChild::TableCell(cell) => Some(cell_text(cell)),
                    #[allow(unreachable_patterns)]
                    _ => None,
                })
                .collect();
            lines.push(cells.join(" | "));
        }
    }
    lines
}

fn cell_text(cell: &TableCell) -> String {
    let mut parts = Vec::new();
    for content in &cell.children {
        match content {
            TableCellContent::Paragraph(paragraph) => parts.push(paragraph_text(paragraph)),
            TableCellContent::Table(nested) => parts.extend(table_lines(nested)),
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
    parts.join("\n").trim().to_string()
}
