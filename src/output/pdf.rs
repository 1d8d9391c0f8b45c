//! PDF export
//!
//! Every record starts on a new A4 page: a URL heading, the article text
//! wrapped to a fixed column count, then an "Images:" list of image URLs.
//! Text overflowing a page continues on the next one.
//!
//! The built-in Courier font only covers printable ASCII, so text goes
//! through [`to_code_page`] first. Image bytes are never embedded.

use crate::article::ArticleRecord;
use crate::config::ExportFormat;
use crate::output::encoding::to_code_page;
use crate::output::traits::{OutputError, OutputResult, ReportWriter, WrittenArtifact};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_MM: f32 = 15.0;
const FONT_SIZE: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 4.6;

/// Columns that fit between the margins in 10pt Courier
pub const WRAP_COLUMNS: usize = 85;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl ReportWriter for PdfWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn write(&self, records: &[ArticleRecord], path: &Path) -> OutputResult<WrittenArtifact> {
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("articles");
        let mut document = TextDocument::new(title)?;

        let mut degraded = 0;
        if records.is_empty() {
            document.line("No articles were collected.");
        }
        for (index, record) in records.iter().enumerate() {
            if index > 0 {
                document.page_break();
            }
            if !document.record(record) {
                degraded += 1;
            }
        }

        document.save(path)?;

        Ok(WrittenArtifact {
            path: path.to_path_buf(),
            format: ExportFormat::Pdf,
            records: records.len(),
            degraded,
        })
    }
}

/// Writes one record as a standalone PDF
///
/// # Returns
///
/// `true` when the text was encoded without substitutions
pub fn write_article(record: &ArticleRecord, path: &Path) -> OutputResult<bool> {
    let mut document = TextDocument::new(&record.url)?;
    let lossless = document.record(record);
    document.save(path)?;
    Ok(lossless)
}

/// Lays out the lines of one record
///
/// # Returns
///
/// The wrapped lines and whether encoding was lossless
pub fn record_lines(record: &ArticleRecord) -> (Vec<String>, bool) {
    let url = to_code_page(&record.url);
    let text = to_code_page(&record.text);

    let mut lines = wrap_text(&format!("URL: {}", url.text), WRAP_COLUMNS);
    lines.push(String::new());

    if text.text.trim().is_empty() {
        lines.push("(no text extracted)".to_string());
    } else {
        lines.extend(wrap_text(&text.text, WRAP_COLUMNS));
    }

    let mut lossless = url.is_lossless() && text.is_lossless();
    if !record.images.is_empty() {
        lines.push(String::new());
        lines.push("Images:".to_string());
        for image in &record.images {
            let image = to_code_page(image);
            lossless &= image.is_lossless();
            lines.extend(wrap_text(&format!("- {}", image.text), WRAP_COLUMNS));
        }
    }

    (lines, lossless)
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let mut word = word;
            while word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = word
                    .char_indices()
                    .nth(width)
                    .map_or(word.len(), |(index, _)| index);
                lines.push(word[..split].to_string());
                word = &word[split..];
            }
            if word.is_empty() {
                continue;
            }

            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }

        lines.push(current);
    }

    lines
}

/// Single-font text document with automatic page breaks
struct TextDocument {
    document: PdfDocumentReference,
    font: IndirectFontRef,
    layer: PdfLayerReference,
    cursor_mm: f32,
}

impl TextDocument {
    fn new(title: &str) -> OutputResult<Self> {
        let (document, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let font = document
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| OutputError::Pdf(format!("{:?}", e)))?;
        let layer = document.get_page(page).get_layer(layer);

        Ok(Self {
            document,
            font,
            layer,
            cursor_mm: PAGE_HEIGHT.0 - MARGIN_MM,
        })
    }

    fn page_break(&mut self) {
        let (page, layer) = self.document.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        self.layer = self.document.get_page(page).get_layer(layer);
        self.cursor_mm = PAGE_HEIGHT.0 - MARGIN_MM;
    }

    fn line(&mut self, text: &str) {
        if self.cursor_mm - LINE_HEIGHT_MM < MARGIN_MM {
            self.page_break();
        }
        self.cursor_mm -= LINE_HEIGHT_MM;
        if !text.is_empty() {
            self.layer
                .use_text(text, FONT_SIZE, Mm(MARGIN_MM), Mm(self.cursor_mm), &self.font);
        }
    }

    /// Writes a record's lines; returns whether encoding was lossless
    fn record(&mut self, record: &ArticleRecord) -> bool {
        let (lines, lossless) = record_lines(record);
        if !lossless {
            tracing::debug!("Substituted unsupported characters in PDF text for {}", record.url);
        }
        for line in &lines {
            self.line(line);
        }
        lossless
    }

    fn save(self, path: &Path) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.document
            .save(&mut writer)
            .map_err(|e| OutputError::Pdf(format!("{:?}", e)))
    }
}
