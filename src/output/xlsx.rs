//! XLSX export
//!
//! One worksheet named "Articles" with the `url, text, images` columns.
//! Excel cells hold at most 32,767 characters; longer values are replaced
//! by a placeholder and the record is counted as degraded.

use crate::article::ArticleRecord;
use crate::config::ExportFormat;
use crate::output::traits::{OutputResult, ReportWriter, WrittenArtifact, PLACEHOLDER};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Largest string a worksheet cell accepts
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl ReportWriter for XlsxWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn write(&self, records: &[ArticleRecord], path: &Path) -> OutputResult<WrittenArtifact> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Articles")?;

        let header = Format::new().set_bold();
        for (col, name) in ["url", "text", "images"].into_iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header)?;
        }
        worksheet.set_column_width(0, 50)?;
        worksheet.set_column_width(1, 100)?;
        worksheet.set_column_width(2, 50)?;

        let mut degraded = 0;
        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            let images = record.images.join("\n");

            let mut lossless = true;
            for (col, value) in [record.url.as_str(), record.text.as_str(), images.as_str()]
                .into_iter()
                .enumerate()
            {
                lossless &= write_cell(worksheet, row, col as u16, value)?;
            }
            if !lossless {
                tracing::warn!("XLSX row for {} used a placeholder", record.url);
                degraded += 1;
            }
        }

        workbook.save(path)?;

        Ok(WrittenArtifact {
            path: path.to_path_buf(),
            format: ExportFormat::Xlsx,
            records: records.len(),
            degraded,
        })
    }
}

/// Writes a cell, falling back to the placeholder
///
/// # Returns
///
/// `false` when the placeholder was written instead of `value`
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &str) -> OutputResult<bool> {
    if value.chars().count() > MAX_CELL_CHARS {
        worksheet.write_string(row, col, PLACEHOLDER)?;
        return Ok(false);
    }

    let failed = worksheet.write_string(row, col, value).err();
    match failed {
        None => Ok(true),
        Some(e) => {
            tracing::debug!("Cell ({}, {}) rejected: {}", row, col, e);
            worksheet.write_string(row, col, PLACEHOLDER)?;
            Ok(false)
        }
    }
}
